//! # CEO Core
//!
//! Core types, domain model, and error definitions shared by every layer
//! of the CEO organization-management platform.

pub mod domain;
pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use validation::*;

// Re-export shaku so services and repositories share one `Interface` bound
pub use shaku::Interface;
