//! # CEO Security
//!
//! JWT authentication, password hashing, role guards, and one-time token
//! generation for the CEO platform.

pub mod jwt;
pub mod password;
pub mod random;
pub mod rbac;

pub use jwt::*;
pub use password::*;
pub use random::*;
pub use rbac::*;
