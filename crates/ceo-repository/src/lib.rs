//! # CEO Repository
//!
//! Data access layer for the CEO platform.
//!
//! Every repository is a trait so services can be tested against in-memory
//! doubles; the Postgres implementations live in [`postgres`].

pub mod pool;
pub mod postgres;
pub mod traits;

pub use pool::*;
pub use postgres::*;
pub use traits::*;
