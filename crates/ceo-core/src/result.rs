//! Result type aliases for the CEO platform.

use crate::CeoError;

/// A specialized `Result` type for CEO operations.
pub type CeoResult<T> = Result<T, CeoError>;
