//! # CEO Service
//!
//! Business logic service layer for the CEO platform.
//! Each service validates its request, enforces the caller's role and
//! organization, talks to the repositories and sends the follow-up
//! messages.

pub mod auth_service;
pub mod dashboard_service;
pub mod dto;
pub mod mailer;
pub mod notification_service;
pub mod organization_service;
pub mod report_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::*;
pub use dashboard_service::*;
pub use dto::*;
pub use mailer::*;
pub use notification_service::*;
pub use organization_service::*;
pub use report_service::*;
pub use user_service::*;

use ceo_core::{CeoError, CeoResult};
use chrono::{DateTime, Utc};

/// Absolute expiry of a one-time token issued now.
pub(crate) fn expires_after(ttl: std::time::Duration) -> CeoResult<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|e| CeoError::Configuration(format!("Token lifetime out of range: {e}")))?;
    Ok(Utc::now() + ttl)
}
