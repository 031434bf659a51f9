//! REST API controllers.

pub mod auth_controller;
pub mod dashboard_controller;
pub mod health_controller;
pub mod notification_controller;
pub mod organization_controller;
pub mod report_controller;
pub mod user_controller;

use crate::responses::AppError;
use ceo_core::CeoError;
use std::str::FromStr;

/// Parses a numeric id from a path segment.
pub(crate) fn parse_id<T: FromStr>(kind: &str, raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError(CeoError::validation(format!("Invalid {kind} ID: {raw}"))))
}
