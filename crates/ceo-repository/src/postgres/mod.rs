//! Postgres repository implementations.

mod dashboard_repository;
mod notification_repository;
mod organization_repository;
mod report_repository;
mod user_repository;

pub use dashboard_repository::PgDashboardRepository;
pub use notification_repository::PgNotificationRepository;
pub use organization_repository::PgOrganizationRepository;
pub use report_repository::PgReportRepository;
pub use user_repository::PgUserRepository;

pub(crate) use user_repository::{UserRow, USER_COLUMNS};

use ceo_core::{CeoError, RoleName};

/// Parses a role name stored as text.
pub(crate) fn parse_role(value: &str) -> Result<RoleName, CeoError> {
    value
        .parse()
        .map_err(|e| CeoError::Internal(format!("Invalid role in database: {e}")))
}

/// Role names as bind parameters.
pub(crate) fn role_names(roles: &[RoleName]) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}
