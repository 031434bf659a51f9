//! Organization roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A role a user holds inside an organization.
///
/// Roles are flat: there is no hierarchy, except that `CEO` carries the
/// `all` permission and passes every role guard that lists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Ceo,
    Officer,
    ProjectManager,
    Finance,
    EventManager,
    Employee,
    HumanResource,
    CommunicationOfficer,
}

/// Roles allowed to manage templates, review reports and broadcast notifications.
pub const MANAGER_ROLES: [RoleName; 2] = [RoleName::Ceo, RoleName::ProjectManager];

/// Roles that receive report reminders.
pub const REMINDER_ROLES: [RoleName; 3] =
    [RoleName::Ceo, RoleName::ProjectManager, RoleName::Officer];

impl RoleName {
    /// Returns the name stored in the `roles` table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ceo => "CEO",
            Self::Officer => "OFFICER",
            Self::ProjectManager => "PROJECT_MANAGER",
            Self::Finance => "FINANCE",
            Self::EventManager => "EVENT_MANAGER",
            Self::Employee => "EMPLOYEE",
            Self::HumanResource => "HUMAN_RESOURCE",
            Self::CommunicationOfficer => "COMMUNICATION_OFFICER",
        }
    }

    /// Returns the permission keys seeded for this role.
    #[must_use]
    pub const fn permissions(&self) -> &'static [&'static str] {
        match self {
            Self::Ceo => &["all"],
            Self::Officer => &["reports.create", "tasks.view"],
            Self::ProjectManager => &["projects.manage", "tasks.manage"],
            Self::Finance => &["finance.manage"],
            Self::EventManager => &["events.manage"],
            Self::Employee | Self::HumanResource | Self::CommunicationOfficer => &[],
        }
    }

    /// Whether this role can manage reports and notifications.
    #[must_use]
    pub fn is_manager(&self) -> bool {
        MANAGER_ROLES.contains(self)
    }

    /// All available roles.
    #[must_use]
    pub const fn all() -> [Self; 8] {
        [
            Self::Ceo,
            Self::Officer,
            Self::ProjectManager,
            Self::Finance,
            Self::EventManager,
            Self::Employee,
            Self::HumanResource,
            Self::CommunicationOfficer,
        ]
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for RoleName {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::all()
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
