//! Typed ID wrappers for domain entities.
//!
//! Every table uses a `SERIAL` primary key, so the wrappers are thin
//! newtypes over `i32` that serialize and bind transparently.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Returns the raw database id.
            #[must_use]
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

typed_id!(
    /// Identifier of an organization.
    OrgId
);
typed_id!(
    /// Identifier of a user account.
    UserId
);
typed_id!(
    /// Identifier of a row in the `roles` table.
    RoleId
);
typed_id!(
    /// Identifier of a report template.
    TemplateId
);
typed_id!(
    /// Identifier of a submitted report.
    ReportId
);
typed_id!(
    /// Identifier of a report comment.
    CommentId
);
typed_id!(
    /// Identifier of a per-user notification.
    NotificationId
);
typed_id!(
    /// Identifier of a notification template (one per broadcast).
    NotificationTemplateId
);
