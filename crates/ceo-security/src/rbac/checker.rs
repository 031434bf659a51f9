//! Role guards over token claims.

use crate::Claims;
use ceo_core::{CeoError, CeoResult, OrgId, RoleName, UserId, MANAGER_ROLES};

/// Extension trait for Claims to check roles and tenancy.
pub trait ClaimsExt {
    /// Requires one of the listed roles.
    fn require_any_role(&self, roles: &[RoleName]) -> CeoResult<()>;

    /// Requires CEO or project manager.
    fn require_manager(&self) -> CeoResult<()>;

    /// Returns the caller's organization or fails with 403.
    fn require_org(&self) -> CeoResult<OrgId>;

    /// Requires the caller to be the user in question or a manager.
    fn require_self_or_manager(&self, user_id: UserId) -> CeoResult<()>;

    /// Checks if the caller is the given user.
    fn is_self(&self, user_id: UserId) -> bool;

    /// Checks if the caller is CEO or project manager.
    fn is_manager(&self) -> bool;
}

impl ClaimsExt for Claims {
    fn require_any_role(&self, roles: &[RoleName]) -> CeoResult<()> {
        if self.has_any_role(roles) {
            Ok(())
        } else {
            let required = roles.iter().map(RoleName::as_str).collect::<Vec<_>>().join(", ");
            Err(CeoError::Forbidden(format!("Access denied. Required role: {required}")))
        }
    }

    fn require_manager(&self) -> CeoResult<()> {
        self.require_any_role(&MANAGER_ROLES)
    }

    fn require_org(&self) -> CeoResult<OrgId> {
        self.org_id
            .ok_or_else(|| CeoError::Forbidden("User is not a member of an organization".to_string()))
    }

    fn require_self_or_manager(&self, user_id: UserId) -> CeoResult<()> {
        if self.is_self(user_id) || self.is_manager() {
            Ok(())
        } else {
            Err(CeoError::Forbidden(
                "You don't have permission to view this data".to_string(),
            ))
        }
    }

    fn is_self(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    fn is_manager(&self) -> bool {
        self.has_any_role(&MANAGER_ROLES)
    }
}
