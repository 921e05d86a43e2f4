use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::{models::user::Role, responses::JsonResponse};

/// Everything a route may gate on. Roles map to capability sets below;
/// handlers check capabilities, never raw roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageUsers,
    ManageLocations,
    ManageShifts,
    ReviewTimeOff,
    ReviewSwaps,
    ViewReports,
}

const OWNER_CAPABILITIES: &[Capability] = &[
    Capability::ManageUsers,
    Capability::ManageLocations,
    Capability::ManageShifts,
    Capability::ReviewTimeOff,
    Capability::ReviewSwaps,
    Capability::ViewReports,
];

// Managers hold every owner capability except organization-wide reports.
const MANAGER_CAPABILITIES: &[Capability] = &[
    Capability::ManageUsers,
    Capability::ManageLocations,
    Capability::ManageShifts,
    Capability::ReviewTimeOff,
    Capability::ReviewSwaps,
];

const EMPLOYEE_CAPABILITIES: &[Capability] = &[];

pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Owner => OWNER_CAPABILITIES,
        Role::Manager => MANAGER_CAPABILITIES,
        Role::Employee => EMPLOYEE_CAPABILITIES,
    }
}

pub fn role_allows(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

/// Gate a route on a capability. The Err arm is a ready-to-return 403.
pub fn require(role: Role, capability: Capability) -> Result<(), Response> {
    if role_allows(role, capability) {
        Ok(())
    } else {
        Err(JsonResponse::forbidden("You do not have permission to perform this action.")
            .into_response())
    }
}

/// Profile updates are allowed for the user themself or anyone who can
/// manage users. Whether privileged fields apply is a separate question
/// answered by `role_allows(role, Capability::ManageUsers)`.
pub fn can_edit_user(role: Role, caller_id: Uuid, target_id: Uuid) -> bool {
    caller_id == target_id || role_allows(role, Capability::ManageUsers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_holds_every_capability() {
        for cap in OWNER_CAPABILITIES {
            assert!(role_allows(Role::Owner, *cap));
        }
        assert!(role_allows(Role::Owner, Capability::ViewReports));
    }

    #[test]
    fn manager_cannot_view_reports() {
        assert!(role_allows(Role::Manager, Capability::ManageShifts));
        assert!(role_allows(Role::Manager, Capability::ReviewSwaps));
        assert!(!role_allows(Role::Manager, Capability::ViewReports));
    }

    #[test]
    fn employee_holds_no_capability() {
        assert!(capabilities(Role::Employee).is_empty());
        assert!(!role_allows(Role::Employee, Capability::ManageShifts));
    }

    #[test]
    fn require_returns_forbidden_for_missing_capability() {
        assert!(require(Role::Owner, Capability::ViewReports).is_ok());
        let err = require(Role::Employee, Capability::ReviewTimeOff).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn self_edit_allowed_for_any_role() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(can_edit_user(Role::Employee, me, me));
        assert!(!can_edit_user(Role::Employee, me, other));
        assert!(can_edit_user(Role::Manager, me, other));
        assert!(can_edit_user(Role::Owner, me, other));
    }
}
