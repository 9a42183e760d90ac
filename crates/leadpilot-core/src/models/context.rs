use uuid::Uuid;

use crate::error::AppError;
use crate::models::role::Role;

/// Resolved caller context: who is acting, in which organization, with which
/// role. Every service operation takes this explicitly; nothing reads ambient
/// session state.
#[derive(Debug, Clone, Copy)]
pub struct OrgContext {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: Role,
}

impl OrgContext {
    /// Fail with `Forbidden` when the caller's role is below `minimum`.
    pub fn require_role(&self, minimum: Role) -> Result<(), AppError> {
        if self.role.meets(minimum) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action requires at least the {} role",
                minimum
            )))
        }
    }

    pub fn can_manage_organization(&self) -> bool {
        self.role.can_manage_organization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> OrgContext {
        OrgContext {
            user_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(ctx(Role::Member).require_role(Role::Member).is_ok());
        assert!(ctx(Role::Admin).require_role(Role::Member).is_ok());
        assert!(ctx(Role::Member).require_role(Role::Admin).is_err());

        let err = ctx(Role::Member).require_role(Role::Owner).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_can_manage_organization() {
        assert!(ctx(Role::Owner).can_manage_organization());
        assert!(ctx(Role::Admin).can_manage_organization());
        assert!(!ctx(Role::Member).can_manage_organization());
    }
}
