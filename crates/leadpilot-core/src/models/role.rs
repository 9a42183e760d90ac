use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Membership role, totally ordered by privilege: owner > admin > member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "membership_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    /// Numeric privilege level; higher means more privileged.
    pub fn priority(self) -> u8 {
        match self {
            Role::Owner => 3,
            Role::Admin => 2,
            Role::Member => 1,
        }
    }

    /// True when this role is at least as privileged as `minimum`.
    pub fn meets(self, minimum: Role) -> bool {
        self.priority() >= minimum.priority()
    }

    /// Owners and admins can manage organization-level resources
    /// (member roles, CSV import).
    pub fn can_manage_organization(self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_order() {
        assert!(Role::Owner.priority() > Role::Admin.priority());
        assert!(Role::Admin.priority() > Role::Member.priority());
    }

    #[test]
    fn test_meets_minimum() {
        assert!(Role::Owner.meets(Role::Member));
        assert!(Role::Owner.meets(Role::Owner));
        assert!(Role::Admin.meets(Role::Member));
        assert!(!Role::Member.meets(Role::Admin));
        assert!(!Role::Admin.meets(Role::Owner));
    }

    #[test]
    fn test_can_manage_organization() {
        assert!(Role::Owner.can_manage_organization());
        assert!(Role::Admin.can_manage_organization());
        assert!(!Role::Member.can_manage_organization());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("viewer".parse::<Role>().is_err());
    }
}
