use leadpilot_core::models::{Membership, MemberView, OrgContext, OrganizationMembersView, Role};
use leadpilot_core::AppError;
use leadpilot_db::OrganizationRepository;
use uuid::Uuid;

/// How a role change maps onto the store: demoting an owner needs the
/// owner-count guard, everything else is a plain update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleChangePlan {
    NoChange,
    DemoteOwner,
    Update,
}

fn plan_role_change(target: &Membership, new_role: Role) -> RoleChangePlan {
    if target.role == new_role {
        RoleChangePlan::NoChange
    } else if target.role == Role::Owner {
        RoleChangePlan::DemoteOwner
    } else {
        RoleChangePlan::Update
    }
}

#[derive(Clone)]
pub struct MemberService {
    organizations: OrganizationRepository,
}

impl MemberService {
    pub fn new(organizations: OrganizationRepository) -> Self {
        Self { organizations }
    }

    /// Full member roster, oldest membership first, annotated with what the
    /// caller is allowed to do with it.
    #[tracing::instrument(skip(self), fields(org.id = %ctx.organization_id))]
    pub async fn list(&self, ctx: OrgContext) -> Result<OrganizationMembersView, AppError> {
        let memberships = self.organizations.list_members(ctx.organization_id).await?;

        let items = memberships
            .into_iter()
            .map(|m| MemberView {
                user_id: m.user_id,
                role: m.role,
                created_at: m.created_at,
                is_current_user: m.user_id == ctx.user_id,
            })
            .collect();

        Ok(OrganizationMembersView {
            current_user_role: ctx.role,
            can_manage_roles: ctx.role == Role::Owner,
            items,
        })
    }

    /// Change a member's role. Owner-only. Owners may demote themselves; the
    /// guarded demotion is what keeps at least one owner in every
    /// organization.
    #[tracing::instrument(skip(self), fields(org.id = %ctx.organization_id))]
    pub async fn update_role(
        &self,
        ctx: OrgContext,
        target_user_id: Uuid,
        new_role: Role,
    ) -> Result<(), AppError> {
        ctx.require_role(Role::Owner)?;

        let target = self
            .organizations
            .get_membership(ctx.organization_id, target_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        match plan_role_change(&target, new_role) {
            RoleChangePlan::NoChange => Ok(()),
            RoleChangePlan::DemoteOwner => {
                let affected = self
                    .organizations
                    .demote_owner_guarded(ctx.organization_id, target_user_id, new_role)
                    .await?;
                if affected == 0 {
                    return Err(AppError::Domain(
                        "At least one owner must remain in the organization".to_string(),
                    ));
                }
                Ok(())
            }
            RoleChangePlan::Update => {
                let affected = self
                    .organizations
                    .update_member_role(ctx.organization_id, target_user_id, new_role)
                    .await?;
                if affected == 0 {
                    return Err(AppError::NotFound("Member not found".to_string()));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn membership(role: Role) -> Membership {
        Membership {
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_same_role_is_a_no_op() {
        let target = membership(Role::Admin);
        assert_eq!(
            plan_role_change(&target, Role::Admin),
            RoleChangePlan::NoChange
        );
    }

    #[test]
    fn test_owner_demotion_always_takes_guarded_path() {
        // Also covers an owner demoting themselves: there is no special case
        // for the caller's own membership, so self-demotion succeeds whenever
        // another owner remains and fails with the domain error otherwise.
        let target = membership(Role::Owner);
        assert_eq!(
            plan_role_change(&target, Role::Admin),
            RoleChangePlan::DemoteOwner
        );
        assert_eq!(
            plan_role_change(&target, Role::Member),
            RoleChangePlan::DemoteOwner
        );
    }

    #[test]
    fn test_non_owner_change_is_plain_update() {
        let target = membership(Role::Member);
        assert_eq!(
            plan_role_change(&target, Role::Admin),
            RoleChangePlan::Update
        );
    }
}
