use leadpilot_core::models::OrgContext;
use leadpilot_core::normalize::{slugify_workspace_name, workspace_display_name};
use leadpilot_core::AppError;
use leadpilot_db::OrganizationRepository;
use uuid::Uuid;

/// Resolves an authenticated user into their organization and role,
/// provisioning a personal workspace on first contact.
#[derive(Clone)]
pub struct ContextResolver {
    organizations: OrganizationRepository,
}

impl ContextResolver {
    pub fn new(organizations: OrganizationRepository) -> Self {
        Self { organizations }
    }

    /// When the user belongs to several organizations the earliest-created
    /// membership wins. A user with no membership gets a fresh workspace
    /// named after their email local part, with themselves as owner.
    ///
    /// Two concurrent first requests may both attempt provisioning; the
    /// loser's insert can fail or both can succeed, so after provisioning we
    /// re-select the earliest membership and every replica converges on the
    /// same organization.
    #[tracing::instrument(skip(self, email), fields(user.id = %user_id))]
    pub async fn resolve(&self, user_id: Uuid, email: &str) -> Result<OrgContext, AppError> {
        if let Some(membership) = self.organizations.find_earliest_membership(user_id).await? {
            return Ok(OrgContext {
                user_id,
                organization_id: membership.organization_id,
                role: membership.role,
            });
        }

        let local_part = email.split('@').next().unwrap_or(email);
        let base = slugify_workspace_name(local_part);
        // User-id suffix keeps the slug unique and provisioning deterministic
        // per user.
        let suffix: String = user_id.simple().to_string().chars().take(8).collect();
        let slug = format!("{}-{}", base, suffix);
        let name = workspace_display_name(&base);

        tracing::info!(slug = %slug, "provisioning workspace for first-time user");

        let provisioned = self
            .organizations
            .provision_workspace(user_id, &name, &slug)
            .await;

        match self.organizations.find_earliest_membership(user_id).await? {
            Some(membership) => Ok(OrgContext {
                user_id,
                organization_id: membership.organization_id,
                role: membership.role,
            }),
            None => {
                // No membership even after provisioning: surface the insert
                // failure rather than inventing one.
                provisioned?;
                Err(AppError::Internal(
                    "workspace provisioning did not yield a membership".to_string(),
                ))
            }
        }
    }
}
