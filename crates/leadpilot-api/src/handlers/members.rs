use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use leadpilot_core::models::{OrgContext, OrganizationMembersView, Role};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleBody {
    pub role: Role,
}

#[utoipa::path(
    get,
    path = "/api/v1/members",
    tag = "members",
    responses(
        (status = 200, description = "Member roster", body = OrganizationMembersView),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(org_id = %ctx.organization_id, operation = "list_members")
)]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<impl IntoResponse, HttpAppError> {
    let view = state.members.list(ctx).await?;
    Ok(Json(view))
}

#[utoipa::path(
    put,
    path = "/api/v1/members/{user_id}/role",
    tag = "members",
    params(("user_id" = Uuid, Path, description = "Target member's user ID")),
    request_body = UpdateRoleBody,
    responses(
        (status = 204, description = "Role updated"),
        (status = 403, description = "Not allowed to change this role", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Would remove the last owner", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, body),
    fields(org_id = %ctx.organization_id, target_user_id = %user_id, operation = "update_member_role")
)]
pub async fn update_member_role(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path(user_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateRoleBody>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.members.update_role(ctx, user_id, body.role).await?;
    Ok(StatusCode::NO_CONTENT)
}
