use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Extension, Json};
use leadpilot_core::models::{OrgContext, OverviewSummary};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/v1/leads/overview",
    tag = "overview",
    responses(
        (status = 200, description = "Dashboard summary", body = OverviewSummary),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(org_id = %ctx.organization_id, operation = "overview")
)]
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<impl IntoResponse, HttpAppError> {
    let summary = state.leads.overview(ctx).await?;
    Ok(Json(summary))
}
