use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use leadpilot_core::models::{CsvImportResult, LeadListFilters, OrgContext};
use leadpilot_core::AppError;
use leadpilot_services::csv::export_leads_to_csv;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportLeadsBody {
    pub csv_text: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/export",
    tag = "csv",
    params(
        ("q" = Option<String>, Query, description = "Search term matched against name, email, and company"),
        ("status" = Option<String>, Query, description = "Status filter: new, contacted, won, lost, or all"),
        ("sort" = Option<String>, Query, description = "Sort field: created_at, updated_at, name, email, status"),
        ("direction" = Option<String>, Query, description = "Sort direction: asc or desc")
    ),
    responses(
        (status = 200, description = "CSV file of all leads matching the filters", content_type = "text/csv"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, filters),
    fields(org_id = %ctx.organization_id, operation = "export_leads")
)]
pub async fn export_leads(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Query(filters): Query<LeadListFilters>,
) -> Result<impl IntoResponse, HttpAppError> {
    let leads = state.leads.list_for_export(ctx, &filters).await?;
    let body = export_leads_to_csv(&leads)?;

    let filename = format!("leads-{}.csv", Utc::now().format("%Y-%m-%d"));
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, body))
}

#[utoipa::path(
    post,
    path = "/api/v1/leads/import",
    tag = "csv",
    request_body = ImportLeadsBody,
    responses(
        (status = 200, description = "Import reconciled; row errors reject the whole file", body = CsvImportResult),
        (status = 400, description = "Unusable CSV", body = ErrorResponse),
        (status = 403, description = "Requires admin role", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, body),
    fields(org_id = %ctx.organization_id, operation = "import_leads")
)]
pub async fn import_leads(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    ValidatedJson(body): ValidatedJson<ImportLeadsBody>,
) -> Result<impl IntoResponse, HttpAppError> {
    if body.csv_text.trim().is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "csvText must not be empty".to_string(),
        )));
    }

    let result = state.leads.import_leads(ctx, &body.csv_text).await?;
    Ok(Json(result))
}
