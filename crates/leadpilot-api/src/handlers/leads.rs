use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use leadpilot_core::models::{
    Lead, LeadListFilters, LeadStatus, OrgContext, PaginatedLeads, UpdateLeadInput,
};
use leadpilot_services::LeadDraft;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadBody {
    pub name: String,
    pub email: String,
    pub status: Option<LeadStatus>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateLeadBody> for LeadDraft {
    fn from(body: CreateLeadBody) -> Self {
        LeadDraft {
            name: body.name,
            email: body.email,
            status: body.status,
            phone: body.phone,
            company: body.company,
            source: body.source,
            notes: body.notes,
        }
    }
}

/// Distinguishes a field that is absent from one that is explicitly null:
/// absent stays `None`, null becomes `Some(None)`, a value `Some(Some(_))`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<LeadStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub source: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl From<UpdateLeadBody> for UpdateLeadInput {
    fn from(body: UpdateLeadBody) -> Self {
        UpdateLeadInput {
            name: body.name,
            email: body.email,
            status: body.status,
            phone: body.phone,
            company: body.company,
            source: body.source,
            notes: body.notes,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusBody {
    pub ids: Vec<Uuid>,
    pub status: LeadStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusResponse {
    pub updated_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemoLeadsResponse {
    pub created_count: usize,
}

#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "leads",
    params(
        ("q" = Option<String>, Query, description = "Search term matched against name, email, and company"),
        ("status" = Option<String>, Query, description = "Status filter: new, contacted, won, lost, or all"),
        ("sort" = Option<String>, Query, description = "Sort field: created_at, updated_at, name, email, status"),
        ("direction" = Option<String>, Query, description = "Sort direction: asc or desc"),
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("pageSize" = Option<i64>, Query, description = "Page size, 1-100")
    ),
    responses(
        (status = 200, description = "Paginated leads", body = PaginatedLeads),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, filters),
    fields(org_id = %ctx.organization_id, operation = "list_leads")
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Query(filters): Query<LeadListFilters>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state.leads.list(ctx, &filters).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead found", body = Lead),
        (status = 404, description = "Lead not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(org_id = %ctx.organization_id, lead_id = %id, operation = "get_lead")
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let lead = state.leads.get(ctx, id).await?;
    Ok(Json(lead))
}

#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "leads",
    request_body = CreateLeadBody,
    responses(
        (status = 201, description = "Lead created", body = Lead),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, body),
    fields(org_id = %ctx.organization_id, operation = "create_lead")
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    ValidatedJson(body): ValidatedJson<CreateLeadBody>,
) -> Result<impl IntoResponse, HttpAppError> {
    let lead = state.leads.create(ctx, body.into()).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead ID")),
    request_body = UpdateLeadBody,
    responses(
        (status = 200, description = "Lead updated", body = Lead),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Lead not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, body),
    fields(org_id = %ctx.organization_id, lead_id = %id, operation = "update_lead")
)]
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateLeadBody>,
) -> Result<impl IntoResponse, HttpAppError> {
    let lead = state.leads.update(ctx, id, body.into()).await?;
    Ok(Json(lead))
}

#[utoipa::path(
    delete,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = Uuid, Path, description = "Lead ID")),
    responses(
        (status = 204, description = "Lead deleted (idempotent)"),
        (status = 403, description = "Requires admin role", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(org_id = %ctx.organization_id, lead_id = %id, operation = "delete_lead")
)]
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.leads.soft_delete(ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/leads/bulk-status",
    tag = "leads",
    request_body = BulkStatusBody,
    responses(
        (status = 200, description = "Statuses updated", body = BulkStatusResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, body),
    fields(org_id = %ctx.organization_id, operation = "bulk_update_status")
)]
pub async fn bulk_update_status(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    ValidatedJson(body): ValidatedJson<BulkStatusBody>,
) -> Result<impl IntoResponse, HttpAppError> {
    let updated_count = state
        .leads
        .bulk_update_status(ctx, &body.ids, body.status)
        .await?;
    Ok(Json(BulkStatusResponse { updated_count }))
}

#[utoipa::path(
    post,
    path = "/api/v1/leads/demo",
    tag = "leads",
    responses(
        (status = 201, description = "Demo leads created; createdCount is 0 when the workspace already has leads", body = DemoLeadsResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(org_id = %ctx.organization_id, operation = "generate_demo_leads")
)]
pub async fn generate_demo_leads(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<impl IntoResponse, HttpAppError> {
    let created_count = state.leads.generate_demo_leads(ctx).await?;
    Ok((StatusCode::CREATED, Json(DemoLeadsResponse { created_count })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_absent_vs_null() {
        let absent: UpdateLeadBody = serde_json::from_str(r#"{"name":"Alice"}"#).unwrap();
        assert!(absent.phone.is_none());

        let null: UpdateLeadBody = serde_json::from_str(r#"{"phone":null}"#).unwrap();
        assert_eq!(null.phone, Some(None));

        let value: UpdateLeadBody = serde_json::from_str(r#"{"phone":"555-0100"}"#).unwrap();
        assert_eq!(value.phone, Some(Some("555-0100".to_string())));
    }

    #[test]
    fn test_create_body_camel_case_wire_names() {
        let body: CreateLeadBody = serde_json::from_str(
            r#"{"name":"Alice","email":"a@x.com","status":"contacted","company":"Acme"}"#,
        )
        .unwrap();
        assert_eq!(body.status, Some(LeadStatus::Contacted));
        assert_eq!(body.company.as_deref(), Some("Acme"));
    }
}
