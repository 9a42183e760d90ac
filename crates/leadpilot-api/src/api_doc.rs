use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeadPilot API",
        description = "Multi-tenant lead management backend: leads, CSV import/export, dashboard overview, and organization members."
    ),
    paths(
        handlers::health::health,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::create_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::bulk_update_status,
        handlers::leads::generate_demo_leads,
        handlers::overview::overview,
        handlers::csv::export_leads,
        handlers::csv::import_leads,
        handlers::members::list_members,
        handlers::members::update_member_role,
    ),
    components(schemas(
        ErrorResponse,
        leadpilot_core::models::Lead,
        leadpilot_core::models::LeadStatus,
        leadpilot_core::models::PaginatedLeads,
        leadpilot_core::models::OverviewSummary,
        leadpilot_core::models::StatusBucket,
        leadpilot_core::models::ActivityItem,
        leadpilot_core::models::CsvImportResult,
        leadpilot_core::models::CsvRowError,
        leadpilot_core::models::Role,
        leadpilot_core::models::MemberView,
        leadpilot_core::models::OrganizationMembersView,
        handlers::leads::CreateLeadBody,
        handlers::leads::UpdateLeadBody,
        handlers::leads::BulkStatusBody,
        handlers::leads::BulkStatusResponse,
        handlers::leads::DemoLeadsResponse,
        handlers::csv::ImportLeadsBody,
        handlers::members::UpdateRoleBody,
    )),
    tags(
        (name = "leads", description = "Lead management"),
        (name = "overview", description = "Dashboard summary"),
        (name = "csv", description = "CSV import and export"),
        (name = "members", description = "Organization members"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
