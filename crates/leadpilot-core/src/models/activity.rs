use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Dotted activity event names appended by lead mutations.
pub mod actions {
    pub const LEAD_CREATED: &str = "lead.created";
    pub const LEAD_UPDATED: &str = "lead.updated";
    pub const LEAD_SOFT_DELETED: &str = "lead.soft_deleted";
    pub const LEAD_DEMO_GENERATED: &str = "lead.demo_generated";
}

/// Append-only activity log row. Never cascaded by lead deletion; soft-delete
/// leaves history intact.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub actor_id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// Trimmed activity row for the overview feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub created_at: DateTime<Utc>,
}
