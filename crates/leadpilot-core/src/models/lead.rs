use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::activity::ActivityItem;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Lead pipeline status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "lead_status", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "won" => Ok(LeadStatus::Won),
            "lost" => Ok(LeadStatus::Lost),
            other => Err(format!("Unknown lead status: {}", other)),
        }
    }
}

/// Sales lead. `organization_id` is the owning tenant and never changes;
/// `deleted_at` is the soft-delete marker (set, never cleared except by
/// import reconciliation).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: LeadStatus,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Normalized input for lead creation. Optional fields are already
/// blank-to-null coerced and the email lowercased by the time this exists.
#[derive(Debug, Clone)]
pub struct CreateLeadInput {
    pub name: String,
    pub email: String,
    pub status: LeadStatus,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

/// Partial update: outer `None` means "leave untouched"; for optional-text
/// fields the inner `None` means "set to NULL".
#[derive(Debug, Clone, Default)]
pub struct UpdateLeadInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<LeadStatus>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub source: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl UpdateLeadInput {
    /// True when no field is present, i.e. the update would be a no-op.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.status.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.source.is_none()
            && self.notes.is_none()
    }
}

/// Status filter: either a single status or the "all" sentinel (no filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(LeadStatus),
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == "all" {
            return Ok(StatusFilter::All);
        }
        raw.parse::<LeadStatus>()
            .map(StatusFilter::Only)
            .map_err(serde::de::Error::custom)
    }
}

/// Whitelisted sort columns; maps directly to column names so user input can
/// never inject into ORDER BY.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Email,
    Status,
}

impl LeadSortField {
    pub fn column(self) -> &'static str {
        match self {
            LeadSortField::CreatedAt => "created_at",
            LeadSortField::UpdatedAt => "updated_at",
            LeadSortField::Name => "name",
            LeadSortField::Email => "email",
            LeadSortField::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Listing filters. All fields optional on the wire; defaults: sort by
/// created_at descending, page 1, page size 10, soft-deleted rows excluded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadListFilters {
    pub q: Option<String>,
    pub status: Option<StatusFilter>,
    pub sort: LeadSortField,
    pub direction: SortDirection,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub include_deleted: bool,
}

impl Default for LeadListFilters {
    fn default() -> Self {
        LeadListFilters {
            q: None,
            status: None,
            sort: LeadSortField::default(),
            direction: SortDirection::default(),
            page: default_page(),
            page_size: default_page_size(),
            include_deleted: false,
        }
    }
}

impl LeadListFilters {
    /// Reject out-of-range paging before any query is built.
    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.page < 1 {
            return Err(crate::error::AppError::InvalidInput(
                "page must be a positive integer".to_string(),
            ));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(crate::error::AppError::InvalidInput(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// `max(1, ceil(total / page_size))`; an empty collection still has one page.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    ((total + page_size - 1) / page_size).max(1)
}

/// Paginated listing envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedLeads {
    pub items: Vec<Lead>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// One bucket of the overview status breakdown.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBucket {
    pub status: LeadStatus,
    pub count: i64,
}

/// Overview summary combining counts, derived metrics, and recency feeds.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSummary {
    pub total_leads: i64,
    pub new_this_week: i64,
    pub contacted_count: i64,
    pub won_count: i64,
    pub lost_count: i64,
    pub win_rate: i64,
    pub status_breakdown: Vec<StatusBucket>,
    pub recent_leads: Vec<Lead>,
    pub recent_activity: Vec<ActivityItem>,
}

/// A validated CSV import row, normalized and ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLeadRow {
    pub name: String,
    pub email: String,
    pub status: LeadStatus,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

/// Row-level CSV error. `row` is the 1-based line in the file including the
/// header, so the first data row is row 2.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
pub struct CsvRowError {
    pub row: usize,
    pub message: String,
}

/// Import reconciliation summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportResult {
    pub created_count: usize,
    pub updated_count: usize,
    pub error_count: usize,
    pub errors: Vec<CsvRowError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
        assert_eq!(total_pages(100, 1), 100);
    }

    #[test]
    fn test_filters_defaults_from_empty_query() {
        let filters: LeadListFilters = serde_json::from_str("{}").unwrap();
        assert_eq!(filters.page, 1);
        assert_eq!(filters.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(filters.sort, LeadSortField::CreatedAt);
        assert_eq!(filters.direction, SortDirection::Desc);
        assert!(!filters.include_deleted);
        assert!(filters.status.is_none());
    }

    #[test]
    fn test_filters_validation() {
        let mut filters = LeadListFilters::default();
        assert!(filters.validate().is_ok());

        filters.page = 0;
        assert!(filters.validate().is_err());

        filters.page = 1;
        filters.page_size = MAX_PAGE_SIZE + 1;
        assert!(filters.validate().is_err());
    }

    #[test]
    fn test_status_filter_deserialization() {
        let all: StatusFilter = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(all, StatusFilter::All);

        let won: StatusFilter = serde_json::from_str("\"won\"").unwrap();
        assert_eq!(won, StatusFilter::Only(LeadStatus::Won));

        assert!(serde_json::from_str::<StatusFilter>("\"bogus\"").is_err());
    }

    #[test]
    fn test_sort_field_columns_are_whitelisted() {
        let fields = [
            LeadSortField::CreatedAt,
            LeadSortField::UpdatedAt,
            LeadSortField::Name,
            LeadSortField::Email,
            LeadSortField::Status,
        ];
        for field in fields {
            assert!(field.column().chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn test_update_input_is_empty() {
        assert!(UpdateLeadInput::default().is_empty());

        let update = UpdateLeadInput {
            phone: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
