//! Domain models.

pub mod activity;
pub mod context;
pub mod lead;
pub mod organization;
pub mod role;

pub use activity::{ActivityItem, ActivityLogEntry};
pub use context::OrgContext;
pub use lead::{
    total_pages, CreateLeadInput, CsvImportResult, CsvLeadRow, CsvRowError, Lead, LeadListFilters,
    LeadSortField, LeadStatus, OverviewSummary, PaginatedLeads, SortDirection, StatusBucket,
    StatusFilter, UpdateLeadInput, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use organization::{MemberView, Membership, Organization, OrganizationMembersView};
pub use role::Role;
