//! Repository implementations.

pub mod activity;
pub mod leads;
pub mod organizations;

pub use activity::ActivityLogRepository;
pub use leads::LeadRepository;
pub use organizations::OrganizationRepository;
