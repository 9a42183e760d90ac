//! Database repositories for the data access layer.
//!
//! One repository per collection; every query is scoped by the owning
//! organization so no filter combination can escape the tenant partition.

pub mod db;

pub use db::{ActivityLogRepository, LeadRepository, OrganizationRepository};
