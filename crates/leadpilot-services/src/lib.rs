//! Business logic layer. Services own the repositories they need and take an
//! explicit [`OrgContext`](leadpilot_core::models::OrgContext) on every call;
//! there is no ambient tenant state.

pub mod context;
pub mod csv;
pub mod leads;
pub mod members;

pub use context::ContextResolver;
pub use leads::{LeadDraft, LeadService};
pub use members::MemberService;
