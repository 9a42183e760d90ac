use leadpilot_core::Config;
use leadpilot_services::{LeadService, MemberService};

/// Shared application state injected into every handler.
pub struct AppState {
    pub config: Config,
    pub leads: LeadService,
    pub members: MemberService,
}
