/// Prefix for all authenticated API routes.
pub const API_PREFIX: &str = "/api/v1";
