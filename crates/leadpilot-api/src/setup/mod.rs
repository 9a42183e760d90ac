//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod database;
pub mod routes;
pub mod server;

use crate::auth::middleware::AuthState;
use crate::state::AppState;
use anyhow::{Context, Result};
use leadpilot_core::Config;
use leadpilot_db::{ActivityLogRepository, LeadRepository, OrganizationRepository};
use leadpilot_services::{ContextResolver, LeadService, MemberService};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production());

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;

    let organizations = OrganizationRepository::new(pool.clone());
    let leads = LeadRepository::new(pool.clone());
    let activity = ActivityLogRepository::new(pool);

    let resolver = ContextResolver::new(organizations.clone());
    let state = Arc::new(AppState {
        config: config.clone(),
        leads: LeadService::new(leads, activity),
        members: MemberService::new(organizations),
    });

    let auth_state = Arc::new(AuthState {
        jwt_secret: config.jwt_secret().to_string(),
        resolver,
    });

    let router = routes::setup_routes(&config, state.clone(), auth_state)?;

    Ok((state, router))
}
