//! Core domain types for leadpilot.
//!
//! This crate holds the domain models (organizations, memberships, leads,
//! activity log), the role/permission model, the unified `AppError` type,
//! configuration, and the normalization/validation helpers shared by the
//! database and service layers. It has no HTTP or storage dependencies.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
