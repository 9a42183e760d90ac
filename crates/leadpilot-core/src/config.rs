//! Configuration module
//!
//! Environment-driven configuration for the API server: database pool
//! sizing, listen port, JWT settings, CORS, and import size limits.

use std::env;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const IDLE_TIMEOUT_SECS: u64 = 600;
const MAX_LIFETIME_SECS: u64 = 1800;
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    database_url: String,
    db_max_connections: u32,
    db_timeout_seconds: u64,
    db_idle_timeout_seconds: u64,
    db_max_lifetime_seconds: u64,
    jwt_secret: String,
    cors_origins: Vec<String>,
    environment: String,
    max_import_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let server_port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(MAX_CONNECTIONS);

        let db_timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(CONNECTION_TIMEOUT_SECS);

        let db_idle_timeout_seconds = env::var("DB_IDLE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(IDLE_TIMEOUT_SECS);

        let db_max_lifetime_seconds = env::var("DB_MAX_LIFETIME_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(MAX_LIFETIME_SECS);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let max_import_bytes = env::var("MAX_IMPORT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_IMPORT_BYTES);

        let config = Config {
            server_port,
            database_url,
            db_max_connections,
            db_timeout_seconds,
            db_idle_timeout_seconds,
            db_max_lifetime_seconds,
            jwt_secret,
            cors_origins,
            environment,
            max_import_bytes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        if self.is_production() && self.jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters in production");
        }
        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.db_timeout_seconds
    }

    pub fn db_idle_timeout_seconds(&self) -> u64 {
        self.db_idle_timeout_seconds
    }

    pub fn db_max_lifetime_seconds(&self) -> u64 {
        self.db_max_lifetime_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn max_import_bytes(&self) -> usize {
        self.max_import_bytes
    }

    /// Construct a configuration directly; used by tests and embedded setups.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        server_port: u16,
        database_url: String,
        db_max_connections: u32,
        db_timeout_seconds: u64,
        db_idle_timeout_seconds: u64,
        db_max_lifetime_seconds: u64,
        jwt_secret: String,
        cors_origins: Vec<String>,
        environment: String,
        max_import_bytes: usize,
    ) -> Self {
        Config {
            server_port,
            database_url,
            db_max_connections,
            db_timeout_seconds,
            db_idle_timeout_seconds,
            db_max_lifetime_seconds,
            jwt_secret,
            cors_origins,
            environment,
            max_import_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(environment: &str, jwt_secret: &str) -> Config {
        Config::new(
            8080,
            "postgres://localhost/leadpilot".to_string(),
            20,
            30,
            IDLE_TIMEOUT_SECS,
            MAX_LIFETIME_SECS,
            jwt_secret.to_string(),
            vec![],
            environment.to_string(),
            DEFAULT_MAX_IMPORT_BYTES,
        )
    }

    #[test]
    fn test_is_production() {
        assert!(test_config("production", "x".repeat(32).as_str()).is_production());
        assert!(test_config("PROD", "x".repeat(32).as_str()).is_production());
        assert!(!test_config("development", "secret").is_production());
    }

    #[test]
    fn test_validate_rejects_short_production_secret() {
        let config = test_config("production", "short");
        assert!(config.validate().is_err());

        let config = test_config("development", "short");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_tuning_getters() {
        let config = test_config("development", "secret");
        assert_eq!(config.db_max_connections(), 20);
        assert_eq!(config.db_timeout_seconds(), 30);
        assert_eq!(config.db_idle_timeout_seconds(), IDLE_TIMEOUT_SECS);
        assert_eq!(config.db_max_lifetime_seconds(), MAX_LIFETIME_SECS);
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let config = Config::new(
            8080,
            "".to_string(),
            20,
            30,
            IDLE_TIMEOUT_SECS,
            MAX_LIFETIME_SECS,
            "secret".to_string(),
            vec![],
            "development".to_string(),
            DEFAULT_MAX_IMPORT_BYTES,
        );
        assert!(config.validate().is_err());
    }
}
