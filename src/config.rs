use std::collections::HashMap;

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Process configuration read from environment variables.
///
/// - `DATABASE_URL` — MongoDB connection string (required to start)
/// - `DATABASE_NAME` — database holding the content collections (required to start)
/// - `HOST` — bind address, default `0.0.0.0`
/// - `PORT` — listening port, default `8000`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub database_name: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Build the config from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::load(config::Environment::default())
    }

    /// Build the config from an explicit variable map (useful for testing).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, AppError> {
        Self::load(config::Environment::default().source(Some(vars)))
    }

    fn load(environment: config::Environment) -> Result<Self, AppError> {
        let settings = config::Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .add_source(environment.try_parsing(true))
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        config.database_url = config.database_url.filter(|v| !v.trim().is_empty());
        config.database_name = config.database_name.filter(|v| !v.trim().is_empty());
        Ok(config)
    }

    /// Connection string and database name, or an error naming what is missing.
    ///
    /// Startup refuses to continue without both.
    pub fn store_settings(&self) -> Result<(&str, &str), AppError> {
        let url = self
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::Config("DATABASE_URL not set".into()))?;
        let name = self
            .database_name
            .as_deref()
            .ok_or_else(|| AppError::Config("DATABASE_NAME not set".into()))?;
        Ok((url, name))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
