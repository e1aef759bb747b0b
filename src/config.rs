//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::{AppError, Result};

/// Environment variable holding the bearer token for both services.
pub const SERVICE_TOKEN_ENV: &str = "COMPLIANCE_SERVICE_TOKEN";

/// Location of an external HTTP service.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ServiceConfig {
    /// Base URL, e.g. `https://history.internal`.
    pub endpoint: String,
}

/// External evaluator process settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct EvaluatorConfig {
    /// Program to run for each evaluation.
    pub command: String,
    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Resource-history service used for oversized notifications.
    pub history: ServiceConfig,
    /// Compliance-tracking service that receives evaluations.
    pub tracking: ServiceConfig,
    /// Evaluator process.
    pub evaluator: EvaluatorConfig,
    /// Bearer token for both services (populated at runtime).
    #[serde(skip)]
    pub service_token: Option<String>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize endpoints.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the optional service token from [`SERVICE_TOKEN_ENV`].
    ///
    /// A missing or empty variable leaves the token unset and requests are
    /// sent without an `Authorization` header.
    pub fn load_credentials(&mut self) {
        self.service_token = env::var(SERVICE_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty());
        if self.service_token.is_none() {
            debug!(key = SERVICE_TOKEN_ENV, "no service token configured");
        }
    }

    fn validate(&mut self) -> Result<()> {
        self.history.endpoint = normalize_endpoint("history.endpoint", &self.history.endpoint)?;
        self.tracking.endpoint = normalize_endpoint("tracking.endpoint", &self.tracking.endpoint)?;

        if self.evaluator.command.trim().is_empty() {
            return Err(AppError::Config(
                "evaluator.command must not be empty".into(),
            ));
        }

        Ok(())
    }
}

fn normalize_endpoint(key: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::Config(format!("{key} must not be empty")));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(AppError::Config(format!(
            "{key} must start with http:// or https://"
        )));
    }
    Ok(trimmed.to_owned())
}
