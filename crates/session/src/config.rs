//! Session core configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KIFAYATI_AUTH_BASE_URL` - Base URL of the identity provider REST API
//! - `KIFAYATI_AUTH_API_KEY` - Provider API key
//!
//! ## Optional
//! - `KIFAYATI_EXTERNAL_PROVIDER_ID` - Federated provider identifier
//!   (default: google.com)
//! - `KIFAYATI_LOGIN_TIMEOUT_SECS` - External-login handshake timeout in
//!   seconds (default: 300)
//! - `KIFAYATI_CREDENTIAL_STORE` - Path of the credential hint file
//!   (default: .kifayati-credentials.json)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CREDENTIAL_STORE: &str = ".kifayati-credentials.json";
const DEFAULT_EXTERNAL_PROVIDER_ID: &str = "google.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Session subsystem configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the identity provider REST API.
    pub provider_base_url: Url,
    /// Provider API key, appended to every request.
    pub provider_api_key: SecretString,
    /// Federated provider identifier used in credential exchange.
    pub external_provider_id: String,
    /// How long an external-login handshake may stay pending.
    pub login_timeout: Duration,
    /// Path of the credential hint file.
    pub credential_store_path: PathBuf,
}

impl SessionConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let provider_base_url = Url::parse(&get_required_env("KIFAYATI_AUTH_BASE_URL")?)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("KIFAYATI_AUTH_BASE_URL".to_string(), e.to_string())
            })?;

        let provider_api_key = SecretString::from(get_required_env("KIFAYATI_AUTH_API_KEY")?);

        let timeout_secs = get_env_or_default(
            "KIFAYATI_LOGIN_TIMEOUT_SECS",
            &DEFAULT_LOGIN_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("KIFAYATI_LOGIN_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            provider_base_url,
            provider_api_key,
            external_provider_id: get_env_or_default(
                "KIFAYATI_EXTERNAL_PROVIDER_ID",
                DEFAULT_EXTERNAL_PROVIDER_ID,
            ),
            login_timeout: Duration::from_secs(timeout_secs),
            credential_store_path: PathBuf::from(get_env_or_default(
                "KIFAYATI_CREDENTIAL_STORE",
                DEFAULT_CREDENTIAL_STORE,
            )),
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
