use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_SESSION_FILE: &str = ".portal-session.json";

/// Distinguishes runtime behavior for different stages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the portal client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("PORTAL_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let raw_base_url =
            env::var("PORTAL_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(raw_base_url.trim())
            .map_err(|source| ConfigError::InvalidBaseUrl { source })?;

        let timeout_secs = env::var("PORTAL_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let session_token = env::var("PORTAL_SESSION_TOKEN")
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let cache_path = env::var("PORTAL_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE));

        let log_level = env::var("PORTAL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                session_token,
            },
            session: SessionConfig { cache_path },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings for reaching the remote portal API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
    /// Value of the `token` cookie sent with credentialed requests.
    pub session_token: Option<String>,
}

/// Where the command-line front end caches the signed-in user.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cache_path: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl { source: url::ParseError },
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl { .. } => {
                write!(f, "PORTAL_API_BASE_URL must be an absolute URL")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "PORTAL_API_TIMEOUT_SECS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidBaseUrl { source } => Some(source),
            ConfigError::InvalidTimeout => None,
        }
    }
}
