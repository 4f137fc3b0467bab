//! Configuration for the LearnMate tutor backend.
//!
//! Configuration is read from environment variables (a `.env` file may be
//! loaded into the environment by the binary first). A missing API key is
//! not an error at load time: the service still starts and serves its
//! catalog endpoints, and chat requests answer with a configuration error.

use std::time::Duration;

use axum::http::HeaderValue;

use crate::error::{Result, TutorError};

/// Environment variable holding the upstream API key.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the upstream model identifier.
pub const ENV_MODEL: &str = "OPENAI_MODEL";
/// Environment variable holding the upstream API base URL.
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable holding comma-separated allowed CORS origins.
pub const ENV_CORS_ORIGINS: &str = "CORS_ORIGINS";
/// Environment variable holding the bind host.
pub const ENV_HOST: &str = "HOST";
/// Environment variable holding the bind port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable holding the upstream timeout in seconds.
pub const ENV_UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT_SECS";

/// Default model used for chat completions.
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// Default base URL of the chat-completions API.
fn default_api_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default allowed CORS origins (the frontend dev server).
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:4200".to_string()]
}

/// Default bind host.
fn default_host() -> String {
    "localhost".to_string()
}

/// Default bind port.
const fn default_port() -> u16 {
    8000
}

/// Default upstream timeout in seconds.
const fn default_upstream_timeout() -> u64 {
    30
}

/// Main configuration for the tutor backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// API key for the chat-completions provider. `None` disables live chat.
    pub api_key: Option<String>,

    /// Model identifier sent with every completion request.
    pub model: String,

    /// Base URL of the chat-completions API (without `/chat/completions`).
    pub api_base_url: String,

    /// Origins allowed by the CORS layer. A single `*` allows any origin.
    pub cors_origins: Vec<String>,

    /// Host name or address to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Upper bound on a single upstream completion call, in seconds.
    pub upstream_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base_url: default_api_base_url(),
            cors_origins: default_cors_origins(),
            host: default_host(),
            port: default_port(),
            upstream_timeout_secs: default_upstream_timeout(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("cors_origins", &self.cors_origins)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::ConfigParseError` if a numeric variable cannot be
    /// parsed, or `TutorError::ConfigValidationError` if the resulting values
    /// are invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self {
            api_key: get(ENV_API_KEY),
            ..Self::default()
        };

        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            config.api_base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(origins) = get(ENV_CORS_ORIGINS) {
            config.cors_origins = parse_origins(&origins);
        }
        if let Some(host) = get(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            config.port = port
                .parse()
                .map_err(|e| TutorError::config_parse(ENV_PORT, format!("'{port}': {e}")))?;
        }
        if let Some(timeout) = get(ENV_UPSTREAM_TIMEOUT) {
            config.upstream_timeout_secs = timeout.parse().map_err(|e| {
                TutorError::config_parse(ENV_UPSTREAM_TIMEOUT, format!("'{timeout}': {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// Checks that:
    /// - `model` and `api_base_url` are not empty
    /// - `upstream_timeout_secs` is greater than 0
    /// - at least one CORS origin is listed and each is a valid header value
    ///
    /// # Errors
    ///
    /// Returns `TutorError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(TutorError::config_validation(
                "model must not be empty",
                "Set OPENAI_MODEL to a chat model name or leave it unset for the default",
            ));
        }

        if self.api_base_url.trim().is_empty() {
            return Err(TutorError::config_validation(
                "API base URL must not be empty",
                "Set OPENAI_BASE_URL or leave it unset for the default",
            ));
        }

        if self.upstream_timeout_secs == 0 {
            return Err(TutorError::config_validation(
                "upstream timeout must be greater than 0",
                "Set UPSTREAM_TIMEOUT_SECS to at least 1",
            ));
        }

        if self.cors_origins.is_empty() {
            return Err(TutorError::config_validation(
                "at least one CORS origin is required",
                "Set CORS_ORIGINS to a comma-separated list such as http://localhost:4200",
            ));
        }

        if let Some(bad) = self
            .cors_origins
            .iter()
            .find(|origin| HeaderValue::from_str(origin).is_err())
        {
            return Err(TutorError::config_validation(
                format!("CORS origin '{bad}' is not a valid header value"),
                "Remove control characters from CORS_ORIGINS",
            ));
        }

        Ok(())
    }

    /// Returns `true` if an upstream API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Returns the upstream call timeout.
    #[must_use]
    pub const fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Returns `true` if the CORS layer should allow any origin.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

/// Splits a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}
