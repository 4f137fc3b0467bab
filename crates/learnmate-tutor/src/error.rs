//! Error types for the LearnMate tutor backend.
//!
//! This module defines the error hierarchy for configuration loading,
//! request validation, and upstream completion calls. Upstream errors are
//! produced by the completion client but never reach an HTTP caller: the
//! engine converts them into an offline fallback answer.

/// A specialized `Result` type for tutor operations.
pub type Result<T> = std::result::Result<T, TutorError>;

/// Errors that can occur while serving tutoring requests.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// An environment variable holds a value that cannot be parsed.
    #[error("Invalid value for {variable}: {message}\n\nSuggestion: Fix or unset {variable} in your environment or .env file")]
    ConfigParseError {
        /// Name of the offending environment variable.
        variable: String,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the operator.
        suggestion: String,
    },

    /// No upstream API key is configured, so live tutoring is unavailable.
    #[error("OpenAI API key not configured\n\nSuggestion: Set OPENAI_API_KEY in your environment or .env file")]
    MissingApiKey,

    // ========================================================================
    // Client Input Errors
    // ========================================================================
    /// The tutoring request carried an empty or whitespace-only message.
    #[error("Message cannot be empty")]
    EmptyMessage,

    // ========================================================================
    // Upstream Errors
    // ========================================================================
    /// The chat-completion API call failed.
    #[error("Upstream API error ({kind}): {message}\n\nSuggestion: {suggestion}")]
    UpstreamError {
        /// The kind of upstream failure.
        kind: UpstreamErrorKind,
        /// Detailed error message.
        message: String,
        /// Actionable suggestion for the operator.
        suggestion: String,
    },

    /// The HTTP client for the upstream API could not be constructed.
    #[error("Failed to build HTTP client: {message}")]
    HttpClient {
        /// Description of the failure.
        message: String,
    },
}

/// Categories of upstream API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Authentication failure (invalid or revoked API key).
    Authentication,
    /// Rate limit or quota exceeded.
    RateLimit,
    /// Server error (5xx responses).
    Server,
    /// Network connectivity issues.
    Network,
    /// The call did not finish within the configured timeout.
    Timeout,
    /// The response body could not be understood.
    MalformedResponse,
    /// No API key was available for the call.
    MissingApiKey,
    /// Other unclassified errors.
    Other,
}

impl std::fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Server => write!(f, "server"),
            Self::Network => write!(f, "network"),
            Self::Timeout => write!(f, "timeout"),
            Self::MalformedResponse => write!(f, "malformed_response"),
            Self::MissingApiKey => write!(f, "missing_api_key"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl UpstreamErrorKind {
    /// Returns a suggestion message for this error kind.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::Authentication => "Check the OPENAI_API_KEY value",
            Self::RateLimit => "Reduce request volume or check the account quota",
            Self::Server => "Retry later; the model provider may be experiencing issues",
            Self::Network => "Check network connectivity and OPENAI_BASE_URL",
            Self::Timeout => "Raise UPSTREAM_TIMEOUT_SECS or check provider latency",
            Self::MalformedResponse => {
                "Check that OPENAI_BASE_URL points at a chat-completions API"
            }
            Self::MissingApiKey => "Set OPENAI_API_KEY in your environment or .env file",
            Self::Other => "Check the model provider's status page",
        }
    }
}

impl TutorError {
    /// Creates a new `ConfigParseError` for the given variable.
    #[must_use]
    pub fn config_parse(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `UpstreamError` with automatic suggestion based on error kind.
    #[must_use]
    pub fn upstream(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        let suggestion = kind.suggestion().to_string();
        Self::UpstreamError {
            kind,
            message: message.into(),
            suggestion,
        }
    }

    /// Creates a new `HttpClient` error.
    #[must_use]
    pub fn http_client(message: impl Into<String>) -> Self {
        Self::HttpClient {
            message: message.into(),
        }
    }

    /// Returns the upstream error kind, if this is an upstream failure.
    #[must_use]
    pub const fn upstream_kind(&self) -> Option<UpstreamErrorKind> {
        match self {
            Self::UpstreamError { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns `true` if this error was caused by the caller's input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyMessage)
    }

    /// Returns `true` if this error is a misconfiguration of the service.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. } | Self::ConfigValidationError { .. } | Self::MissingApiKey
        )
    }
}
