//! CLI error types with miette diagnostics.
//!
//! Maps `devlink_api::Error` and `ConfigError` variants into user-facing
//! errors with actionable help text and exit codes.

use miette::Diagnostic;
use thiserror::Error;

use devlink_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the data service")]
    #[diagnostic(
        code(devlink::connection_failed),
        help(
            "Check that the data service is running and accessible.\n\
             Try: devlink devices list --insecure"
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS error: {reason}")]
    #[diagnostic(
        code(devlink::tls_error),
        help(
            "The service may be using a self-signed certificate.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(devlink::auth_failed),
        help(
            "Verify your API key.\n\
             Run: devlink config init"
        )
    )]
    AuthFailed,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(devlink::no_credentials),
        help(
            "Configure credentials with: devlink config init\n\
             Or set the DEVLINK_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Not found: {message}")]
    #[diagnostic(code(devlink::not_found))]
    NotFound { message: String },

    #[error("Rejected: {message}")]
    #[diagnostic(code(devlink::conflict))]
    Rejected { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Data service error (HTTP {status}): {message}")]
    #[diagnostic(code(devlink::api_error))]
    ApiError { status: u16, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(devlink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(devlink::profile_not_found),
        help("Create one with: devlink config init")
    )]
    ProfileNotFound { name: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(devlink::no_config),
        help(
            "Create one with: devlink config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(devlink::json), help("Check the payload contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── devlink_api::Error → CliError mapping ────────────────────────────

impl From<devlink_api::Error> for CliError {
    fn from(err: devlink_api::Error) -> Self {
        match err {
            devlink_api::Error::InvalidApiKey => CliError::AuthFailed,

            devlink_api::Error::Transport(e) => CliError::ConnectionFailed {
                source: e.into(),
            },

            devlink_api::Error::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },

            devlink_api::Error::Tls(reason) => CliError::TlsError { reason },

            devlink_api::Error::NotFound { message } => CliError::NotFound { message },

            devlink_api::Error::BadRequest { message } => CliError::Rejected { message },

            devlink_api::Error::Internal { message } => CliError::ApiError {
                status: 500,
                message,
            },

            devlink_api::Error::Api { status, message } => CliError::ApiError { status, message },

            devlink_api::Error::Deserialization { message, .. } => CliError::ApiError {
                status: 0,
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },

            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },

            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },

            ConfigError::Figment(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },

            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
