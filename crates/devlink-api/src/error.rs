use thiserror::Error;

/// Top-level error type for the `devlink-api` crate.
///
/// Covers transport failures, data-service rejections, and the domain
/// conditions surfaced by the registry and group-membership operations.
/// The CLI maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// API key rejected by the data service.
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Domain ──────────────────────────────────────────────────────
    /// Missing device, group, or user association.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Rejected input (duplicate group membership, malformed payload).
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// A write succeeded structurally but returned no usable identifier.
    #[error("Internal error: {message}")]
    Internal { message: String },

    // ── Data service ────────────────────────────────────────────────
    /// Non-success response from the data service.
    #[error("Data service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates a missing resource,
    /// either a domain-level lookup miss or an HTTP 404 from the service.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Api { status: 404, .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 503,
            _ => false,
        }
    }
}
