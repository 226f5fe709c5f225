//! Error types for briefsmith.
//!
//! Gate decisions (cooldown, daily limit) are not errors — they are ordinary
//! return values of the gate components and are shaped into 429 responses by
//! the route handlers. `BriefsmithError` covers the genuine failure paths:
//! bad payloads, upstream provider faults, and configuration problems.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BriefsmithError>;

#[derive(Error, Debug)]
pub enum BriefsmithError {
    /// Malformed or out-of-range request payload. The inner string is the
    /// user-facing message and is surfaced verbatim in the 400 response.
    #[error("{0}")]
    Validation(String),

    /// The upstream provider call failed at the transport level: connection
    /// refused, timeout, or a non-success HTTP status.
    #[error("{0}")]
    Upstream(String),

    /// The upstream provider answered, but the payload was unusable (missing
    /// content, invalid JSON from the model, empty image data). Kept separate
    /// from [`BriefsmithError::Upstream`] so operators can tell a dead
    /// provider from a misbehaving one in the logs.
    #[error("{0}")]
    MalformedResponse(String),

    /// Missing or invalid operator configuration (e.g. no API key).
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
