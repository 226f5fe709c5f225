//! Client identity resolution from request headers.

use axum::http::HeaderMap;

/// Identity assigned when no usable forwarded-address header is present.
///
/// All such clients share one quota bucket. That is an accepted limitation of
/// address-based throttling, not a bug.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Resolve the client identity for gating.
///
/// Reads `x-forwarded-for`, takes the first comma-separated entry, and trims
/// whitespace. Returns [`UNKNOWN_IDENTITY`] when the header is absent, is not
/// valid UTF-8, or trims to empty. The value is spoofable and unauthenticated;
/// the gate only needs a best-effort bucket key.
pub fn client_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string())
}
