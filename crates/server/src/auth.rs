//! Bearer token extraction.
//!
//! The gateway never validates tokens itself; it only checks for their
//! presence and forwards them to the device-management API.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// Extract the bearer token from the Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(&v[7..])
            } else {
                None
            }
        })
}
