//! Bearer-token claim extraction
//!
//! The upstream gateway has already verified the token signature; here the
//! payload segment is decoded only to recover a caller identifier. Absence
//! of an identifier just disables conversation persistence.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use tracing::debug;

/// Extract a caller id (`email`, falling back to `sub`) from a
/// `Bearer <jwt>` authorization header value
pub fn caller_id_from_bearer(header: Option<&str>) -> Option<String> {
    let token = header?.strip_prefix("Bearer ")?;
    let claims = decode_payload(token)?;

    claims
        .get("email")
        .or_else(|| claims.get("sub"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Decode the middle JWT segment into a JSON object
fn decode_payload(token: &str) -> Option<serde_json::Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        debug!("authorization token is not a JWT");
        return None;
    }

    let payload = parts[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| {
            // Some issuers emit standard base64 with padding
            let padded = format!("{}{}", payload, "=".repeat((4 - payload.len() % 4) % 4));
            STANDARD.decode(padded)
        })
        .ok()?;

    serde_json::from_slice(&bytes).ok()
}
