//! Client IP extraction from proxy forwarding headers.
//!
//! Usage: Add `ClientIp` as an extractor parameter.
//!
//! ```ignore
//! async fn my_handler(ip: ClientIp, ...) -> ... {
//!     if ip.is_known() { /* apply IP-keyed limits */ }
//! }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Client IP taken from the first `x-forwarded-for` entry, falling back to
/// `x-real-ip`. Empty when neither header is present; IP-keyed rate limits
/// are skipped for such requests.
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn is_known(&self) -> bool {
        !self.0.is_empty()
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let ip = match forwarded {
            Some(ip) => ip,
            None => parts
                .headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
        };

        Ok(ClientIp(ip))
    }
}
