//! Client identity for rate limiting.
//!
//! The service runs behind a reverse proxy, so the key is the first entry of
//! `X-Forwarded-For`. Requests without it all share the `"unknown"` key and
//! therefore one window per category.

use std::convert::Infallible;
use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Key shared by every request that carries no forwarding header.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the client key from request headers.
pub fn client_id(headers: &HeaderMap) -> String {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Extractor form of [`client_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientId(client_id(&parts.headers)))
    }
}
