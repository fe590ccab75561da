//! HTTP Basic authentication middleware.
//!
//! Every request must carry `Authorization: Basic <base64(user:pass)>`
//! matching the configured credentials. Anything else gets a 401 with a
//! `WWW-Authenticate: Basic realm="Restricted"` challenge.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::AuthConfig;

/// Challenge sent with every 401.
pub const CHALLENGE: &str = "Basic realm=\"Restricted\"";

/// Expected credentials for the Basic auth middleware.
#[derive(Clone)]
pub struct BasicAuth {
    username: Arc<[u8]>,
    password: Arc<[u8]>,
}

impl BasicAuth {
    /// Create from configured credentials.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username: Arc::from(config.username.as_bytes()),
            password: Arc::from(config.password.as_bytes()),
        }
    }

    /// Check a username/password pair.
    ///
    /// Both halves are compared in constant time and combined before the
    /// result is read, so neither the position of a mismatch nor which half
    /// mismatched changes the work done.
    pub fn verify(&self, username: &[u8], password: &[u8]) -> bool {
        let user_ok = username.ct_eq(&self.username);
        let pass_ok = password.ct_eq(&self.password);
        (user_ok & pass_ok).into()
    }

    /// Check the `Authorization` header of a request.
    pub fn verify_headers(&self, headers: &HeaderMap) -> bool {
        match basic_credentials(headers) {
            Some((username, password)) => self.verify(&username, &password),
            None => false,
        }
    }
}

/// Extract the decoded `user:pass` pair from a Basic `Authorization` header.
///
/// Returns `None` for a missing header, another scheme, invalid base64 or a
/// payload without a colon.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(Vec<u8>, Vec<u8>)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let colon = decoded.iter().position(|&b| b == b':')?;
    let password = decoded[colon + 1..].to_vec();
    let mut username = decoded;
    username.truncate(colon);
    Some((username, password))
}

/// Axum middleware rejecting requests without valid Basic credentials.
pub async fn require_basic_auth(
    State(auth): State<BasicAuth>,
    request: Request,
    next: Next,
) -> Response {
    if auth.verify_headers(request.headers()) {
        return next.run(request).await;
    }

    debug!(uri = %request.uri(), "rejected request without valid credentials");
    unauthorized()
}

/// 401 response carrying the Basic challenge.
pub fn unauthorized() -> Response {
    let mut response = (StatusCode::UNAUTHORIZED, Body::empty()).into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}
