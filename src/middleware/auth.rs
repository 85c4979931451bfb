use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::TokenCodec;
use crate::config::AuthConfig;
use crate::error::WaypostError;
use crate::router::WaypostState;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth_token";

/// Resolved auth settings plus the token codec, shared via state.
#[derive(Clone)]
pub struct AuthRuntime {
    pub enabled: bool,
    pub username: String,
    pub password_hash: String,
    pub required_for_read: bool,
    pub insecure_cookie: bool,
    codec: TokenCodec,
}

impl AuthRuntime {
    pub fn new(cfg: &AuthConfig, insecure_cookie: bool) -> Self {
        Self {
            enabled: cfg.enabled,
            username: cfg.username.clone(),
            password_hash: cfg.password_hash.clone(),
            required_for_read: cfg.required_for_read,
            insecure_cookie,
            codec: TokenCodec::new(cfg.secret.as_str()),
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Whether this request counts as authenticated. With auth disabled
    /// everyone does; otherwise only a valid token does. The result
    /// also decides whether private rows are visible.
    pub fn request_is_authenticated(&self, headers: &HeaderMap) -> bool {
        if !self.enabled {
            return true;
        }
        match token_from_headers(headers) {
            Some(token) => self.codec.verify(&token).valid,
            None => false,
        }
    }
}

/// Pull the session token from the request: the `auth_token` cookie
/// first, then an `Authorization: Bearer` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        return Some(cookie.value().to_string());
    }

    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
        {
            return Some(token.to_string());
        }
    }

    None
}

/// Extractor for read endpoints. Rejects only when reads are gated;
/// otherwise it reports whether private rows may be shown.
#[derive(Debug, Clone, Copy)]
pub struct ReadAccess {
    pub authenticated: bool,
}

impl FromRequestParts<WaypostState> for ReadAccess {
    type Rejection = WaypostError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &WaypostState,
    ) -> Result<Self, Self::Rejection> {
        let authenticated = state.auth.request_is_authenticated(&parts.headers);
        if state.auth.required_for_read && !authenticated {
            return Err(WaypostError::Unauthorized);
        }
        Ok(Self { authenticated })
    }
}

/// Extractor for write endpoints: a valid session or auth disabled.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth;

impl FromRequestParts<WaypostState> for RequireAuth {
    type Rejection = WaypostError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &WaypostState,
    ) -> Result<Self, Self::Rejection> {
        if !state.auth.request_is_authenticated(&parts.headers) {
            return Err(WaypostError::Unauthorized);
        }
        Ok(Self)
    }
}
