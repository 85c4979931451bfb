use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use tracing::{info, warn};

use crate::auth::password;
use crate::error::WaypostError;
use crate::middleware::auth::{AUTH_COOKIE, token_from_headers};
use crate::router::WaypostState;
use crate::types::requests::{AuthStatus, LoginRequest, LoginResponse};

/// Session lifetimes. Login offers a short and a remembered variant;
/// with auth disabled a one-day guest token keeps cookie flows alive.
const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const REMEMBER_TTL_SECS: i64 = 30 * 24 * 60 * 60;
const GUEST_TTL_SECS: i64 = 24 * 60 * 60;

pub async fn login(
    State(state): State<WaypostState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), WaypostError> {
    // Expired throttle windows are swept here instead of on a timer.
    state.throttle.cleanup();

    let client = client_identifier(&headers);
    if !state.throttle.check(&client) {
        warn!(client = %client, "login attempt throttled");
        return Err(WaypostError::RateLimited);
    }

    let auth = &state.auth;
    if !auth.enabled {
        let token = auth.codec().sign("guest", GUEST_TTL_SECS)?;
        let jar = jar.add(session_cookie(&token, GUEST_TTL_SECS, auth.insecure_cookie));
        return Ok((
            jar,
            Json(LoginResponse {
                success: true,
                message: "Authentication is disabled, logged in as guest".to_string(),
            }),
        ));
    }

    if request.username != auth.username
        || !password::verify(&request.password, &auth.password_hash)
    {
        info!(client = %client, "rejected login attempt");
        return Err(WaypostError::Unauthorized);
    }

    let ttl = if request.remember_me.unwrap_or(false) {
        REMEMBER_TTL_SECS
    } else {
        SESSION_TTL_SECS
    };
    let token = auth.codec().sign(&request.username, ttl)?;
    let jar = jar.add(session_cookie(&token, ttl, auth.insecure_cookie));
    info!(user = %request.username, "login succeeded");
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
        }),
    ))
}

pub async fn logout(
    State(state): State<WaypostState>,
    jar: CookieJar,
) -> (CookieJar, Json<LoginResponse>) {
    let jar = jar.remove(clear_session_cookie(state.auth.insecure_cookie));
    (
        jar,
        Json(LoginResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}

pub async fn status(State(state): State<WaypostState>, headers: HeaderMap) -> Json<AuthStatus> {
    // Reports false while auth is disabled even though writes are open;
    // clients key their login UI off this.
    let authenticated = match token_from_headers(&headers) {
        Some(token) if state.auth.enabled => state.auth.codec().verify(&token).valid,
        _ => false,
    };
    Json(AuthStatus { authenticated })
}

/// Throttle key for this request: first hop of `X-Forwarded-For`, then
/// `X-Real-IP`. Requests with neither share one bucket.
fn client_identifier(headers: &HeaderMap) -> String {
    for header in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = headers.get(header).and_then(|v| v.to_str().ok()) {
            let first = value.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    "unknown".to_string()
}

fn session_cookie(token: &str, max_age_secs: i64, insecure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(AUTH_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .secure(!insecure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

fn clear_session_cookie(insecure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(!insecure)
        .same_site(SameSite::Strict)
        .build()
}
