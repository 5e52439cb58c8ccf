//! Session validation, the shared auth guard, and the verify/logout
//! endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;

use super::{
    state::AuthConfig,
    storage::{SessionRow, delete_session, lookup_session},
    types::{LogoutResponse, UserProfile, VerifyResponse},
};

pub(crate) const SESSION_COOKIE_NAME: &str = "session";

/// Why a request was not authenticated. Callers collapse all three into a
/// generic unauthorized response; the distinction only feeds logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DenyReason {
    /// No `session` cookie in the request.
    NoCookie,
    /// Cookie present but no matching session row.
    UnknownSession,
    /// Session row exists but its expiry has passed.
    Expired,
}

/// Outcome of the auth guard. Never persisted.
pub(crate) enum Verdict {
    Authenticated(SessionRow),
    Unauthenticated(DenyReason),
}

/// Resolve the request's cookie header into an authorization verdict.
///
/// Every protected handler calls this before doing any other work. Store
/// errors are logged and mapped to a 500 for the caller to surface.
pub(crate) async fn authorize(
    headers: &HeaderMap,
    pool: &PgPool,
) -> Result<Verdict, StatusCode> {
    let Some(session_id) = extract_session_id(headers) else {
        return Ok(Verdict::Unauthenticated(DenyReason::NoCookie));
    };
    match lookup_session(pool, &session_id).await {
        Ok(row) => Ok(evaluate_session(row, Utc::now())),
        Err(err) => {
            error!("Failed to lookup session: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Pure validation step: a session is valid iff its row exists and the
/// current time is strictly before the expiry.
pub(crate) fn evaluate_session(row: Option<SessionRow>, now: DateTime<Utc>) -> Verdict {
    match row {
        None => Verdict::Unauthenticated(DenyReason::UnknownSession),
        Some(row) if now >= row.expires_at => Verdict::Unauthenticated(DenyReason::Expired),
        Some(row) => Verdict::Authenticated(row),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/verify",
    responses(
        (status = 200, description = "Session is active", body = VerifyResponse),
        (status = 401, description = "No valid session", body = VerifyResponse)
    ),
    tag = "auth"
)]
pub async fn verify(headers: HeaderMap, pool: Extension<PgPool>) -> impl IntoResponse {
    match authorize(&headers, &pool).await {
        Ok(Verdict::Authenticated(session)) => {
            let response = VerifyResponse {
                authenticated: true,
                user: Some(profile(&session)),
                error: None,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(Verdict::Unauthenticated(reason)) => {
            // Never reveal whether the account or session exists.
            let message = match reason {
                DenyReason::NoCookie => "No session",
                DenyReason::UnknownSession | DenyReason::Expired => "Invalid or expired session",
            };
            let response = VerifyResponse {
                authenticated: false,
                user: None,
                error: Some(message.to_string()),
            };
            (StatusCode::UNAUTHORIZED, Json(response)).into_response()
        }
        Err(status) => {
            let response = VerifyResponse {
                authenticated: false,
                user: None,
                error: Some("Server error".to_string()),
            };
            (status, Json(response)).into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses(
        (status = 200, description = "Session cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, pool: Extension<PgPool>) -> impl IntoResponse {
    if let Some(session_id) = extract_session_id(&headers) {
        if let Err(err) = delete_session(&pool, &session_id).await {
            error!("Failed to delete session: {err}");
        }
    }

    // Always clear the cookie, even if no session row existed.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie() {
        response_headers.insert(SET_COOKIE, cookie);
    }
    let response = LogoutResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    };
    (StatusCode::OK, response_headers, Json(response)).into_response()
}

pub(super) fn profile(session: &SessionRow) -> UserProfile {
    UserProfile {
        id: session.account_id,
        email: session.email.clone(),
        name: session.name.clone(),
        role: session.role.clone(),
    }
}

/// Build the session cookie. All attributes are mandatory on every issuance.
pub(super) fn session_cookie(
    config: &AuthConfig,
    session_id: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let cookie = format!(
        "{SESSION_COOKIE_NAME}={session_id}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={ttl_seconds}"
    );
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie() -> Result<HeaderValue, InvalidHeaderValue> {
    let cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0");
    HeaderValue::from_str(&cookie)
}

/// Pull the session identifier out of the `Cookie` header.
///
/// Pairs are split on `;`, then on the FIRST `=` only, so values containing
/// `=` (e.g. base64) survive intact. Pairs without `=` (browsers send these
/// for nameless cookies) are skipped, not treated as the end of the header.
pub(crate) fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let Some(key) = parts.next() else { continue };
        let Some(val) = parts.next() else { continue };
        if key.trim() == SESSION_COOKIE_NAME {
            return Some(val.trim().to_string());
        }
    }
    None
}
