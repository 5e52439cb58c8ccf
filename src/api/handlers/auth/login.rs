//! Admin login endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::{
    password::verify_password,
    session::session_cookie,
    state::AuthConfig,
    storage::{insert_session, lookup_account, touch_last_login},
    types::{LoginRequest, LoginResponse, UserProfile},
    utils::normalize_email,
};
use crate::api::handlers::json_error;

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success, session cookie set", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Server error")
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return json_error(StatusCode::BAD_REQUEST, "Email and password are required");
    };

    let email = normalize_email(&request.email);
    if email.is_empty() || request.password.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Email and password are required");
    }

    let account = match lookup_account(&pool, &email).await {
        Ok(Some(account)) => account,
        // Same body as a password mismatch to prevent email enumeration.
        Ok(None) => return json_error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(err) => {
            error!("Login lookup failed: {err}");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    if !verify_password(&request.password, &account.password_hash) {
        return json_error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let (session_id, _expires_at) =
        match insert_session(&pool, account.id, config.session_ttl_seconds()).await {
            Ok(session) => session,
            Err(err) => {
                error!("Failed to create session: {err}");
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
            }
        };

    if let Err(err) = touch_last_login(&pool, account.id).await {
        // The session is already minted; losing the last-login stamp is not
        // worth failing the login over.
        error!("Failed to update last login: {err}");
    }

    let mut response_headers = HeaderMap::new();
    match session_cookie(&config, &session_id) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    }

    let response = LoginResponse {
        success: true,
        user: UserProfile {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
        },
    };
    (StatusCode::OK, response_headers, Json(response)).into_response()
}
