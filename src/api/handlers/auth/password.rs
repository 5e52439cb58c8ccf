//! Salted password hashing plus the change-password endpoint.
//!
//! Stored format is `salt:digest` where `salt` is 16 random bytes hex-encoded
//! and `digest` is the hex SHA-256 of `password || salt`.

use anyhow::{Context, Result};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::error;

use super::{
    session::{Verdict, authorize},
    storage::{lookup_password_hash, update_password_hash},
    types::{ChangePasswordRequest, OkResponse},
};
use crate::api::handlers::json_error;

/// Hex SHA-256 digest of `plaintext || salt`. Deterministic.
pub fn hash_password(plaintext: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fresh random salt: 16 bytes from the system RNG, hex-encoded.
///
/// # Errors
/// Returns an error if the system RNG fails.
pub fn generate_salt() -> Result<String> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate salt")?;
    Ok(hex::encode(bytes))
}

/// Check a plaintext candidate against a stored `salt:digest` value.
///
/// Fails closed on malformed input; the digest comparison is constant-time.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once(':') else {
        return false;
    };
    if salt.is_empty() || expected.is_empty() {
        return false;
    }
    let computed = hash_password(plaintext, salt);
    constant_time_eq(computed.as_bytes(), expected.as_bytes())
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[utoipa::path(
    post,
    path = "/api/admin/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = OkResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Unauthorized or current password mismatch")
    ),
    tag = "auth"
)]
pub async fn change_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> impl IntoResponse {
    // Guard before any other work.
    let account_id = match authorize(&headers, &pool).await {
        Ok(Verdict::Authenticated(session)) => session.account_id,
        Ok(Verdict::Unauthenticated(_)) => {
            return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
        Err(status) => return json_error(status, "Server error"),
    };

    let Some(Json(request)) = payload else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "Current and new password are required",
        );
    };
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "Current and new password are required",
        );
    }

    let stored = match lookup_password_hash(&pool, account_id).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            error!("Account {account_id} has a session but no credential row");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
        Err(err) => {
            error!("Failed to load password hash: {err}");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    if !verify_password(&request.current_password, &stored) {
        return json_error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let replacement = match generate_salt() {
        Ok(salt) => format!("{salt}:{}", hash_password(&request.new_password, &salt)),
        Err(err) => {
            error!("Failed to generate salt: {err}");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    if let Err(err) = update_password_hash(&pool, account_id, &replacement).await {
        error!("Failed to update password hash: {err}");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }

    (StatusCode::OK, Json(OkResponse { success: true })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let first = hash_password("secret1", "abcd");
        let second = hash_password("secret1", "abcd");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn distinct_salts_give_distinct_digests() {
        let s1 = generate_salt().expect("salt");
        let s2 = generate_salt().expect("salt");
        assert_ne!(s1, s2);
        assert_eq!(s1.len(), 32);
        assert_ne!(hash_password("secret1", &s1), hash_password("secret1", &s2));
    }

    #[test]
    fn verify_round_trip() {
        let salt = generate_salt().expect("salt");
        let stored = format!("{salt}:{}", hash_password("secret1", &salt));
        assert!(verify_password("secret1", &stored));
        assert!(!verify_password("wrong", &stored));
    }

    #[test]
    fn verify_fails_closed_on_malformed_values() {
        assert!(!verify_password("secret1", "no-separator"));
        assert!(!verify_password("secret1", ""));
        assert!(!verify_password("secret1", ":digest-without-salt"));
        assert!(!verify_password("secret1", "salt-without-digest:"));
    }

    #[test]
    fn verify_splits_on_first_colon_only() {
        // A digest can never contain ':', so extra separators must not match.
        let salt = "abcd";
        let stored = format!("{salt}:{}:trailing", hash_password("secret1", salt));
        assert!(!verify_password("secret1", &stored));
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
        assert!(constant_time_eq(b"", b""));
    }
}
