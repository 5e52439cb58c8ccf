//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public account profile; never includes the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OkResponse {
    pub success: bool,
}

/// Uniform failure envelope: every error body carries an `error` string.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn login_request_round_trips() -> Result<()> {
        let request = LoginRequest {
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let email = value
            .get("email")
            .and_then(serde_json::Value::as_str)
            .context("missing email")?;
        assert_eq!(email, "alice@example.com");
        let decoded: LoginRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.password, "secret1");
        Ok(())
    }

    #[test]
    fn verify_response_omits_absent_fields() -> Result<()> {
        let response = VerifyResponse {
            authenticated: false,
            user: None,
            error: Some("No session".to_string()),
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("user").is_none());
        assert_eq!(
            value.get("error").and_then(serde_json::Value::as_str),
            Some("No session")
        );
        Ok(())
    }

    #[test]
    fn login_response_exposes_profile_fields() -> Result<()> {
        let response = LoginResponse {
            success: true,
            user: UserProfile {
                id: 1,
                email: "a@x.com".to_string(),
                name: "Admin".to_string(),
                role: "admin".to_string(),
            },
        };
        let value = serde_json::to_value(&response)?;
        let user = value.get("user").context("missing user")?;
        assert_eq!(user.get("role").and_then(serde_json::Value::as_str), Some("admin"));
        assert!(user.get("password_hash").is_none());
        Ok(())
    }
}
