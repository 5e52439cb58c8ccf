//! Optional HTTP Basic Auth gate in front of the whole site.
//!
//! Used to keep staging deployments private. Enabled only when both gate
//! credentials are configured at startup.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64ct::{Base64, Encoding};
use std::sync::Arc;

use super::state::GateConfig;

pub(crate) async fn require_site_credentials(
    State(gate): State<Arc<GateConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return challenge("Authentication required");
    };

    match parse_basic_credentials(header) {
        Some((username, password)) if gate.matches(&username, &password) => {
            next.run(request).await
        }
        Some(_) => challenge("Invalid credentials"),
        None => challenge("Invalid authorization header"),
    }
}

fn challenge(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            axum::http::header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"Protected Area\""),
        )],
        message,
    )
        .into_response()
}

/// Decode `Basic base64(user:pass)`. Only the first `:` separates the parts,
/// so passwords containing `:` survive.
pub(crate) fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let encoded = header.trim().strip_prefix("Basic ")?.trim();
    let decoded = Base64::decode_vec(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64ct::{Base64, Encoding};

    fn basic_header(credentials: &str) -> String {
        format!("Basic {}", Base64::encode_string(credentials.as_bytes()))
    }

    #[test]
    fn parse_basic_credentials_round_trips() {
        let header = basic_header("staging:hunter2");
        assert_eq!(
            parse_basic_credentials(&header),
            Some(("staging".to_string(), "hunter2".to_string()))
        );
    }

    #[test]
    fn parse_basic_credentials_keeps_colons_in_password() {
        let header = basic_header("staging:pass:with:colons");
        assert_eq!(
            parse_basic_credentials(&header),
            Some(("staging".to_string(), "pass:with:colons".to_string()))
        );
    }

    #[test]
    fn parse_basic_credentials_rejects_other_schemes() {
        assert_eq!(parse_basic_credentials("Bearer token"), None);
        assert_eq!(parse_basic_credentials(""), None);
    }

    #[test]
    fn parse_basic_credentials_rejects_bad_base64() {
        assert_eq!(parse_basic_credentials("Basic not-base64!!!"), None);
    }

    #[test]
    fn parse_basic_credentials_requires_separator() {
        let header = basic_header("no-separator");
        assert_eq!(parse_basic_credentials(&header), None);
    }
}
