//! Public contact form intake.
//!
//! Submissions land in `contact_messages` with an `unread` status and a
//! metadata blob (client ip, user agent, referrer, UTM fields) captured at
//! submission time for the admin inbox.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use tracing::{Instrument, error, info, info_span};
use utoipa::ToSchema;

use super::json_error;
use crate::api::handlers::auth::{extract_client_ip, valid_email};

#[derive(ToSchema, Deserialize, Debug)]
pub struct ContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub inquiry_type: Option<String>,
    pub message: Option<String>,
    pub page_url: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Submission stored", body = ContactResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 500, description = "Server error")
    ),
    tag = "contact"
)]
// axum handler for contact form submissions
pub async fn submit(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Json<ContactRequest>>,
) -> impl IntoResponse {
    let Some(Json(payload)) = payload else {
        return json_error(StatusCode::BAD_REQUEST, "Missing required fields");
    };

    let missing = missing_fields(&payload);
    if !missing.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Missing required fields",
                "fields": missing,
            })),
        )
            .into_response();
    }

    // missing_fields() guarantees these are present and non-empty
    let email = payload.email.as_deref().unwrap_or_default().trim();
    if !valid_email(email) {
        return json_error(StatusCode::BAD_REQUEST, "Invalid email address");
    }

    let metadata = build_metadata(&headers, &payload);
    let metadata = match serde_json::to_string(&metadata) {
        Ok(metadata) => metadata,
        Err(err) => {
            error!("Failed to serialize contact metadata: {}", err);

            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    let query = "INSERT INTO contact_messages
        (first_name, last_name, email, phone, company, inquiry_type, message, metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8::jsonb)
        RETURNING id";

    let insert_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    let row = sqlx::query(query)
        .bind(payload.first_name.as_deref().unwrap_or_default().trim())
        .bind(payload.last_name.as_deref().unwrap_or_default().trim())
        .bind(email)
        .bind(payload.phone.as_deref().map(str::trim))
        .bind(payload.company.as_deref().map(str::trim))
        .bind(payload.inquiry_type.as_deref().unwrap_or_default().trim())
        .bind(payload.message.as_deref().unwrap_or_default().trim())
        .bind(metadata)
        .fetch_one(&pool.0)
        .instrument(insert_span)
        .await;

    match row {
        Ok(row) => {
            let id: i64 = row.get("id");

            info!(message_id = id, "Contact message stored");

            Json(ContactResponse {
                success: true,
                message: "Thank you! Your message has been received.".to_string(),
                id,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to store contact message: {}", err);

            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

/// Names of required fields that are absent or blank, in a stable order.
fn missing_fields(payload: &ContactRequest) -> Vec<&'static str> {
    let required = [
        ("first_name", &payload.first_name),
        ("last_name", &payload.last_name),
        ("email", &payload.email),
        ("inquiry_type", &payload.inquiry_type),
        ("message", &payload.message),
    ];

    required
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |value| value.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
}

fn build_metadata(headers: &HeaderMap, payload: &ContactRequest) -> serde_json::Value {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok());
    let referrer = headers.get("referer").and_then(|value| value.to_str().ok());

    json!({
        "ip": extract_client_ip(headers),
        "user_agent": user_agent,
        "referrer": referrer,
        "page_url": payload.page_url,
        "utm_source": payload.utm_source,
        "utm_medium": payload.utm_medium,
        "utm_campaign": payload.utm_campaign,
        "submitted_at": Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn full_payload() -> ContactRequest {
        ContactRequest {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: None,
            company: Some("Analytical Engines".to_string()),
            inquiry_type: Some("sales".to_string()),
            message: Some("Tell me more.".to_string()),
            page_url: Some("https://example.com/contact".to_string()),
            utm_source: Some("newsletter".to_string()),
            utm_medium: None,
            utm_campaign: None,
        }
    }

    #[test]
    fn missing_fields_empty_for_complete_payload() {
        assert!(missing_fields(&full_payload()).is_empty());
    }

    #[test]
    fn missing_fields_reports_absent_and_blank() {
        let mut payload = full_payload();
        payload.first_name = None;
        payload.message = Some("   ".to_string());

        assert_eq!(missing_fields(&payload), vec!["first_name", "message"]);
    }

    #[test]
    fn missing_fields_ignores_optional_fields() {
        let mut payload = full_payload();
        payload.phone = None;
        payload.company = None;
        payload.page_url = None;

        assert!(missing_fields(&payload).is_empty());
    }

    #[test]
    fn build_metadata_captures_headers_and_utm() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));
        headers.insert("referer", HeaderValue::from_static("https://example.com"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));

        let metadata = build_metadata(&headers, &full_payload());

        assert_eq!(metadata["user_agent"], "curl/8.0");
        assert_eq!(metadata["referrer"], "https://example.com");
        assert_eq!(metadata["ip"], "203.0.113.9");
        assert_eq!(metadata["utm_source"], "newsletter");
        assert!(metadata["submitted_at"].is_string());
    }
}
