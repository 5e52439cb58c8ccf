//! Site settings key/value store.
//!
//! Reads are public so the frontend can fetch rendering flags without a
//! session; writes go through the session guard. The analytics endpoint
//! serves the `ga_snippet` value with a short cache window.

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, HeaderValue, StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use tracing::{Instrument, error, info_span};
use utoipa::{IntoParams, ToSchema};

use super::json_error;
use crate::api::handlers::auth::session::{Verdict, authorize};

const ANALYTICS_KEY: &str = "ga_snippet";
const ANALYTICS_CACHE_CONTROL: &str = "public, max-age=300";

#[derive(ToSchema, IntoParams, Deserialize, Debug)]
pub struct GetParams {
    pub key: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SettingValue {
    pub value: String,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct PutRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/admin/settings",
    params(GetParams),
    responses(
        (status = 200, description = "Setting value, empty string when unset", body = SettingValue),
        (status = 400, description = "Missing key"),
        (status = 500, description = "Server error")
    ),
    tag = "settings"
)]
// axum handler for reading a setting
pub async fn get(pool: Extension<PgPool>, Query(params): Query<GetParams>) -> impl IntoResponse {
    let Some(key) = params.key.filter(|key| !key.trim().is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Key required");
    };

    match fetch_value(&pool, key.trim()).await {
        Ok(value) => {
            // Unset keys read as an empty string, not an error.
            let value = value.unwrap_or_default();
            (StatusCode::OK, Json(SettingValue { value })).into_response()
        }
        Err(err) => {
            error!("Failed to read setting: {}", err);

            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/settings",
    request_body = PutRequest,
    responses(
        (status = 200, description = "Setting stored"),
        (status = 400, description = "Missing key"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Server error")
    ),
    tag = "settings"
)]
// axum handler for writing a setting
pub async fn put(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Json<PutRequest>>,
) -> impl IntoResponse {
    match authorize(&headers, &pool).await {
        Ok(Verdict::Authenticated(_)) => {}
        Ok(Verdict::Unauthenticated(_)) => {
            return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
        Err(status) => return json_error(status, "Server error"),
    }

    let Some(Json(payload)) = payload else {
        return json_error(StatusCode::BAD_REQUEST, "Key required");
    };
    let Some(key) = payload.key.as_deref().map(str::trim).filter(|key| !key.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Key required");
    };
    let value = payload.value.unwrap_or_default();

    let query = "INSERT INTO settings (key, value, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()";
    let upsert_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    match sqlx::query(query)
        .bind(key)
        .bind(&value)
        .execute(&pool.0)
        .instrument(upsert_span)
        .await
    {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(err) => {
            error!("Failed to write setting: {}", err);

            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/settings/analytics",
    responses(
        (status = 200, description = "Analytics snippet, empty string when unset"),
        (status = 500, description = "Server error")
    ),
    tag = "settings"
)]
// axum handler for the public analytics snippet
pub async fn analytics(pool: Extension<PgPool>) -> impl IntoResponse {
    match fetch_value(&pool, ANALYTICS_KEY).await {
        Ok(value) => {
            let snippet = value.unwrap_or_default();
            let headers = [(
                CACHE_CONTROL,
                HeaderValue::from_static(ANALYTICS_CACHE_CONTROL),
            )];
            (StatusCode::OK, headers, Json(json!({ "snippet": snippet }))).into_response()
        }
        Err(err) => {
            error!("Failed to read analytics snippet: {}", err);

            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

async fn fetch_value(pool: &PgPool, key: &str) -> anyhow::Result<Option<String>> {
    let query = "SELECT value FROM settings WHERE key = $1";
    let select_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(key)
        .fetch_optional(pool)
        .instrument(select_span)
        .await?;

    Ok(row.map(|row| row.get("value")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_value_serializes_value_field() {
        let value = serde_json::to_value(SettingValue {
            value: "on".to_string(),
        })
        .expect("serialize");
        assert_eq!(value, json!({ "value": "on" }));
    }

    #[test]
    fn put_request_tolerates_missing_fields() {
        let payload: PutRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(payload.key.is_none());
        assert!(payload.value.is_none());
    }
}
