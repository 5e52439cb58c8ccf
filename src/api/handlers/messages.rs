//! Admin inbox for contact messages: list, detail, and status updates.
//!
//! Every handler here runs the session guard first and answers 401 with a
//! generic body when it fails. Opening a message flips it from `unread` to
//! `read` and stamps `read_at`.

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{Instrument, error, info_span};
use utoipa::{IntoParams, ToSchema};

use super::json_error;
use crate::api::handlers::auth::session::{Verdict, authorize};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

const MESSAGE_COLUMNS: &str = "id, first_name, last_name, email, phone, company, \
    inquiry_type, message, metadata::text AS metadata, status, created_at, read_at";

#[derive(ToSchema, IntoParams, Deserialize, Debug, Default)]
pub struct ListParams {
    /// Restrict the listing to one status (`unread`, `read`, or `archived`).
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Message {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub inquiry_type: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct InboxStats {
    pub unread: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ListResponse {
    pub messages: Vec<Message>,
    pub pagination: Pagination,
    pub stats: InboxStats,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct UpdateRequest {
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/admin/messages",
    params(ListParams),
    responses(
        (status = 200, description = "Page of messages", body = ListResponse),
        (status = 400, description = "Invalid status filter"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Server error")
    ),
    tag = "messages"
)]
// axum handler for listing contact messages
pub async fn list(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    match authorize(&headers, &pool).await {
        Ok(Verdict::Authenticated(_)) => {}
        Ok(Verdict::Unauthenticated(_)) => {
            return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
        Err(status) => return json_error(status, "Server error"),
    }

    if let Some(status) = params.status.as_deref() {
        if !valid_status(status) {
            return json_error(
                StatusCode::BAD_REQUEST,
                "Invalid status. Must be: unread, read, or archived",
            );
        }
    }

    let limit = clamp_limit(params.limit);
    let offset = params.offset.unwrap_or(0).max(0);

    match fetch_page(&pool, params.status.as_deref(), limit, offset).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!("Failed to list contact messages: {}", err);

            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/messages/{id}",
    params(("id" = i64, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message detail", body = Message),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such message"),
        (status = 500, description = "Server error")
    ),
    tag = "messages"
)]
// axum handler for message detail, marks unread messages as read
pub async fn detail(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match authorize(&headers, &pool).await {
        Ok(Verdict::Authenticated(_)) => {}
        Ok(Verdict::Unauthenticated(_)) => {
            return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
        Err(status) => return json_error(status, "Server error"),
    }

    // Opening a message marks it read exactly once.
    let query = "UPDATE contact_messages
        SET status = 'read', read_at = NOW()
        WHERE id = $1 AND status = 'unread'";
    let mark_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    if let Err(err) = sqlx::query(query)
        .bind(id)
        .execute(&pool.0)
        .instrument(mark_span)
        .await
    {
        error!("Failed to mark message as read: {}", err);

        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }

    let query = format!("SELECT {MESSAGE_COLUMNS} FROM contact_messages WHERE id = $1");
    let select_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    match sqlx::query(&query)
        .bind(id)
        .fetch_optional(&pool.0)
        .instrument(select_span)
        .await
    {
        Ok(Some(row)) => (StatusCode::OK, Json(message_from_row(&row))).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Message not found"),
        Err(err) => {
            error!("Failed to fetch message {}: {}", id, err);

            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/admin/messages/{id}",
    params(("id" = i64, Path, description = "Message id")),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such message"),
        (status = 500, description = "Server error")
    ),
    tag = "messages"
)]
// axum handler for updating a message's status
pub async fn update(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Path(id): Path<i64>,
    payload: Option<Json<UpdateRequest>>,
) -> impl IntoResponse {
    match authorize(&headers, &pool).await {
        Ok(Verdict::Authenticated(_)) => {}
        Ok(Verdict::Unauthenticated(_)) => {
            return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
        Err(status) => return json_error(status, "Server error"),
    }

    let status = payload
        .as_ref()
        .and_then(|Json(payload)| payload.status.as_deref())
        .unwrap_or_default();
    if !valid_status(status) {
        return json_error(
            StatusCode::BAD_REQUEST,
            "Invalid status. Must be: unread, read, or archived",
        );
    }

    // Transitioning into `read` stamps read_at if it was never set.
    let query = "UPDATE contact_messages
        SET status = $2,
            read_at = CASE WHEN $2 = 'read' AND read_at IS NULL THEN NOW() ELSE read_at END
        WHERE id = $1";
    let update_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    match sqlx::query(query)
        .bind(id)
        .bind(status)
        .execute(&pool.0)
        .instrument(update_span)
        .await
    {
        Ok(result) if result.rows_affected() == 0 => {
            json_error(StatusCode::NOT_FOUND, "Message not found")
        }
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(err) => {
            error!("Failed to update message {}: {}", id, err);

            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

async fn fetch_page(
    pool: &PgPool,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<ListResponse> {
    let (list_query, count_query) = if status.is_some() {
        (
            format!(
                "SELECT {MESSAGE_COLUMNS} FROM contact_messages
                 WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            ),
            "SELECT COUNT(*) AS total FROM contact_messages WHERE status = $1".to_string(),
        )
    } else {
        (
            format!(
                "SELECT {MESSAGE_COLUMNS} FROM contact_messages
                 ORDER BY created_at DESC LIMIT $1 OFFSET $2"
            ),
            "SELECT COUNT(*) AS total FROM contact_messages".to_string(),
        )
    };

    let list_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = list_query.as_str()
    );
    let rows = if let Some(status) = status {
        sqlx::query(&list_query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .instrument(list_span)
            .await?
    } else {
        sqlx::query(&list_query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .instrument(list_span)
            .await?
    };

    let count_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = count_query.as_str()
    );
    let total: i64 = if let Some(status) = status {
        sqlx::query(&count_query)
            .bind(status)
            .fetch_one(pool)
            .instrument(count_span)
            .await?
            .get("total")
    } else {
        sqlx::query(&count_query)
            .fetch_one(pool)
            .instrument(count_span)
            .await?
            .get("total")
    };

    let unread_query = "SELECT COUNT(*) AS unread FROM contact_messages WHERE status = 'unread'";
    let unread_span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = unread_query
    );
    let unread: i64 = sqlx::query(unread_query)
        .fetch_one(pool)
        .instrument(unread_span)
        .await?
        .get("unread");

    let messages: Vec<Message> = rows.iter().map(message_from_row).collect();

    Ok(ListResponse {
        pagination: Pagination {
            total,
            limit,
            offset,
            has_more: offset + (messages.len() as i64) < total,
        },
        stats: InboxStats { unread },
        messages,
    })
}

fn message_from_row(row: &PgRow) -> Message {
    let metadata: Option<String> = row.get("metadata");
    let metadata = metadata
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or(serde_json::Value::Null);

    Message {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        company: row.get("company"),
        inquiry_type: row.get("inquiry_type"),
        message: row.get("message"),
        metadata,
        status: row.get("status"),
        created_at: row.get("created_at"),
        read_at: row.get("read_at"),
    }
}

fn valid_status(status: &str) -> bool {
    matches!(status, "unread" | "read" | "archived")
}

/// Page size defaults to 50 and never exceeds 100. Non-positive values fall
/// back to the default.
fn clamp_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(limit) if limit > 0 => limit.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_status_accepts_known_values() {
        assert!(valid_status("unread"));
        assert!(valid_status("read"));
        assert!(valid_status("archived"));
    }

    #[test]
    fn valid_status_rejects_everything_else() {
        assert!(!valid_status(""));
        assert!(!valid_status("deleted"));
        assert!(!valid_status("READ"));
    }

    #[test]
    fn clamp_limit_defaults_and_caps() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(100)), MAX_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(5000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn clamp_limit_rejects_non_positive() {
        assert_eq!(clamp_limit(Some(0)), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(-5)), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn pagination_has_more_flag() {
        let pagination = Pagination {
            total: 120,
            limit: 50,
            offset: 50,
            has_more: true,
        };
        let value = serde_json::to_value(&pagination).expect("serialize");
        assert_eq!(value["hasMore"], true);
    }
}
