use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use hyper::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::auth::{username_from, AuthError};
use crate::error::AppError;
use crate::store::Store;
use crate::types::ActivityRow;

#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct ActivityPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub details: Option<String>,
    pub badge: Option<String>,
    pub raffle_id: Option<i32>,
    pub username: String,
}

#[derive(Serialize, ToSchema)]
pub(crate) struct ActivityListResponse {
    pub ok: bool,
    pub data: Vec<ActivityRow>,
}

#[utoipa::path(
    post,
    path = "/api/activity/log",
    request_body = ActivityPayload,
    responses((status = 200, description = "Activity recorded", body = ActivityListResponse))
)]
pub(crate) async fn log_activity(
    State(store): State<Arc<Store>>,
    Json(payload): Json<ActivityPayload>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let q = "--sql
        insert into activity_log (type, title, details, badge, raffle_id, username, timestamp)
        values ($1, $2, $3, $4, $5, $6, now())
        returning *;
    ";

    let row: ActivityRow = sqlx::query_as(q)
        .bind(&payload.kind)
        .bind(&payload.title)
        .bind(&payload.details)
        .bind(&payload.badge)
        .bind(payload.raffle_id)
        .bind(&payload.username)
        .fetch_one(&db_pool)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true, "data": row })))
}

#[utoipa::path(
    get,
    path = "/api/activity/list",
    responses(
        (status = 200, description = "The caller's last 100 activities; empty when anonymous", body = ActivityListResponse)
    )
)]
pub(crate) async fn list_activities(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    // Anonymous callers get an empty feed rather than a 401.
    let Some(username) = username_from(&headers) else {
        warn!("no username header on activity list, returning empty feed");
        return Ok(Json(ActivityListResponse {
            ok: true,
            data: Vec::new(),
        }));
    };

    let db_pool = store.lock().await.db_pool.clone();

    let q = "--sql
        select *
        from activity_log
        where username = $1
        order by timestamp desc
        limit 100;
    ";

    let rows: Vec<ActivityRow> = sqlx::query_as(q).bind(&username).fetch_all(&db_pool).await?;

    Ok(Json(ActivityListResponse {
        ok: true,
        data: rows,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/activity/clear",
    responses(
        (status = 200, description = "The caller's activities removed"),
        (status = 401, description = "Missing identity header", body = AuthError)
    )
)]
pub(crate) async fn clear_activities(
    State(store): State<Arc<Store>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let Some(username) = username_from(&headers) else {
        return Ok((
            hyper::StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "ok": false, "error": "User not authenticated" })),
        )
            .into_response());
    };

    let db_pool = store.lock().await.db_pool.clone();

    let result = sqlx::query("delete from activity_log where username = $1")
        .bind(&username)
        .execute(&db_pool)
        .await?;

    tracing::info!(count = result.rows_affected(), user = %username, "cleared activity feed");
    Ok(Json(serde_json::json!({ "ok": true })).into_response())
}
