use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::participant::{roster_from_stored, Participant};
use crate::store::Store;
use crate::types::RaffleHistoryRow;

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryPayload {
    pub raffle_date: Option<DateTime<Utc>>,
    pub status: String,
    pub reddit_link: Option<String>,
    #[serde(default)]
    pub total_spots: i32,
    #[serde(default)]
    pub cost_per_spot: f64,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub total_owed: f64,
    #[serde(default)]
    pub total_paid: f64,
    #[schema(value_type = Option<Object>)]
    pub winner: Option<Value>,
    pub username: Option<String>,
}

/// Archived raffle in wire form.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryEntry {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub status: String,
    pub reddit_link: Option<String>,
    pub total_spots: i32,
    pub cost_per_spot: f64,
    pub participants: Vec<Participant>,
    pub total_owed: f64,
    pub total_paid: f64,
    #[schema(value_type = Option<Object>)]
    pub winner: Option<Value>,
    pub username: Option<String>,
}

impl From<RaffleHistoryRow> for HistoryEntry {
    fn from(row: RaffleHistoryRow) -> Self {
        HistoryEntry {
            id: row.id,
            date: row.raffle_date,
            status: row.status,
            reddit_link: row.reddit_link,
            total_spots: row.total_spots,
            cost_per_spot: row.cost_per_spot,
            participants: roster_from_stored(Some(row.participants)),
            total_owed: row.total_owed,
            total_paid: row.total_paid,
            winner: row.winner,
            username: row.username,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub(crate) struct HistoryListResponse {
    pub ok: bool,
    pub data: Vec<HistoryEntry>,
}

#[utoipa::path(
    post,
    path = "/api/raffle/history",
    request_body = HistoryPayload,
    responses(
        (status = 200, description = "Raffle appended to history", body = HistoryListResponse)
    )
)]
pub(crate) async fn save_history(
    State(store): State<Arc<Store>>,
    Json(payload): Json<HistoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let q = "--sql
        insert into raffle_history
            (raffle_date, status, reddit_link, total_spots, cost_per_spot, participants,
             total_owed, total_paid, winner, username)
        values (coalesce($1, now()), $2, $3, $4, $5, $6, $7, $8, $9, $10)
        returning *;
    ";

    let roster = serde_json::to_value(&payload.participants).unwrap_or(Value::Array(Vec::new()));

    let row: RaffleHistoryRow = sqlx::query_as(q)
        .bind(payload.raffle_date)
        .bind(&payload.status)
        .bind(&payload.reddit_link)
        .bind(payload.total_spots)
        .bind(payload.cost_per_spot)
        .bind(roster)
        .bind(payload.total_owed)
        .bind(payload.total_paid)
        .bind(&payload.winner)
        .bind(&payload.username)
        .fetch_one(&db_pool)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true, "data": HistoryEntry::from(row) })))
}

#[utoipa::path(
    get,
    path = "/api/raffle/history",
    responses(
        (status = 200, description = "Full raffle history, newest first", body = HistoryListResponse)
    )
)]
pub(crate) async fn list_history(
    State(store): State<Arc<Store>>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let q = "--sql
        select *
        from raffle_history
        order by raffle_date desc;
    ";

    let rows: Vec<RaffleHistoryRow> = sqlx::query_as(q).fetch_all(&db_pool).await?;

    Ok(Json(HistoryListResponse {
        ok: true,
        data: rows.into_iter().map(HistoryEntry::from).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/raffle/history",
    responses((status = 200, description = "All history removed"))
)]
pub(crate) async fn clear_history(
    State(store): State<Arc<Store>>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    sqlx::query("delete from raffle_history")
        .execute(&db_pool)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[utoipa::path(
    delete,
    path = "/api/raffle/history/{id}",
    params(("id" = i32, Path, description = "History entry id")),
    responses((status = 200, description = "History entry removed"))
)]
pub(crate) async fn delete_history_entry(
    Path(id): Path<i32>,
    State(store): State<Arc<Store>>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    sqlx::query("delete from raffle_history where id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
