use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::Admin;
use crate::error::AppError;
use crate::participant::{roster_from_stored, Participant};
use crate::projection::filled_spots;
use crate::store::Store;
use crate::types::{JoinedRaffleRow, RaffleHistoryRow};


#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) enum AdminError {
    #[schema(example = "ID and type are required")]
    BadRequest(String),
    #[schema(example = "Raffle not found")]
    NotFound(String),
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub(crate) struct Winner {
    pub username: String,
    pub spots: i64,
}

/// One row of the admin ledger, active or archived.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminRaffleEntry {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub username: String,
    pub reddit_link: String,
    pub status: String,
    pub date: DateTime<Utc>,
    pub total_spots: i32,
    pub filled_spots: i64,
    pub cost_per_spot: f64,
    pub total_revenue: String,
    pub participants: Vec<Participant>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminStats {
    pub total_active: usize,
    pub total_history: usize,
    pub total: usize,
    pub total_completed: usize,
    pub total_cancelled: usize,
}

#[derive(Serialize, ToSchema)]
pub(crate) struct AllRafflesResponse {
    pub ok: bool,
    pub raffles: Vec<AdminRaffleEntry>,
    pub stats: AdminStats,
}

pub(crate) fn active_entry(row: JoinedRaffleRow) -> AdminRaffleEntry {
    let roster = roster_from_stored(Some(row.participants));
    let filled = filled_spots(&roster);

    AdminRaffleEntry {
        id: row.id,
        kind: "active",
        username: row
            .actual_username
            .or(row.username)
            .unwrap_or_else(|| "Unknown".to_string()),
        reddit_link: row.reddit_link.unwrap_or_default(),
        status: "Active".to_string(),
        date: row.created_at,
        total_spots: row.total_spots,
        filled_spots: filled,
        cost_per_spot: row.cost_per_spot,
        total_revenue: format_revenue(filled, row.cost_per_spot),
        participants: roster,
    }
}

pub(crate) fn history_entry(row: RaffleHistoryRow) -> AdminRaffleEntry {
    let roster = roster_from_stored(Some(row.participants));
    let filled = filled_spots(&roster);

    AdminRaffleEntry {
        id: row.id,
        kind: "history",
        username: row.username.unwrap_or_else(|| "Unknown".to_string()),
        reddit_link: row.reddit_link.unwrap_or_default(),
        status: row.status,
        date: row.raffle_date,
        total_spots: row.total_spots,
        filled_spots: filled,
        cost_per_spot: row.cost_per_spot,
        total_revenue: format_revenue(filled, row.cost_per_spot),
        participants: roster,
    }
}

pub(crate) fn format_revenue(filled: i64, cost_per_spot: f64) -> String {
    format!("{:.2}", filled as f64 * cost_per_spot)
}

pub(crate) fn compute_stats(
    total_active: usize,
    total_history: usize,
    entries: &[AdminRaffleEntry],
) -> AdminStats {
    AdminStats {
        total_active,
        total_history,
        total: entries.len(),
        total_completed: entries
            .iter()
            .filter(|e| e.status.eq_ignore_ascii_case("completed"))
            .count(),
        total_cancelled: entries
            .iter()
            .filter(|e| e.status.eq_ignore_ascii_case("cancelled"))
            .count(),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/all-raffles",
    responses(
        (status = 200, description = "Active and archived raffles with fill and revenue, newest first", body = AllRafflesResponse),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub(crate) async fn all_raffles(
    State(store): State<Arc<Store>>,
    _admin: Admin,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let active_q = "--sql
        select ar.id, ar.reddit_link, ar.total_spots, ar.cost_per_spot, ar.participants,
               ar.fast_raffle_enabled, ar.username, ar.created_at, ar.updated_at,
               u.username as actual_username
        from active_raffle ar
        left join users u on ar.user_id = u.id
        order by ar.created_at desc;
    ";
    let history_q = "--sql
        select *
        from raffle_history
        order by raffle_date desc;
    ";

    let active_rows: Vec<JoinedRaffleRow> = sqlx::query_as(active_q).fetch_all(&db_pool).await?;
    let history_rows: Vec<RaffleHistoryRow> = sqlx::query_as(history_q).fetch_all(&db_pool).await?;

    let total_active = active_rows.len();
    let total_history = history_rows.len();

    let mut raffles: Vec<AdminRaffleEntry> = active_rows
        .into_iter()
        .map(active_entry)
        .chain(history_rows.into_iter().map(history_entry))
        .collect();
    raffles.sort_by(|a, b| b.date.cmp(&a.date));

    let stats = compute_stats(total_active, total_history, &raffles);

    Ok(Json(AllRafflesResponse {
        ok: true,
        raffles,
        stats,
    }))
}

#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct FinishRafflePayload {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub winner: Option<Winner>,
}

#[utoipa::path(
    post,
    path = "/api/admin/finish-raffle",
    request_body = FinishRafflePayload,
    responses(
        (status = 200, description = "Raffle moved to history as completed"),
        (status = 400, description = "Not an active raffle", body = AdminError),
        (status = 404, description = "Raffle not found", body = AdminError)
    )
)]
pub(crate) async fn finish_raffle(
    State(store): State<Arc<Store>>,
    _admin: Admin,
    Json(payload): Json<FinishRafflePayload>,
) -> Result<Response, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    if payload.kind != "active" {
        return Ok(bad_request("Can only finish active raffles"));
    }

    if !archive_raffle(&db_pool, payload.id, "completed", payload.winner.as_ref()).await? {
        return Ok(not_found("Active raffle not found"));
    }

    info!(raffle_id = payload.id, "finished raffle, moved to history");
    Ok(Json(
        serde_json::json!({ "ok": true, "message": "Raffle finished successfully and moved to completed" }),
    )
    .into_response())
}

#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelRafflePayload {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
}

#[utoipa::path(
    post,
    path = "/api/admin/cancel-raffle",
    request_body = CancelRafflePayload,
    responses(
        (status = 200, description = "Raffle moved to history as cancelled"),
        (status = 400, description = "Not an active raffle", body = AdminError),
        (status = 404, description = "Raffle not found", body = AdminError)
    )
)]
pub(crate) async fn cancel_raffle(
    State(store): State<Arc<Store>>,
    _admin: Admin,
    Json(payload): Json<CancelRafflePayload>,
) -> Result<Response, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    if payload.kind != "active" {
        return Ok(bad_request("Can only cancel active raffles"));
    }

    if !archive_raffle(&db_pool, payload.id, "cancelled", None).await? {
        return Ok(not_found("Active raffle not found"));
    }

    info!(raffle_id = payload.id, "cancelled raffle, moved to history");
    Ok(Json(
        serde_json::json!({ "ok": true, "message": "Raffle cancelled successfully and moved to history" }),
    )
    .into_response())
}

/// Copy an active raffle into `raffle_history` under the given status, then
/// drop the active row. Returns false when the raffle does not exist.
async fn archive_raffle(
    db_pool: &PgPool,
    id: i32,
    status: &str,
    winner: Option<&Winner>,
) -> Result<bool, AppError> {
    let q = "--sql
        select ar.id, ar.reddit_link, ar.total_spots, ar.cost_per_spot, ar.participants,
               ar.fast_raffle_enabled, ar.username, ar.created_at, ar.updated_at,
               u.username as actual_username
        from active_raffle ar
        left join users u on ar.user_id = u.id
        where ar.id = $1;
    ";

    let Some(row) = sqlx::query_as::<_, JoinedRaffleRow>(q)
        .bind(id)
        .fetch_optional(db_pool)
        .await?
    else {
        return Ok(false);
    };

    let winner_json = winner.and_then(|w| serde_json::to_value(w).ok());

    let mut tx = db_pool.begin().await?;

    sqlx::query(
        "--sql
        insert into raffle_history
            (raffle_date, status, reddit_link, total_spots, cost_per_spot, participants,
             total_owed, total_paid, winner, username)
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10);
    ",
    )
    .bind(row.created_at)
    .bind(status)
    .bind(&row.reddit_link)
    .bind(row.total_spots)
    .bind(row.cost_per_spot)
    .bind(&row.participants)
    .bind(0f64)
    .bind(0f64)
    .bind(winner_json)
    .bind(row.actual_username.as_deref().or(row.username.as_deref()))
    .execute(&mut *tx)
    .await?;

    sqlx::query("delete from active_raffle where id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

#[utoipa::path(
    delete,
    path = "/api/admin/raffle/{id}",
    params(("id" = i32, Path, description = "Active raffle id")),
    responses(
        (status = 200, description = "Raffle deleted"),
        (status = 404, description = "Raffle not found", body = AdminError)
    )
)]
pub(crate) async fn delete_active_raffle(
    Path(id): Path<i32>,
    State(store): State<Arc<Store>>,
    _admin: Admin,
) -> Result<Response, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let result = sqlx::query("delete from active_raffle where id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(not_found("Raffle not found"));
    }

    info!(raffle_id = id, "admin deleted active raffle");
    Ok(Json(serde_json::json!({ "ok": true, "message": "Raffle deleted successfully" })).into_response())
}

#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct DeleteRafflePayload {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
}

#[utoipa::path(
    delete,
    path = "/api/admin/delete-raffle",
    request_body = DeleteRafflePayload,
    responses(
        (status = 200, description = "Raffle deleted from the named table"),
        (status = 400, description = "Unknown raffle type", body = AdminError),
        (status = 404, description = "Raffle not found", body = AdminError)
    )
)]
pub(crate) async fn delete_raffle(
    State(store): State<Arc<Store>>,
    _admin: Admin,
    Json(payload): Json<DeleteRafflePayload>,
) -> Result<Response, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let q = match payload.kind.as_str() {
        "active" => "delete from active_raffle where id = $1",
        "history" => "delete from raffle_history where id = $1",
        _ => {
            return Ok(bad_request(
                "Invalid type. Must be \"active\" or \"history\"",
            ))
        }
    };

    let result = sqlx::query(q).bind(payload.id).execute(&db_pool).await?;

    if result.rows_affected() == 0 {
        return Ok(not_found("Raffle not found"));
    }

    info!(raffle_id = payload.id, kind = %payload.kind, "admin deleted raffle");
    Ok(Json(serde_json::json!({ "ok": true, "message": "Raffle deleted successfully" })).into_response())
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(AdminError::BadRequest(message.to_string())),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(AdminError::NotFound(message.to_string())),
    )
        .into_response()
}
