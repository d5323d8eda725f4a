use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::Identity;
use crate::error::AppError;
use crate::participant::{roster_from_stored, Participant};
use crate::store::Store;
use crate::types::ActiveRaffleRow;

mod test;

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveRafflePayload {
    pub reddit_link: Option<String>,
    #[serde(default)]
    pub total_spots: i32,
    #[serde(default)]
    pub cost_per_spot: f64,
    pub polling_interval: Option<i32>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub fast_raffle_enabled: bool,
    pub fast_raffle_start_time: Option<DateTime<Utc>>,
}

/// The camelCase wire shape of a stored raffle.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RaffleData {
    pub id: i32,
    pub reddit_link: Option<String>,
    pub total_spots: i32,
    pub cost_per_spot: f64,
    pub polling_interval: Option<i32>,
    pub participants: Vec<Participant>,
    pub fast_raffle_enabled: bool,
    pub fast_raffle_start_time: Option<DateTime<Utc>>,
}

impl From<ActiveRaffleRow> for RaffleData {
    fn from(row: ActiveRaffleRow) -> Self {
        RaffleData {
            id: row.id,
            reddit_link: row.reddit_link,
            total_spots: row.total_spots,
            cost_per_spot: row.cost_per_spot,
            polling_interval: row.polling_interval,
            participants: roster_from_stored(Some(row.participants)),
            fast_raffle_enabled: row.fast_raffle_enabled,
            fast_raffle_start_time: row.fast_raffle_start_time,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct RaffleEnvelope {
    pub ok: bool,
    pub data: Option<RaffleData>,
}

#[utoipa::path(
    post,
    path = "/api/raffle/save",
    request_body = SaveRafflePayload,
    responses(
        (status = 200, description = "Active raffle replaced for the calling user", body = RaffleEnvelope),
        (status = 401, description = "Missing identity headers")
    )
)]
pub(crate) async fn save_raffle(
    State(store): State<Arc<Store>>,
    identity: Identity,
    Json(payload): Json<SaveRafflePayload>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    // One active raffle per seller: replace whatever was there.
    sqlx::query("delete from active_raffle where user_id = $1")
        .bind(identity.user_id)
        .execute(&db_pool)
        .await?;

    let q = "--sql
        insert into active_raffle
            (reddit_link, total_spots, cost_per_spot, polling_interval, participants,
             fast_raffle_enabled, fast_raffle_start_time, username, user_id, updated_at)
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
        returning *;
    ";

    let roster = serde_json::to_value(&payload.participants).unwrap_or(Value::Array(Vec::new()));

    let row: ActiveRaffleRow = sqlx::query_as(q)
        .bind(&payload.reddit_link)
        .bind(payload.total_spots)
        .bind(payload.cost_per_spot)
        .bind(payload.polling_interval)
        .bind(roster)
        .bind(payload.fast_raffle_enabled)
        .bind(payload.fast_raffle_start_time)
        .bind(&identity.username)
        .bind(identity.user_id)
        .fetch_one(&db_pool)
        .await?;

    info!(
        raffle_id = row.id,
        user_id = identity.user_id,
        participants = payload.participants.len(),
        "saved active raffle"
    );

    Ok(Json(RaffleEnvelope {
        ok: true,
        data: Some(row.into()),
    }))
}

#[utoipa::path(
    get,
    path = "/api/raffle/load",
    responses(
        (status = 200, description = "The calling user's active raffle, or null data if none", body = RaffleEnvelope),
        (status = 401, description = "Missing identity headers")
    )
)]
pub(crate) async fn load_raffle(
    State(store): State<Arc<Store>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let q = "--sql
        select *
        from active_raffle
        where user_id = $1
        order by id desc
        limit 1;
    ";

    let row: Option<ActiveRaffleRow> = sqlx::query_as(q)
        .bind(identity.user_id)
        .fetch_optional(&db_pool)
        .await?;

    Ok(Json(RaffleEnvelope {
        ok: true,
        data: row.map(RaffleData::from),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/raffle/clear",
    responses(
        (status = 200, description = "Active raffle cleared for the calling user"),
        (status = 401, description = "Missing identity headers")
    )
)]
pub(crate) async fn clear_raffle(
    State(store): State<Arc<Store>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    sqlx::query("delete from active_raffle where user_id = $1")
        .bind(identity.user_id)
        .execute(&db_pool)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
