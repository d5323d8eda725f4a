use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::auth::Admin;
use crate::error::AppError;
use crate::participant::{roster_from_stored, Participant};
use crate::projection::{project, LifecycleStatus};
use crate::store::Store;
use crate::types::JoinedRaffleRow;

mod test;

pub(crate) const UNKNOWN_HOST: &str = "Unknown User";

/// One active raffle as shown on the live monitor: stored fields plus the
/// derived view.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActiveRaffleSummary {
    pub id: i32,
    pub title: String,
    pub item_name: String,
    pub host: String,
    pub total_spots: i64,
    pub filled_spots: i64,
    pub remaining_spots: i64,
    pub cost_per_spot: f64,
    pub progress: i64,
    pub status: LifecycleStatus,
    pub is_fast: bool,
    pub reddit_link: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActiveRafflesResponse {
    pub ok: bool,
    pub raffles: Vec<ActiveRaffleSummary>,
    pub total_active: usize,
}

/// Project one stored row into its monitor summary.
pub(crate) fn summarize(row: JoinedRaffleRow) -> ActiveRaffleSummary {
    let roster = roster_from_stored(Some(row.participants));
    let view = project(
        row.reddit_link.as_deref(),
        row.total_spots,
        row.cost_per_spot,
        row.fast_raffle_enabled,
        &roster,
    );

    ActiveRaffleSummary {
        id: row.id,
        title: view.title,
        item_name: view.item_name,
        host: row
            .actual_username
            .or(row.username)
            .unwrap_or_else(|| UNKNOWN_HOST.to_string()),
        total_spots: view.total_spots,
        filled_spots: view.filled_spots,
        remaining_spots: view.remaining_spots,
        cost_per_spot: view.cost_per_spot,
        progress: view.progress,
        status: view.status,
        is_fast: view.is_fast,
        reddit_link: row.reddit_link,
        updated_at: row.updated_at,
        participants: roster,
    }
}

#[utoipa::path(
    get,
    path = "/api/raffles/active",
    responses(
        (status = 200, description = "Every active raffle with its derived progress view, newest first", body = ActiveRafflesResponse),
        (status = 403, description = "Caller is not an admin")
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_active_raffles(
    State(store): State<Arc<Store>>,
    _admin: Admin,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    // Always served fresh from storage; the monitor tolerates no staleness.
    let q = "--sql
        select ar.id, ar.reddit_link, ar.total_spots, ar.cost_per_spot, ar.participants,
               ar.fast_raffle_enabled, ar.username, ar.created_at, ar.updated_at,
               u.username as actual_username
        from active_raffle ar
        left join users u on ar.user_id = u.id
        order by ar.updated_at desc;
    ";

    let rows: Vec<JoinedRaffleRow> = sqlx::query_as(q).fetch_all(&db_pool).await?;
    debug!(count = rows.len(), "fetched active raffles");

    let raffles: Vec<ActiveRaffleSummary> = rows.into_iter().map(summarize).collect();

    Ok(Json(ActiveRafflesResponse {
        ok: true,
        total_active: raffles.len(),
        raffles,
    }))
}
