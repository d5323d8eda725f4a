use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One seller's active raffle as persisted, narrowed to the columns the
/// raffle endpoints hand back. The roster is stored as jsonb and decoded
/// through `participant::roster_from_stored` on the way out.
#[derive(Clone, FromRow)]
pub struct ActiveRaffleRow {
    pub id: i32,
    pub reddit_link: Option<String>,
    pub total_spots: i32,
    pub cost_per_spot: f64,
    pub polling_interval: Option<i32>,
    pub participants: serde_json::Value,
    pub fast_raffle_enabled: bool,
    pub fast_raffle_start_time: Option<DateTime<Utc>>,
}

/// Active raffle joined against `users` so listings show the host's current
/// username rather than the one denormalized at save time.
#[derive(Clone, FromRow)]
pub struct JoinedRaffleRow {
    pub id: i32,
    pub reddit_link: Option<String>,
    pub total_spots: i32,
    pub cost_per_spot: f64,
    pub participants: serde_json::Value,
    pub fast_raffle_enabled: bool,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub actual_username: Option<String>,
}

#[derive(Clone, FromRow)]
pub struct RaffleHistoryRow {
    pub id: i32,
    pub raffle_date: DateTime<Utc>,
    pub status: String,
    pub reddit_link: Option<String>,
    pub total_spots: i32,
    pub cost_per_spot: f64,
    pub participants: serde_json::Value,
    pub total_owed: f64,
    pub total_paid: f64,
    pub winner: Option<serde_json::Value>,
    pub username: Option<String>,
}

#[derive(Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ActivityRow {
    pub id: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub details: Option<String>,
    pub badge: Option<String>,
    pub raffle_id: Option<i32>,
    pub username: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, FromRow)]
pub struct NameMappingRow {
    pub id: i32,
    pub reddit_username: String,
    pub first_initial: String,
    pub last_initial: String,
}
