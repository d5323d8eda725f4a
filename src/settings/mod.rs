use std::collections::{hash_map::Entry, BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::Identity;
use crate::error::AppError;
use crate::store::Store;
use crate::types::{NameMappingRow, SettingRow};

mod test;

#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct SettingPayload {
    pub key: String,
    pub value: String,
}

#[utoipa::path(
    post,
    path = "/api/settings",
    request_body = SettingPayload,
    responses((status = 200, description = "Setting upserted"))
)]
pub(crate) async fn save_setting(
    State(store): State<Arc<Store>>,
    Json(payload): Json<SettingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let q = "--sql
        insert into settings (key, value, updated_at)
        values ($1, $2, now())
        on conflict (key) do update set value = excluded.value, updated_at = now();
    ";

    sqlx::query(q)
        .bind(&payload.key)
        .bind(&payload.value)
        .execute(&db_pool)
        .await?;

    info!(key = %payload.key, "setting saved");
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting value, or null data when unset")
    )
)]
pub(crate) async fn get_setting(
    Path(key): Path<String>,
    State(store): State<Arc<Store>>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let value: Option<String> = sqlx::query_scalar("select value from settings where key = $1")
        .bind(&key)
        .fetch_optional(&db_pool)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true, "data": value })))
}

#[derive(Serialize, ToSchema)]
pub(crate) struct AllSettingsResponse {
    pub ok: bool,
    pub settings: Vec<SettingRow>,
}

#[utoipa::path(
    get,
    path = "/api/settings-debug/all",
    responses((status = 200, description = "Every stored setting", body = AllSettingsResponse))
)]
pub(crate) async fn all_settings(
    State(store): State<Arc<Store>>,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let rows: Vec<SettingRow> =
        sqlx::query_as("select key, value, updated_at from settings order by key")
            .fetch_all(&db_pool)
            .await?;

    Ok(Json(AllSettingsResponse {
        ok: true,
        settings: rows,
    }))
}

#[derive(Serialize, ToSchema)]
pub(crate) struct NameMappingsResponse {
    pub ok: bool,
    /// Reddit username to "F L" initials.
    pub mappings: BTreeMap<String, String>,
}

#[utoipa::path(
    get,
    path = "/api/settings/get-all-name-mappings",
    responses(
        (status = 200, description = "All shared reddit-username-to-initials mappings", body = NameMappingsResponse),
        (status = 401, description = "Missing identity headers")
    )
)]
pub(crate) async fn all_name_mappings(
    State(store): State<Arc<Store>>,
    _identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let rows: Vec<NameMappingRow> = sqlx::query_as(
        "select id, reddit_username, first_initial, last_initial from shared_name_mappings",
    )
    .fetch_all(&db_pool)
    .await?;

    let mappings: BTreeMap<String, String> = rows
        .into_iter()
        .map(|row| {
            (
                row.reddit_username,
                format!("{} {}", row.first_initial, row.last_initial),
            )
        })
        .collect();

    Ok(Json(NameMappingsResponse { ok: true, mappings }))
}

/// Pick which mapping rows to delete so that each reddit username survives at
/// most once, case-insensitively. The first occurrence wins, except that an
/// exactly-lowercase row replaces an earlier mixed-case duplicate.
pub(crate) fn duplicate_mapping_ids(rows: &[NameMappingRow]) -> Vec<i32> {
    let mut kept: HashMap<String, &NameMappingRow> = HashMap::new();
    let mut stale = Vec::new();

    for row in rows {
        let folded = row.reddit_username.to_lowercase();
        match kept.entry(folded.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(mut slot) => {
                let current_is_lowercase = row.reddit_username == folded;
                let kept_is_lowercase =
                    slot.get().reddit_username == slot.get().reddit_username.to_lowercase();

                if current_is_lowercase && !kept_is_lowercase {
                    stale.push(slot.get().id);
                    slot.insert(row);
                } else {
                    stale.push(row.id);
                }
            }
        }
    }

    stale
}

#[utoipa::path(
    post,
    path = "/api/settings/cleanup-duplicate-mappings",
    responses(
        (status = 200, description = "Duplicate mappings pruned, removal count reported"),
        (status = 401, description = "Missing identity headers")
    )
)]
pub(crate) async fn cleanup_duplicate_mappings(
    State(store): State<Arc<Store>>,
    _identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let rows: Vec<NameMappingRow> = sqlx::query_as(
        "select id, reddit_username, first_initial, last_initial from shared_name_mappings order by id asc",
    )
    .fetch_all(&db_pool)
    .await?;

    let stale = duplicate_mapping_ids(&rows);

    if !stale.is_empty() {
        sqlx::query("delete from shared_name_mappings where id = any($1)")
            .bind(&stale)
            .execute(&db_pool)
            .await?;
        info!(count = stale.len(), "removed duplicate name mappings");
    }

    Ok(Json(serde_json::json!({
        "ok": true,
        "duplicatesRemoved": stale.len(),
        "message": format!("Removed {} duplicate(s)", stale.len()),
    })))
}
