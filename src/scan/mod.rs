use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::auth::Identity;
use crate::config::Config;
use crate::error::AppError;
use crate::participant::{filter_new_participants, roster_from_stored, Participant};
use crate::store::Store;

mod test;

#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) enum ScanError {
    #[schema(example = "Missing redditLink or costPerSpot")]
    BadRequest(String),
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScanPayload {
    pub reddit_link: Option<String>,
    pub cost_per_spot: Option<f64>,
    pub total_spots: Option<i32>,
    #[serde(default)]
    pub existing_comment_ids: Vec<String>,
    pub current_assigned_spots: Option<i64>,
}

/// What the external scanner prints on stdout. Extra fields (timings,
/// confidence, unparsed comments) pass through to the client untouched.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub(crate) struct ScanOutcome {
    pub ok: bool,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, Value>,
}

/// Positional arguments handed to the scanner script, in the order it
/// expects: link, cost, total spots (or the literal "null"), existing comment
/// ids as a JSON array, currently assigned spots.
pub(crate) fn scanner_args(
    reddit_link: &str,
    cost_per_spot: f64,
    total_spots: Option<i32>,
    existing_comment_ids: &[String],
    current_assigned_spots: i64,
) -> Vec<String> {
    vec![
        reddit_link.to_string(),
        cost_per_spot.to_string(),
        total_spots
            .map(|t| t.to_string())
            .unwrap_or_else(|| "null".to_string()),
        serde_json::to_string(existing_comment_ids).unwrap_or_else(|_| "[]".to_string()),
        current_assigned_spots.to_string(),
    ]
}

#[utoipa::path(
    post,
    path = "/api/reddit/scan",
    request_body = ScanPayload,
    responses(
        (status = 200, description = "Scan result with only participants not already on the roster", body = ScanOutcome),
        (status = 400, description = "Missing redditLink or costPerSpot", body = ScanError),
        (status = 401, description = "Missing identity headers"),
        (status = 500, description = "Scanner failed or produced unreadable output")
    )
)]
#[axum::debug_handler]
pub(crate) async fn scan_thread(
    State(store): State<Arc<Store>>,
    identity: Identity,
    Json(payload): Json<ScanPayload>,
) -> Result<Response, AppError> {
    let (db_pool, config) = {
        let internal = store.lock().await;
        (internal.db_pool.clone(), internal.config.clone())
    };

    let (Some(reddit_link), Some(cost_per_spot)) = (payload.reddit_link, payload.cost_per_spot)
    else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ScanError::BadRequest(
                "Missing redditLink or costPerSpot".to_string(),
            )),
        )
            .into_response());
    };

    info!(link = %reddit_link, cost = cost_per_spot, "starting reddit scan");

    let args = scanner_args(
        &reddit_link,
        cost_per_spot,
        payload.total_spots,
        &payload.existing_comment_ids,
        payload.current_assigned_spots.unwrap_or(0),
    );

    let output = run_scanner(&config, &args).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        error!(code = ?output.status.code(), "scanner exited with failure");
        // The scanner reports its own errors as JSON on stdout when it can.
        if let Ok(scanner_error) = serde_json::from_str::<Value>(stdout.trim()) {
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(scanner_error)).into_response());
        }
        let message = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("Reddit scan failed")
            .to_string();
        return Err(AppError::Scanner(message));
    }

    let mut outcome: ScanOutcome = serde_json::from_str(stdout.trim())
        .map_err(|e| AppError::Scanner(format!("failed to parse scan results: {e}")))?;

    if outcome.ok && !outcome.participants.is_empty() {
        let stored: Option<Value> =
            sqlx::query_scalar("select participants from active_raffle where username = $1 limit 1")
                .bind(&identity.username)
                .fetch_optional(&db_pool)
                .await?;

        let existing = roster_from_stored(stored);
        let scanned = outcome.participants.len();
        outcome.participants = filter_new_participants(&existing, outcome.participants);

        info!(
            scanned,
            new = outcome.participants.len(),
            duplicates = scanned - outcome.participants.len(),
            "scan reconciled against stored roster"
        );
    }

    Ok(Json(outcome).into_response())
}

/// Run the external scanner once, bounded by the configured timeout.
async fn run_scanner(config: &Config, args: &[String]) -> Result<std::process::Output, AppError> {
    let run = Command::new(&config.scanner_command)
        .arg(&config.scanner_script)
        .args(args)
        .output();

    match timeout(Duration::from_secs(config.scan_timeout_secs), run).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(AppError::Scanner(format!("process error: {err}"))),
        Err(_) => Err(AppError::Scanner(format!(
            "scanner timed out after {}s",
            config.scan_timeout_secs
        ))),
    }
}
