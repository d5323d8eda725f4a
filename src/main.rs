use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, routing, Json, Router, Server};
use dotenv::dotenv;
use hyper::Error;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::AuthError;
use crate::config::Config;
use crate::error::AppError;
use crate::participant::Participant;
use crate::projection::{LifecycleStatus, RaffleView};
use crate::store::{Store, StoreInternal};
use crate::types::{ActivityRow, SettingRow};

use activity::{ActivityListResponse, ActivityPayload};
use admin::{
    AdminError, AdminRaffleEntry, AdminStats, AllRafflesResponse, CancelRafflePayload,
    DeleteRafflePayload, FinishRafflePayload, Winner,
};
use history::{HistoryEntry, HistoryListResponse, HistoryPayload};
use monitor::{ActiveRaffleSummary, ActiveRafflesResponse};
use raffle::{RaffleData, RaffleEnvelope, SaveRafflePayload};
use scan::{ScanError, ScanOutcome, ScanPayload};
use settings::{AllSettingsResponse, NameMappingsResponse, SettingPayload};

mod activity;
mod admin;
mod auth;
mod config;
mod error;
mod history;
mod monitor;
mod participant;
mod projection;
mod raffle;
mod scan;
mod settings;
mod store;
mod types;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            health_check,
            raffle::save_raffle,
            raffle::load_raffle,
            raffle::clear_raffle,
            monitor::list_active_raffles,
            admin::all_raffles,
            admin::finish_raffle,
            admin::cancel_raffle,
            admin::delete_active_raffle,
            admin::delete_raffle,
            history::save_history,
            history::list_history,
            history::clear_history,
            history::delete_history_entry,
            activity::log_activity,
            activity::list_activities,
            activity::clear_activities,
            settings::save_setting,
            settings::get_setting,
            settings::all_settings,
            settings::all_name_mappings,
            settings::cleanup_duplicate_mappings,
            scan::scan_thread,
        ),
        components(
            schemas(Participant, LifecycleStatus, RaffleView, AuthError),
            schemas(SaveRafflePayload, RaffleData, RaffleEnvelope),
            schemas(ActiveRaffleSummary, ActiveRafflesResponse),
            schemas(AdminError, Winner, AdminRaffleEntry, AdminStats, AllRafflesResponse),
            schemas(FinishRafflePayload, CancelRafflePayload, DeleteRafflePayload),
            schemas(HistoryPayload, HistoryEntry, HistoryListResponse),
            schemas(ActivityPayload, ActivityRow, ActivityListResponse),
            schemas(SettingPayload, SettingRow, AllSettingsResponse, NameMappingsResponse),
            schemas(ScanPayload, ScanOutcome, ScanError),
        ),
        tags(
            (name = "raffle", description = "Per-seller active raffle state"),
            (name = "monitor", description = "Live raffle monitor"),
            (name = "admin", description = "Admin raffle management"),
            (name = "history", description = "Raffle history archive"),
            (name = "activity", description = "Per-user activity feed"),
            (name = "settings", description = "Key/value settings and name mappings"),
            (name = "scan", description = "Reddit thread scanning")
        )
    )]
    struct ApiDoc;

    let config = Config::load();
    let port = config.port;

    let app = create_app(config)
        .await
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"));

    let address = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on {address}");
    info!("API playgrounds on {address}/swagger-ui, {address}/redoc and {address}/rapidoc");

    Server::bind(&address).serve(app.into_make_service()).await
}

pub async fn create_app(config: Config) -> Router {
    let store = create_store(config).await;

    Router::new()
        .route("/api/test", routing::get(health_check))
        .route("/api/raffle/save", routing::post(raffle::save_raffle))
        .route("/api/raffle/load", routing::get(raffle::load_raffle))
        .route("/api/raffle/clear", routing::delete(raffle::clear_raffle))
        .route(
            "/api/raffles/active",
            routing::get(monitor::list_active_raffles),
        )
        .route("/api/admin/all-raffles", routing::get(admin::all_raffles))
        .route(
            "/api/admin/finish-raffle",
            routing::post(admin::finish_raffle),
        )
        .route(
            "/api/admin/cancel-raffle",
            routing::post(admin::cancel_raffle),
        )
        .route(
            "/api/admin/raffle/:id",
            routing::delete(admin::delete_active_raffle),
        )
        .route(
            "/api/admin/delete-raffle",
            routing::delete(admin::delete_raffle),
        )
        .route(
            "/api/raffle/history",
            routing::post(history::save_history)
                .get(history::list_history)
                .delete(history::clear_history),
        )
        .route(
            "/api/raffle/history/:id",
            routing::delete(history::delete_history_entry),
        )
        .route("/api/activity/log", routing::post(activity::log_activity))
        .route(
            "/api/activity/list",
            routing::get(activity::list_activities),
        )
        .route(
            "/api/activity/clear",
            routing::delete(activity::clear_activities),
        )
        .route("/api/settings", routing::post(settings::save_setting))
        .route(
            "/api/settings/get-all-name-mappings",
            routing::get(settings::all_name_mappings),
        )
        .route(
            "/api/settings/cleanup-duplicate-mappings",
            routing::post(settings::cleanup_duplicate_mappings),
        )
        .route("/api/settings/:key", routing::get(settings::get_setting))
        .route("/api/settings-debug/all", routing::get(settings::all_settings))
        .route("/api/reddit/scan", routing::post(scan::scan_thread))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

pub async fn create_store(config: Config) -> Arc<Store> {
    let db_pool = sqlx::postgres::PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to migrate DB");

    Arc::new(Store::new(StoreInternal { db_pool, config }))
}

#[utoipa::path(
    get,
    path = "/api/test",
    responses((status = 200, description = "Database connectivity probe"))
)]
async fn health_check(State(store): State<Arc<Store>>) -> Result<Json<serde_json::Value>, AppError> {
    let db_pool = store.lock().await.db_pool.clone();

    let now: chrono::DateTime<chrono::Utc> = sqlx::query_scalar("select now()")
        .fetch_one(&db_pool)
        .await?;

    Ok(Json(
        serde_json::json!({ "ok": true, "time": now, "message": "Database connected!" }),
    ))
}
