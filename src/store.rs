use sqlx::pool::Pool;
use sqlx::postgres::Postgres;
use tokio::sync::Mutex;

use crate::config::Config;

pub struct StoreInternal {
    pub db_pool: Pool<Postgres>,
    pub config: Config,
}

pub type Store = Mutex<StoreInternal>;
