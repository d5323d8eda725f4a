use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Runtime configuration, loaded once at startup from the environment.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Interpreter used to launch the external comment scanner.
    pub scanner_command: String,
    /// Script handed to the scanner command as its first argument.
    pub scanner_script: String,
    /// Upper bound on one scanner run; the scanner calls out to an AI
    /// parsing service and can be slow on large threads.
    pub scan_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3001"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL missing in .env"),
            scanner_command: try_load("SCANNER_COMMAND", "python3"),
            scanner_script: try_load("SCANNER_SCRIPT", "app/reddit_parser.py"),
            scan_timeout_secs: try_load("SCAN_TIMEOUT_SECS", "300"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
