use std::time::Duration;

use rocket::serde::Deserialize;

/// Application settings read from Rocket's figment (`Rocket.toml` and
/// `ROCKET_*` environment variables).
#[derive(Debug, Clone, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AppConfig {
    /// PostgreSQL connection string. Without one the server keeps its data in
    /// memory.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_wait_attempts")]
    pub db_wait_attempts: u32,
    #[serde(default = "default_wait_interval_ms")]
    pub db_wait_interval_ms: u64,
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,
}

fn default_wait_attempts() -> u32 {
    10
}

fn default_wait_interval_ms() -> u64 {
    1000
}

fn default_max_connections() -> u32 {
    5
}

impl AppConfig {
    pub fn wait_interval(&self) -> Duration {
        Duration::from_millis(self.db_wait_interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_wait_attempts: default_wait_attempts(),
            db_wait_interval_ms: default_wait_interval_ms(),
            db_max_connections: default_max_connections(),
        }
    }
}
