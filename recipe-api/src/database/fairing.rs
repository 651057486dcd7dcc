use std::sync::Arc;

use rocket::{
    fairing::{self, Fairing, Info, Kind},
    Build, Rocket,
};

use crate::{config::AppConfig, error::Error, migrator::migrate};

use super::{
    memory::MemoryStore,
    postgres::{connect, PgStore},
    Db,
};

/// Connects to the configured database on ignite, applies pending
/// migrations and manages the resulting [`Db`] handle.
pub struct DatabaseFairing;

impl DatabaseFairing {
    pub fn fairing() -> Self {
        Self {}
    }
}

/// Builds the storage backend described by `config`.
pub async fn open(config: &AppConfig) -> Result<Db, Error> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("No database_url configured. Data is kept in memory and lost on shutdown.");
        return Ok(Arc::new(MemoryStore::default()));
    };

    let pool = connect(url, config).await?;
    migrate(&pool).await?;
    info!("Database migrations succesfully applied!");
    Ok(Arc::new(PgStore::new(pool)))
}

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "Database",
            kind: Kind::Ignite | Kind::Singleton,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        let config = match rocket.figment().extract::<AppConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Invalid database configuration: {e}");
                return Err(rocket);
            }
        };

        match open(&config).await {
            Ok(db) => Ok(rocket.manage(db)),
            Err(e) => {
                error!("Failed to set up database: {e}");
                Err(rocket)
            }
        }
    }
}
