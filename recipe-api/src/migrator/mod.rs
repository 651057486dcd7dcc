use sqlx::{Executor, PgPool};

use crate::{database::entities::migration, error::Error};

struct Migration {
    version: i32,
    name: &'static str,
    statements: &'static str,
}

macro_rules! migration {
    ($version:literal, $name:literal) => {
        Migration {
            version: $version,
            name: $name,
            statements: include_str!($name),
        }
    };
}

static MIGRATIONS: &[Migration] = &[migration!(1, "migration_000001_initial.sql")];

const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS migrations (
    version INTEGER PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT now()
)";

/// Applies every embedded migration that is not recorded in the `migrations`
/// table yet. Each migration runs in its own transaction. Returns how many
/// were applied.
pub async fn migrate(db: &PgPool) -> Result<usize, Error> {
    db.execute(CREATE_MIGRATIONS_TABLE).await?;

    let applied: Vec<migration::Model> =
        sqlx::query_as("SELECT version, applied_at FROM migrations")
            .fetch_all(db)
            .await?;

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|a| a.version == m.version))
        .collect();
    info!("{} database migrations pending.", pending.len());

    for migration in &pending {
        info!("Applying {}", migration.name);
        apply(db, migration)
            .await
            .map_err(|e| Error::Migration(migration.name, e))?;
    }

    Ok(pending.len())
}

async fn apply(db: &PgPool, migration: &Migration) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;
    (&mut *tx).execute(migration.statements).await?;
    sqlx::query("INSERT INTO migrations (version) VALUES ($1)")
        .bind(migration.version)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_unique_and_ascending() {
        let versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn initial_migration_creates_owned_tables() {
        let initial = MIGRATIONS[0].statements;
        for table in ["users", "auth_tokens", "tags"] {
            assert!(initial.contains(&format!("CREATE TABLE {table}")));
        }
        assert!(initial.contains("email VARCHAR(255) NOT NULL UNIQUE"));
    }
}
