use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{config::AppConfig, error::Error};

use super::{
    entities::{
        auth_token, tag,
        user::{self, NewUser},
    },
    wait::wait_for_db,
    Store,
};

const USER_COLUMNS: &str = "id, email, name, password_hash, is_active, is_staff, is_superuser";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Opens a pool against `database_url`, retrying until the server accepts
/// connections or the configured attempts run out.
pub async fn connect(database_url: &str, config: &AppConfig) -> Result<PgPool, Error> {
    let pool = wait_for_db(config.db_wait_attempts, config.wait_interval(), move || {
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(database_url)
    })
    .await?;
    Ok(pool)
}

/// Maps unique constraint violations on `users.email` to [`Error::DuplicateEmail`].
fn user_write_error(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateEmail,
        _ => Error::DatabaseError(e),
    }
}

#[rocket::async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<user::Model, Error> {
        sqlx::query_as::<_, user::Model>(&format!(
            "INSERT INTO users (email, name, password_hash, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(user_write_error)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<user::Model>, Error> {
        Ok(
            sqlx::query_as::<_, user::Model>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?,
        )
    }

    async fn update_user(&self, user: &user::Model) -> Result<user::Model, Error> {
        sqlx::query_as::<_, user::Model>(&format!(
            "UPDATE users SET email = $2, name = $3, password_hash = $4, \
             is_active = $5, is_staff = $6, is_superuser = $7 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(user_write_error)
    }

    async fn get_or_create_token(
        &self,
        user_id: i32,
        candidate: String,
    ) -> Result<auth_token::Model, Error> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        Ok(sqlx::query_as::<_, auth_token::Model>(
            "INSERT INTO auth_tokens (key, user_id, created) VALUES ($1, $2, now()) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING key, user_id, created",
        )
        .bind(candidate)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_user_by_token(&self, key: &str) -> Result<Option<user::Model>, Error> {
        Ok(sqlx::query_as::<_, user::Model>(
            "SELECT u.id, u.email, u.name, u.password_hash, u.is_active, u.is_staff, u.is_superuser \
             FROM users u JOIN auth_tokens t ON t.user_id = u.id WHERE t.key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_tag(&self, user_id: i32, name: &str) -> Result<tag::Model, Error> {
        Ok(sqlx::query_as::<_, tag::Model>(
            "INSERT INTO tags (name, user_id) VALUES ($1, $2) RETURNING id, name, user_id",
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_tags_for_user(&self, user_id: i32) -> Result<Vec<tag::Model>, Error> {
        // Byte-wise ordering, independent of the database's default collation.
        Ok(sqlx::query_as::<_, tag::Model>(
            "SELECT id, name, user_id FROM tags WHERE user_id = $1 \
             ORDER BY name COLLATE \"C\" DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
