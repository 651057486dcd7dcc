use chrono::Utc;
use rocket::tokio::sync::RwLock;

use crate::error::Error;

use super::{
    entities::{
        auth_token, tag,
        user::{self, NewUser},
    },
    Store,
};

/// Process-local tables. Used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<user::Model>,
    tokens: Vec<auth_token::Model>,
    tags: Vec<tag::Model>,
    last_user_id: i32,
    last_tag_id: i32,
}

#[rocket::async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<user::Model, Error> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(Error::DuplicateEmail);
        }

        tables.last_user_id += 1;
        let model = user::Model {
            id: tables.last_user_id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            is_active: true,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        };
        tables.users.push(model.clone());
        Ok(model)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<user::Model>, Error> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &user::Model) -> Result<user::Model, Error> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(Error::DuplicateEmail);
        }

        let Some(stored) = tables.users.iter_mut().find(|u| u.id == user.id) else {
            return Err(Error::DatabaseError(sqlx::Error::RowNotFound));
        };
        *stored = user.clone();
        Ok(user.clone())
    }

    async fn get_or_create_token(
        &self,
        user_id: i32,
        candidate: String,
    ) -> Result<auth_token::Model, Error> {
        let mut tables = self.tables.write().await;
        if let Some(token) = tables.tokens.iter().find(|t| t.user_id == user_id) {
            return Ok(token.clone());
        }

        let token = auth_token::Model {
            key: candidate,
            user_id,
            created: Utc::now().naive_utc(),
        };
        tables.tokens.push(token.clone());
        Ok(token)
    }

    async fn get_user_by_token(&self, key: &str) -> Result<Option<user::Model>, Error> {
        let tables = self.tables.read().await;
        let Some(token) = tables.tokens.iter().find(|t| t.key == key) else {
            return Ok(None);
        };
        Ok(tables.users.iter().find(|u| u.id == token.user_id).cloned())
    }

    async fn insert_tag(&self, user_id: i32, name: &str) -> Result<tag::Model, Error> {
        let mut tables = self.tables.write().await;
        tables.last_tag_id += 1;
        let tag = tag::Model {
            id: tables.last_tag_id,
            name: name.into(),
            user_id,
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }

    async fn get_tags_for_user(&self, user_id: i32) -> Result<Vec<tag::Model>, Error> {
        let tables = self.tables.read().await;
        let mut tags: Vec<tag::Model> = tables
            .tags
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        // Byte-wise, matching `COLLATE "C"` in the Postgres store.
        tags.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(tags)
    }
}
