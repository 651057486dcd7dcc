use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHasher,
};
use rand::{distributions::Alphanumeric, Rng};

use crate::{
    error::{Error, ValidationError},
    validation::normalize_email,
};

use self::entities::{
    auth_token, tag,
    user::{self, NewUser},
};

pub mod entities;
pub mod fairing;
pub mod memory;
pub mod postgres;
pub mod wait;

pub const TOKEN_LENGTH: usize = 40;

/// Handle to the storage backend, shared through Rocket's managed state.
pub type Db = Arc<dyn Store>;

/// Data access used by the service functions below. Every query that reads
/// tags or tokens is scoped to a single user.
#[rocket::async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user. Fails with [`Error::DuplicateEmail`] when the email is
    /// taken.
    async fn insert_user(&self, user: NewUser) -> Result<user::Model, Error>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<user::Model>, Error>;

    /// Writes every mutable column of `user` back. Fails with
    /// [`Error::DuplicateEmail`] when the new email belongs to someone else.
    async fn update_user(&self, user: &user::Model) -> Result<user::Model, Error>;

    /// Returns the user's token, storing `candidate` if the user has none yet.
    async fn get_or_create_token(
        &self,
        user_id: i32,
        candidate: String,
    ) -> Result<auth_token::Model, Error>;

    async fn get_user_by_token(&self, key: &str) -> Result<Option<user::Model>, Error>;

    async fn insert_tag(&self, user_id: i32, name: &str) -> Result<tag::Model, Error>;

    /// All tags owned by `user_id`, ordered by name descending.
    async fn get_tags_for_user(&self, user_id: i32) -> Result<Vec<tag::Model>, Error>;
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub async fn create_user(
    db: &dyn Store,
    email: Option<&str>,
    password: &str,
    name: &str,
) -> Result<user::Model, Error> {
    insert_user(db, email, password, name, false).await
}

pub async fn create_superuser(
    db: &dyn Store,
    email: Option<&str>,
    password: &str,
    name: &str,
) -> Result<user::Model, Error> {
    insert_user(db, email, password, name, true).await
}

async fn insert_user(
    db: &dyn Store,
    email: Option<&str>,
    password: &str,
    name: &str,
    superuser: bool,
) -> Result<user::Model, Error> {
    let email = normalize_email(email.ok_or(ValidationError::Required("email"))?);
    if email.is_empty() {
        return Err(ValidationError::Blank("email").into());
    }

    let user = db
        .insert_user(NewUser {
            email,
            name: name.into(),
            password_hash: hash_password(password)?,
            is_staff: superuser,
            is_superuser: superuser,
        })
        .await?;

    info!("Created user {} ({})", user.id, user.email);
    Ok(user)
}

/// Resolves credentials to an active user. Unknown emails, wrong passwords and
/// inactive accounts all yield `None`.
pub async fn authenticate(
    db: &dyn Store,
    email: &str,
    password: &str,
) -> Result<Option<user::Model>, Error> {
    let Some(user) = db.get_user_by_email(&normalize_email(email)).await? else {
        return Ok(None);
    };

    if user.is_active && user.check_password(password) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Validates credentials and returns the user's token, issuing one on the
/// first successful login.
pub async fn obtain_token(
    db: &dyn Store,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<auth_token::Model, Error> {
    let email = email.ok_or(ValidationError::Required("email"))?;
    let password = password.ok_or(ValidationError::Required("password"))?;

    let Some(user) = authenticate(db, email, password).await? else {
        warn!("Failed login attempt for {email}");
        return Err(Error::LoginFailed);
    };

    let token = db.get_or_create_token(user.id, generate_token()).await?;
    info!("Issued token for user {}", user.id);
    Ok(token)
}

pub async fn get_user_by_token(db: &dyn Store, key: &str) -> Result<Option<user::Model>, Error> {
    db.get_user_by_token(key).await
}

/// Fields of a partial account update. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

pub async fn update_user(
    db: &dyn Store,
    mut user: user::Model,
    changes: UserChanges,
) -> Result<user::Model, Error> {
    if let Some(email) = changes.email {
        user.email = normalize_email(&email);
    }
    if let Some(name) = changes.name {
        user.name = name;
    }
    if let Some(password) = changes.password {
        user.password_hash = hash_password(&password)?;
    }

    db.update_user(&user).await
}

pub async fn list_tags_for_user(
    db: &dyn Store,
    user: &user::Model,
) -> Result<Vec<tag::Model>, Error> {
    db.get_tags_for_user(user.id).await
}

pub async fn create_tag(db: &dyn Store, user: &user::Model, name: &str) -> Result<tag::Model, Error> {
    db.insert_tag(user.id, name).await
}
