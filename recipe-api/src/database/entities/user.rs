use argon2::{Argon2, PasswordHash, PasswordVerifier};
use serde::Serialize;
use shared::data::UserResponse;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Model {
    pub id: i32,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Model {
    /// Verifies `raw` against the stored hash. A malformed hash never matches.
    pub fn check_password(&self, raw: &str) -> bool {
        let Ok(hash) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(raw.as_bytes(), &hash)
            .is_ok()
    }
}

impl From<&Model> for UserResponse {
    fn from(value: &Model) -> Self {
        Self {
            email: value.email.clone(),
            name: value.name.clone(),
        }
    }
}

/// A user row that has not been inserted yet.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}
