use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Model {
    pub key: String,
    pub user_id: i32,
    pub created: NaiveDateTime,
}
