use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Model {
    pub version: i32,
    pub applied_at: NaiveDateTime,
}
