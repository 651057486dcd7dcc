use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Model {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
}

impl From<Model> for shared::data::Tag {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}
