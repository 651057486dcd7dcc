use rocket::{
    fairing::{self, Fairing, Info, Kind},
    http::Status,
    serde::json::{self, Json},
    Build, Rocket, State,
};
use shared::data::{Tag, TagPayload};

use crate::{
    database::{self, entities::user, Db},
    error::{Error, ValidationError},
    validation::{clean_text, parse_body, required},
};

/// Mounts the user-scoped recipe resources under `/recipe`.
pub struct RecipeApi {}

impl RecipeApi {
    pub(crate) fn fairing() -> Self {
        Self {}
    }
}

#[rocket::async_trait]
impl Fairing for RecipeApi {
    fn info(&self) -> Info {
        Info {
            name: "Recipe API",
            kind: Kind::Ignite | Kind::Singleton,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        Ok(rocket.mount(
            "/recipe",
            routes![list_tags, create_tag, tags_put, tags_patch, tags_delete],
        ))
    }
}

#[get("/tags")]
async fn list_tags(user: user::Model, db: &State<Db>) -> Result<Json<Vec<Tag>>, Error> {
    let tags = database::list_tags_for_user(db.inner().as_ref(), &user).await?;
    Ok(Json(tags.into_iter().map(Tag::from).collect()))
}

#[post("/tags", data = "<payload>")]
async fn create_tag(
    user: user::Model,
    payload: Result<Json<TagPayload>, json::Error<'_>>,
    db: &State<Db>,
) -> Result<(Status, Json<Tag>), Error> {
    let payload = parse_body(payload)?;
    let name = clean_text("name", required("name", payload.name.as_deref())?)?;
    if name.is_empty() {
        return Err(ValidationError::Blank("name").into());
    }

    let tag = database::create_tag(db.inner().as_ref(), &user, &name).await?;
    Ok((Status::Created, Json(Tag::from(tag))))
}

// Tags are only listed and created; other methods still authenticate first.

#[put("/tags")]
fn tags_put(_user: user::Model) -> Error {
    Error::MethodNotAllowed
}

#[patch("/tags")]
fn tags_patch(_user: user::Model) -> Error {
    Error::MethodNotAllowed
}

#[delete("/tags")]
fn tags_delete(_user: user::Model) -> Error {
    Error::MethodNotAllowed
}
