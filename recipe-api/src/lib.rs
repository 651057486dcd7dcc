#![allow(clippy::no_effect_underscore_binding)]
use authentication::{AuthFailure, Authentication};
use database::fairing::DatabaseFairing;
use recipe::RecipeApi;
use rocket::{figment::Provider, http::Status, serde::json::Json, Build, Request, Rocket};
use shared::data::ErrorBody;

use error::Error;

pub mod authentication;
pub mod config;
pub mod database;
pub mod error;
pub mod migrator;
pub mod recipe;
pub mod validation;

#[macro_use]
extern crate rocket;

#[catch(401)]
fn unauthorized(req: &Request<'_>) -> Json<ErrorBody> {
    let failure = req.local_cache(|| AuthFailure(None));
    let detail = failure
        .0
        .clone()
        .unwrap_or_else(|| Error::UserNotLoggedIn.to_string());

    Json(ErrorBody {
        error: "not_authenticated".into(),
        detail,
    })
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> Json<ErrorBody> {
    let reason = status.reason_lossy();
    Json(ErrorBody {
        error: reason.to_lowercase().replace(' ', "_"),
        detail: format!("{reason}."),
    })
}

/// The server as configured by `Rocket.toml` and `ROCKET_*` variables.
pub fn rocket() -> Rocket<Build> {
    build(rocket::Config::figment())
}

/// The server configured from an explicit figment provider.
pub fn build<T: Provider>(provider: T) -> Rocket<Build> {
    rocket::custom(provider)
        .attach(DatabaseFairing::fairing())
        .attach(Authentication::fairing())
        .attach(RecipeApi::fairing())
        .register("/", catchers![unauthorized, default_catcher])
}
