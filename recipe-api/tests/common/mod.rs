#![allow(dead_code)]

use recipe_api::database::{self, entities::user, Db, Store};
use rocket::{
    config::LogLevel,
    figment::Figment,
    http::{ContentType, Header, Status},
    local::asynchronous::{Client, LocalResponse},
    Config,
};
use serde_json::{json, Value};
use shared::data::TokenResponse;

/// A client for a server that keeps its data in memory.
pub async fn client() -> Client {
    let figment =
        Figment::from(Config::debug_default()).merge((Config::LOG_LEVEL, LogLevel::Off));
    Client::tracked(recipe_api::build(figment))
        .await
        .expect("valid rocket instance")
}

pub fn db(client: &Client) -> &dyn Store {
    client
        .rocket()
        .state::<Db>()
        .expect("database is managed")
        .as_ref()
}

pub async fn create_user(client: &Client, email: &str, password: &str) -> user::Model {
    database::create_user(db(client), Some(email), password, "")
        .await
        .expect("user is created")
}

pub fn auth(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Token {token}"))
}

pub async fn post_json<'c>(client: &'c Client, uri: &'static str, body: Value) -> LocalResponse<'c> {
    client
        .post(uri)
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await
}

/// Logs in through the API and returns the issued token.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = post_json(
        client,
        "/user/token",
        json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), Status::Ok);

    response
        .into_json::<TokenResponse>()
        .await
        .expect("token body")
        .token
}
