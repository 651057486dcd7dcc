mod common;

use recipe_api::database::Store;
use rocket::http::{ContentType, Status};
use serde_json::json;
use shared::data::{ErrorBody, Tag};

use common::{auth, client, create_user, db, login};

#[rocket::async_test]
async fn login_required() {
    let client = client().await;
    let response = client.get("/recipe/tags").dispatch().await;

    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .post("/recipe/tags")
        .header(ContentType::JSON)
        .body(json!({ "name": "Vegan" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn retrieve_tags_works() {
    let client = client().await;
    let user = create_user(&client, "tags@admin.com", "somepassword").await;
    db(&client).insert_tag(user.id, "Meat").await.expect("tag");
    db(&client).insert_tag(user.id, "Cleaver").await.expect("tag");
    let token = login(&client, "tags@admin.com", "somepassword").await;

    let response = client
        .get("/recipe/tags")
        .header(auth(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let tags: Vec<Tag> = response.into_json().await.expect("json body");
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Meat", "Cleaver"]);
}

#[rocket::async_test]
async fn tags_limited_to_user() {
    let client = client().await;
    let user = create_user(&client, "tags@admin.com", "somepassword").await;
    let other = create_user(&client, "user2@admin.com", "anotherpass").await;
    db(&client).insert_tag(other.id, "Test2").await.expect("tag");
    let tag = db(&client)
        .insert_tag(user.id, "Angry Bird")
        .await
        .expect("tag");
    let token = login(&client, "tags@admin.com", "somepassword").await;

    let response = client
        .get("/recipe/tags")
        .header(auth(&token))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let tags: Vec<Tag> = response.into_json().await.expect("json body");
    assert_eq!(
        tags,
        [Tag {
            id: tag.id,
            name: tag.name
        }]
    );
}

#[rocket::async_test]
async fn create_tag_successful() {
    let client = client().await;
    let user = create_user(&client, "tags@admin.com", "somepassword").await;
    let token = login(&client, "tags@admin.com", "somepassword").await;

    let response = client
        .post("/recipe/tags")
        .header(auth(&token))
        .header(ContentType::JSON)
        .body(json!({ "name": "Vegan" }).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Created);
    let created: Tag = response.into_json().await.expect("json body");
    assert_eq!(created.name, "Vegan");

    let stored = db(&client).get_tags_for_user(user.id).await.expect("tags");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, created.id);
}

#[rocket::async_test]
async fn create_tag_invalid() {
    let client = client().await;
    let user = create_user(&client, "tags@admin.com", "somepassword").await;
    let token = login(&client, "tags@admin.com", "somepassword").await;

    for body in [json!({ "name": "" }), json!({ "name": "   " }), json!({})] {
        let response = client
            .post("/recipe/tags")
            .header(auth(&token))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest, "{body}");
    }

    let stored = db(&client).get_tags_for_user(user.id).await.expect("tags");
    assert!(stored.is_empty());
}

#[rocket::async_test]
async fn tags_only_accept_get_and_post() {
    let client = client().await;
    create_user(&client, "tags@admin.com", "somepassword").await;
    let token = login(&client, "tags@admin.com", "somepassword").await;

    let response = client.put("/recipe/tags").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client.put("/recipe/tags").header(auth(&token)).dispatch().await;
    assert_eq!(response.status(), Status::MethodNotAllowed);
    let body: ErrorBody = response.into_json().await.expect("json body");
    assert_eq!(body.error, "method_not_allowed");

    let response = client
        .patch("/recipe/tags")
        .header(auth(&token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::MethodNotAllowed);

    let response = client
        .delete("/recipe/tags")
        .header(auth(&token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::MethodNotAllowed);
}
