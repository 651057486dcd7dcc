//! Runs the store contract against a live PostgreSQL server.
//!
//! `DATABASE_URL=postgres://... cargo test --test postgres_store -- --ignored`

use rand::{distributions::Alphanumeric, Rng};
use recipe_api::{
    config::AppConfig,
    database::{self, postgres, postgres::PgStore, Store},
    error::Error,
    migrator::migrate,
};

/// Emails are suffixed so repeated runs against one database never collide.
fn unique_email(local: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("{local}-{}@admin.com", suffix.to_lowercase())
}

async fn store(database_url: &str) -> PgStore {
    let config = AppConfig {
        database_url: Some(database_url.into()),
        db_wait_attempts: 3,
        ..AppConfig::default()
    };
    let pool = postgres::connect(database_url, &config)
        .await
        .expect("database reachable");
    migrate(&pool).await.expect("migrations apply");
    // A second run has nothing left to apply.
    assert_eq!(migrate(&pool).await.expect("migrations apply"), 0);
    PgStore::new(pool)
}

// Migrations are not safe to race, so everything shares one test.
#[rocket::async_test]
#[ignore]
async fn postgres_store_contract() {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return;
    };
    let db = store(&url).await;

    tags_are_scoped_and_byte_ordered(&db).await;
    token_is_created_once(&db).await;
    duplicate_email_is_rejected(&db).await;
}

async fn tags_are_scoped_and_byte_ordered(db: &PgStore) {
    let user = database::create_user(db, Some(unique_email("tags").as_str()), "pass1234", "")
        .await
        .expect("user");
    let other = database::create_user(db, Some(unique_email("other").as_str()), "pass1234", "")
        .await
        .expect("user");

    db.insert_tag(user.id, "Banana").await.expect("tag");
    db.insert_tag(other.id, "Test2").await.expect("tag");
    db.insert_tag(user.id, "apple").await.expect("tag");
    db.insert_tag(user.id, "Cleaver").await.expect("tag");

    let names: Vec<String> = db
        .get_tags_for_user(user.id)
        .await
        .expect("tags")
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["apple", "Cleaver", "Banana"]);

    let tags = db.get_tags_for_user(other.id).await.expect("tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "Test2");
}

async fn token_is_created_once(db: &PgStore) {
    let email = unique_email("token");
    let user = database::create_user(db, Some(email.as_str()), "pass1234", "")
        .await
        .expect("user");

    let token = database::obtain_token(db, Some(email.as_str()), Some("pass1234"))
        .await
        .expect("token");
    let again = database::obtain_token(db, Some(email.as_str()), Some("pass1234"))
        .await
        .expect("token");
    assert_eq!(token.key, again.key);
    assert_eq!(token.user_id, user.id);

    let owner = db.get_user_by_token(&token.key).await.expect("lookup");
    assert_eq!(owner.map(|u| u.id), Some(user.id));
}

async fn duplicate_email_is_rejected(db: &PgStore) {
    let email = unique_email("dup");
    let first = database::create_user(db, Some(email.as_str()), "pass1234", "First")
        .await
        .expect("user");

    let shouted = email.to_uppercase();
    let result = database::create_user(db, Some(shouted.as_str()), "other-pass", "Intruder").await;
    assert!(matches!(result, Err(Error::DuplicateEmail)));

    let stored = db
        .get_user_by_email(&email)
        .await
        .expect("lookup")
        .expect("user");
    assert_eq!(stored, first);
}
