use rocket::{
    fairing::{self, Fairing, Info, Kind},
    http::Status,
    request::{FromRequest, Outcome},
    serde::json::{self, Json},
    Build, Request, Rocket, State,
};
use shared::data::{TokenRequest, TokenResponse, UserPayload, UserResponse};

use crate::{
    database::{self, entities::user, get_user_by_token, obtain_token, Db, UserChanges},
    error::{Error, ValidationError},
    validation::{
        clean_password, clean_text, normalize_email, parse_body, required, validate_email,
    },
};

pub struct Authentication {}

impl Authentication {
    pub(crate) fn fairing() -> Self {
        Self {}
    }
}

#[rocket::async_trait]
impl Fairing for Authentication {
    fn info(&self) -> Info {
        Info {
            name: "Authentication",
            kind: Kind::Ignite | Kind::Singleton,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        Ok(rocket.mount(
            "/user",
            routes![
                create,
                create_get,
                create_put,
                create_patch,
                create_delete,
                token,
                token_get,
                token_put,
                token_patch,
                token_delete,
                me_get,
                me_patch,
                me_post,
                me_put,
                me_delete
            ],
        ))
    }
}

/// Why the authentication guard rejected a request, read back by the 401
/// catcher.
pub struct AuthFailure(pub Option<String>);

#[post("/create", data = "<payload>")]
async fn create(
    payload: Result<Json<UserPayload>, json::Error<'_>>,
    db: &State<Db>,
) -> Result<(Status, Json<UserResponse>), Error> {
    let payload = parse_body(payload)?;

    let email = normalize_email(required("email", payload.email.as_deref())?);
    validate_email(&email)?;
    let password = clean_password(required("password", payload.password.as_deref())?)?;
    let name = clean_text("name", payload.name.as_deref().unwrap_or_default())?;

    let user = database::create_user(db.inner().as_ref(), Some(email.as_str()), &password, &name).await?;
    Ok((Status::Created, Json(UserResponse::from(&user))))
}

#[post("/token", data = "<payload>")]
async fn token(
    payload: Result<Json<TokenRequest>, json::Error<'_>>,
    db: &State<Db>,
) -> Result<Json<TokenResponse>, Error> {
    let payload: TokenRequest = parse_body(payload)?;
    let token = obtain_token(
        db.inner().as_ref(),
        payload.email.as_deref(),
        payload.password.as_deref(),
    )
    .await?;

    Ok(Json(TokenResponse { token: token.key }))
}

#[get("/create")]
fn create_get() -> Error {
    Error::MethodNotAllowed
}

#[put("/create")]
fn create_put() -> Error {
    Error::MethodNotAllowed
}

#[patch("/create")]
fn create_patch() -> Error {
    Error::MethodNotAllowed
}

#[delete("/create")]
fn create_delete() -> Error {
    Error::MethodNotAllowed
}

#[get("/token")]
fn token_get() -> Error {
    Error::MethodNotAllowed
}

#[put("/token")]
fn token_put() -> Error {
    Error::MethodNotAllowed
}

#[patch("/token")]
fn token_patch() -> Error {
    Error::MethodNotAllowed
}

#[delete("/token")]
fn token_delete() -> Error {
    Error::MethodNotAllowed
}

#[get("/me")]
fn me_get(user: user::Model) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

#[patch("/me", data = "<payload>")]
async fn me_patch(
    user: user::Model,
    payload: Result<Json<UserPayload>, json::Error<'_>>,
    db: &State<Db>,
) -> Result<Json<UserResponse>, Error> {
    let changes = validate_changes(parse_body(payload)?)?;
    let user = database::update_user(db.inner().as_ref(), user, changes).await?;
    Ok(Json(UserResponse::from(&user)))
}

#[post("/me")]
fn me_post(_user: user::Model) -> Error {
    Error::MethodNotAllowed
}

#[put("/me")]
fn me_put(_user: user::Model) -> Error {
    Error::MethodNotAllowed
}

#[delete("/me")]
fn me_delete(_user: user::Model) -> Error {
    Error::MethodNotAllowed
}

/// Validates the fields present in a partial update.
fn validate_changes(payload: UserPayload) -> Result<UserChanges, ValidationError> {
    let email = payload
        .email
        .map(|email| {
            let email = normalize_email(&email);
            validate_email(&email).map(|()| email)
        })
        .transpose()?;
    let password = payload
        .password
        .map(|password| clean_password(&password))
        .transpose()?;
    let name = payload
        .name
        .map(|name| clean_text("name", &name))
        .transpose()?;

    Ok(UserChanges {
        email,
        name,
        password,
    })
}

/// Extracts the key from an `Authorization: Token <key>` (or `Bearer <key>`)
/// header. Other schemes count as no credentials at all.
fn token_from_header(header: Option<&str>) -> Result<&str, Error> {
    let mut parts = header.ok_or(Error::UserNotLoggedIn)?.split_whitespace();

    match parts.next() {
        Some(scheme)
            if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") => {}
        _ => return Err(Error::UserNotLoggedIn),
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(key),
        _ => Err(Error::InvalidToken),
    }
}

fn unauthorized(req: &Request<'_>, error: Error) -> Outcome<user::Model, Error> {
    let detail = error.to_string();
    req.local_cache(|| AuthFailure(Some(detail)));
    Outcome::Error((Status::Unauthorized, error))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for user::Model {
    type Error = crate::error::Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let key = match token_from_header(req.headers().get_one("Authorization")) {
            Ok(key) => key,
            Err(e) => return unauthorized(req, e),
        };
        let Some(db) = req.rocket().state::<Db>() else {
            return Outcome::Error((Status::InternalServerError, Error::DatabaseNotFound));
        };

        match get_user_by_token(db.as_ref(), key).await {
            Ok(Some(user)) if user.is_active => Outcome::Success(user),
            Ok(_) => unauthorized(req, Error::InvalidToken),
            Err(e) => Outcome::Error((Status::InternalServerError, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_token_and_bearer_schemes() {
        assert_eq!(token_from_header(Some("Token abc123")).ok(), Some("abc123"));
        assert_eq!(token_from_header(Some("bearer abc123")).ok(), Some("abc123"));
    }

    #[test]
    fn missing_or_foreign_scheme_is_not_logged_in() {
        assert!(matches!(
            token_from_header(None),
            Err(Error::UserNotLoggedIn)
        ));
        assert!(matches!(
            token_from_header(Some("Basic dXNlcjpwYXNz")),
            Err(Error::UserNotLoggedIn)
        ));
    }

    #[test]
    fn malformed_header_is_invalid() {
        assert!(matches!(
            token_from_header(Some("Token")),
            Err(Error::InvalidToken)
        ));
        assert!(matches!(
            token_from_header(Some("Token abc def")),
            Err(Error::InvalidToken)
        ));
    }

    #[test]
    fn patch_validates_only_present_fields() {
        let changes = validate_changes(UserPayload {
            name: Some(" New Name ".into()),
            ..Default::default()
        })
        .expect("changes");
        assert_eq!(changes.name.as_deref(), Some("New Name"));
        assert!(changes.email.is_none());
        assert!(changes.password.is_none());

        let short = validate_changes(UserPayload {
            password: Some("pass".into()),
            ..Default::default()
        });
        assert!(matches!(short, Err(ValidationError::PasswordTooShort(6))));

        let email = validate_changes(UserPayload {
            email: Some("New@Admin.com".into()),
            ..Default::default()
        })
        .expect("changes");
        assert_eq!(email.email.as_deref(), Some("new@admin.com"));
    }
}
