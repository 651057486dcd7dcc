use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use shared::data::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An error occured whilst trying to access the database: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Failed to hash password: {0}")]
    PasswordHashing(#[from] argon2::password_hash::Error),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("These credentials do not match our records.")]
    LoginFailed,
    #[error("A user with that email already exists.")]
    DuplicateEmail,
    #[error("Authentication credentials were not provided.")]
    UserNotLoggedIn,
    #[error("Invalid token.")]
    InvalidToken,
    #[error("Method not allowed.")]
    MethodNotAllowed,
    #[error("No database has been attached to the server.")]
    DatabaseNotFound,
    #[error("Failed to apply migration {0}: {1}")]
    Migration(&'static str, sqlx::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The field '{0}' is required.")]
    Required(&'static str),
    #[error("The field '{0}' may not be blank.")]
    Blank(&'static str),
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("Ensure the password has at least {0} characters.")]
    PasswordTooShort(usize),
    #[error("Ensure the field '{0}' has no more than {1} characters.")]
    TooLong(&'static str, usize),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

pub trait ErrorResponder {
    fn response(&self) -> (Status, &'static str, String);
}

impl ErrorResponder for Error {
    fn response(&self) -> (Status, &'static str, String) {
        let (status, kind) = match self {
            Error::DatabaseError(_)
            | Error::PasswordHashing(_)
            | Error::DatabaseNotFound
            | Error::Migration(..) => (Status::InternalServerError, "internal"),
            Error::Validation(validation) => return validation.response(),
            Error::LoginFailed => (Status::BadRequest, "authentication"),
            Error::DuplicateEmail => (Status::BadRequest, "unique"),
            Error::UserNotLoggedIn | Error::InvalidToken => {
                (Status::Unauthorized, "not_authenticated")
            }
            Error::MethodNotAllowed => (Status::MethodNotAllowed, "method_not_allowed"),
        };
        (status, kind, self.to_string())
    }
}

impl ErrorResponder for ValidationError {
    fn response(&self) -> (Status, &'static str, String) {
        (Status::BadRequest, "validation", self.to_string())
    }
}

impl Error {
    /// Status and JSON body this error renders as.
    pub fn body(&self) -> (Status, ErrorBody) {
        let (status, kind, detail) = self.response();
        (
            status,
            ErrorBody {
                error: kind.into(),
                detail,
            },
        )
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let (status, body) = self.body();
        if status == Status::InternalServerError {
            error!("{self}");
        }
        Response::build_from(Json(body).respond_to(request)?)
            .status(status)
            .ok()
    }
}
