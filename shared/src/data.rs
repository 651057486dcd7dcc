use serde::{Deserialize, Serialize};

/// Body of `POST /user/create` and `PATCH /user/me`.
///
/// Every field is optional on the wire so that a missing field can be
/// reported as a validation failure instead of a parse failure. Registration
/// requires `email` and `password`; a patch may carry any subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Public representation of an account. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagPayload {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short machine readable kind, e.g. `validation` or `not_authenticated`.
    pub error: String,
    pub detail: String,
}
