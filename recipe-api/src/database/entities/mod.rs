pub mod auth_token;
pub mod migration;
pub mod tag;
pub mod user;
