//! Wire DTOs for the backend endpoints used by the session layer.

use serde::{Deserialize, Serialize};

/// The signed-in user. Held only in memory, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Body of `POST /session`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /session`. The backend does not echo the email.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SignInResponse {
    pub id: String,
    pub name: String,
    pub token: String,
}

/// Body of `POST /users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignUpRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// A product category as returned by `GET /category`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}
