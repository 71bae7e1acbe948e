use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{password::MIN_PASSWORD_LEN, repo::User};
use crate::error::{optional, required, ApiError, Validate};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl Validate for SignupRequest {
    type Output = NewUser;

    fn validate(self) -> Result<NewUser, ApiError> {
        let email = required("email", self.email)?.to_lowercase();
        if !is_valid_email(&email) {
            return Err(ApiError::validation("Invalid email"));
        }
        let password = self.password.unwrap_or_default();
        if password.is_empty() {
            return Err(ApiError::validation("password is required"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation("Password too short"));
        }
        Ok(NewUser {
            email,
            password,
            name: optional(self.name),
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    type Output = Credentials;

    fn validate(self) -> Result<Credentials, ApiError> {
        let email = required("email", self.email)?.to_lowercase();
        if !is_valid_email(&email) {
            return Err(ApiError::validation("Invalid email"));
        }
        match self.password {
            Some(password) if !password.is_empty() => Ok(Credentials { email, password }),
            _ => Err(ApiError::validation("password is required")),
        }
    }
}

/// Returned after login or signup; the token is also set as a cookie.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            avatar_url: u.avatar_url,
        }
    }
}
