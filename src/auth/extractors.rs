use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::{claims::Principal, cookie::SESSION_COOKIE};
use crate::{error::ApiError, state::AppState};

/// Authenticated caller, taken from the `auth-token` cookie or a
/// `Bearer` Authorization header.
pub struct AuthUser(pub Principal);

pub(crate) fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(c) = jar.get(SESSION_COOKIE) {
        if !c.value().is_empty() {
            return Some(c.value().to_string());
        }
    }
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(ApiError::Unauthenticated)?;

        match state.keys.verify(&token) {
            Some(principal) => Ok(AuthUser(principal)),
            None => {
                warn!("invalid or expired session token");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}
