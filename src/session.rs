//! Page-level session gate.
//!
//! Runs before routing on every request. API paths are left to the
//! handlers, which authenticate themselves.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::{
    auth::cookie::{expired_session_cookie, SESSION_COOKIE},
    state::AppState,
};

pub const LOGIN_PATH: &str = "/login";
pub const LANDING_PATH: &str = "/dashboard";

const API_PREFIX: &str = "/api";
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/catches", "/spots", "/events", "/collection"];
const AUTH_PAGES: &[&str] = &["/login", "/signup"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    InvalidToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass,
    RedirectToLogin { clear_cookie: bool },
    RedirectToDashboard,
}

/// `/spots` matches `/spots` and `/spots/42`, not `/spotsx`.
fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn decide(path: &str, session: SessionState) -> Decision {
    if under(path, API_PREFIX) {
        return Decision::Pass;
    }
    if PROTECTED_PREFIXES.iter().any(|p| under(path, p)) {
        return match session {
            SessionState::Authenticated => Decision::Pass,
            SessionState::Anonymous => Decision::RedirectToLogin {
                clear_cookie: false,
            },
            SessionState::InvalidToken => Decision::RedirectToLogin { clear_cookie: true },
        };
    }
    if session == SessionState::Authenticated && AUTH_PAGES.iter().any(|p| under(path, p)) {
        return Decision::RedirectToDashboard;
    }
    Decision::Pass
}

pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if under(path, API_PREFIX) {
        return next.run(request).await;
    }

    let session = match jar.get(SESSION_COOKIE).map(|c| c.value()) {
        None | Some("") => SessionState::Anonymous,
        Some(token) => match state.keys.verify(token) {
            Some(_) => SessionState::Authenticated,
            None => SessionState::InvalidToken,
        },
    };

    let decision = decide(path, session);
    debug!(path, ?session, ?decision, "session gate");
    match decision {
        Decision::Pass => next.run(request).await,
        Decision::RedirectToLogin { clear_cookie: false } => {
            Redirect::temporary(LOGIN_PATH).into_response()
        }
        Decision::RedirectToLogin { clear_cookie: true } => (
            jar.add(expired_session_cookie()),
            Redirect::temporary(LOGIN_PATH),
        )
            .into_response(),
        Decision::RedirectToDashboard => Redirect::temporary(LANDING_PATH).into_response(),
    }
}
