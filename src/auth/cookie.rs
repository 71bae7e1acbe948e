use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub const SESSION_COOKIE: &str = "auth-token";

/// Session cookie readable by the frontend script, sent on same-site
/// navigations only.
pub fn session_cookie(token: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(false)
        .secure(false)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Instructs the client to drop its session cookie immediately.
pub fn expired_session_cookie() -> Cookie<'static> {
    session_cookie(String::new(), Duration::ZERO)
}
