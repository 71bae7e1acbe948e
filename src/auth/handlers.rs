use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::Principal,
        cookie::{expired_session_cookie, session_cookie},
        dto::{AuthResponse, LoginRequest, MeResponse, SignupRequest},
        extractors::AuthUser,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{ApiError, AppJson, Validate},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, AuthResponse), ApiError> {
    let principal = Principal {
        user_id: user.id,
        email: user.email.clone(),
    };
    let token = state.keys.issue(&principal)?;
    let jar = jar.add(session_cookie(token.clone(), state.keys.ttl()));
    Ok((
        jar,
        AuthResponse {
            user: user.into(),
            token,
        },
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let input = payload.validate()?;

    let hash = hash_password(&input.password)?;
    let user = User::create(&state.db, &input.email, input.name.as_deref(), &hash)
        .await?
        .ok_or_else(|| {
            warn!(email = %input.email, "email already registered");
            ApiError::Conflict("Email already registered".into())
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let (jar, body) = start_session(&state, jar, user)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let creds = payload.validate()?;

    let Some(user) = User::find_by_email(&state.db, &creds.email).await? else {
        warn!(email = %creds.email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&creds.password, &user.password_hash)? {
        warn!(email = %creds.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    let (jar, body) = start_session(&state, jar, user)?;
    Ok((jar, Json(body)))
}

/// Drops the client's cookie. The token itself stays valid until expiry.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.add(expired_session_cookie()),
        Json(json!({ "success": true })),
    )
}

#[instrument(skip(state, principal), fields(user_id = %principal.user_id))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = User::find_by_id(&state.db, principal.user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(MeResponse { user: user.into() }))
}
