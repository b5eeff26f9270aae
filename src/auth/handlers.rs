use axum::{
    extract::{FromRef, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        extractors::{clear_session_cookie, session_cookie, MaybeToken},
        services,
        session::SessionManager,
    },
    error::{AppError, AppResult},
    extract::JsonBody,
    redaction::ProfileView,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let sessions = SessionManager::from_ref(&state);
    let (user, issued) = services::register(
        state.users.as_ref(),
        &sessions,
        state.config.invite_code.as_deref(),
        &state.config.company_email_domain,
        payload,
    )
    .await?;

    let cookie = session_cookie(
        &issued.token,
        state.config.session_ttl(),
        state.config.session.cookie_secure,
    )?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user_id: user.id,
            expires_at: issued.expires_at,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let sessions = SessionManager::from_ref(&state);
    let (user, issued) = services::authenticate(state.users.as_ref(), &sessions, payload).await?;

    let cookie = session_cookie(
        &issued.token,
        state.config.session_ttl(),
        state.config.session.cookie_secure,
    )?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user_id: user.id,
            expires_at: issued.expires_at,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    MaybeToken(token): MaybeToken,
) -> AppResult<impl IntoResponse> {
    if let Some(token) = token {
        services::logout(&SessionManager::from_ref(&state), &token).await?;
        info!("session revoked");
    }
    Ok((
        StatusCode::NO_CONTENT,
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.config.session.cookie_secure),
        )],
    ))
}

#[instrument(skip_all)]
pub async fn get_me(
    State(state): State<AppState>,
    MaybeToken(token): MaybeToken,
) -> AppResult<Json<ProfileView>> {
    let token = token.ok_or(AppError::Unauthenticated)?;
    let me = services::current_user(&SessionManager::from_ref(&state), &token, state.presence())
        .await?;
    Ok(Json(me))
}
