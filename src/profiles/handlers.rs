use axum::{extract::State, routing::put, Json, Router};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::JsonBody,
    profiles::{dto::ProfilePatch, services},
    redaction::ProfileView,
    state::AppState,
};

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/users/me", put(update_me))
}

#[instrument(skip_all)]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> AppResult<Json<ProfileView>> {
    let view =
        services::update_own_profile(state.profiles.as_ref(), me.id, patch, state.presence())
            .await?;
    Ok(Json(view))
}
