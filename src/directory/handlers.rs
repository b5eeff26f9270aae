use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    directory::{
        dto::{PagedResult, SearchQuery},
        services,
    },
    error::AppResult,
    extract::{PathParams, QueryParams},
    redaction::ProfileView,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    QueryParams(query): QueryParams<SearchQuery>,
) -> AppResult<Json<PagedResult<ProfileView>>> {
    let page = services::search_directory(
        state.directory.as_ref(),
        query.q.as_deref(),
        query.page,
        Some(me.id),
        state.presence(),
    )
    .await?;
    Ok(Json(page))
}

#[instrument(skip(state, me))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    PathParams(id): PathParams<Uuid>,
) -> AppResult<Json<ProfileView>> {
    let profile =
        services::view_profile(state.users.as_ref(), id, Some(me.id), state.presence()).await?;
    Ok(Json(profile))
}
