use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::{JsonBody, PathParams},
    messages::{
        dto::{ConversationList, SendMessageRequest, ThreadView},
        repo_types::Message,
        services,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages/conversations", get(list_conversations))
        .route(
            "/messages/thread/:user_id",
            get(get_thread).post(send_message),
        )
}

#[instrument(skip_all)]
pub async fn list_conversations(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> AppResult<Json<ConversationList>> {
    let conversations = services::list_conversations(
        state.users.as_ref(),
        state.messages.as_ref(),
        me.id,
        state.presence(),
    )
    .await?;
    Ok(Json(ConversationList { conversations }))
}

#[instrument(skip(state, me))]
pub async fn get_thread(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    PathParams(user_id): PathParams<Uuid>,
) -> AppResult<Json<ThreadView>> {
    let thread = services::get_thread(
        state.users.as_ref(),
        state.messages.as_ref(),
        me.id,
        user_id,
        state.presence(),
    )
    .await?;
    Ok(Json(thread))
}

#[instrument(skip(state, me, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    PathParams(user_id): PathParams<Uuid>,
    JsonBody(payload): JsonBody<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message = services::send_message(
        state.users.as_ref(),
        state.messages.as_ref(),
        me.id,
        user_id,
        payload.body,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(message)))
}
