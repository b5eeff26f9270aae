use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::messages::repo_types::Message;
use crate::redaction::ProfileView;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ThreadView {
    pub messages: Vec<Message>,
    pub partner: ProfileView,
}

/// Latest message exchanged with one counterpart.
#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub partner: ProfileView,
    pub last_message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_message_at: OffsetDateTime,
    pub last_message_sender_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ConversationList {
    pub conversations: Vec<ConversationSummary>,
}
