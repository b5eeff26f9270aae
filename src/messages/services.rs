use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::repo::UserRepo;
use crate::error::{AppError, AppResult};
use crate::messages::dto::{ConversationSummary, ThreadView};
use crate::messages::repo::MessageRepo;
use crate::messages::repo_types::Message;
use crate::redaction::{Presence, ProfileView};

pub const BODY_MAX: usize = 5000;

fn validate_body(body: &str) -> AppResult<()> {
    if body.is_empty() {
        return Err(AppError::validation("Message cannot be empty"));
    }
    if body.chars().count() > BODY_MAX {
        return Err(AppError::validation("Message is too long"));
    }
    Ok(())
}

pub async fn send_message(
    users: &dyn UserRepo,
    messages: &dyn MessageRepo,
    sender_id: Uuid,
    receiver_id: Uuid,
    body: String,
) -> AppResult<Message> {
    send_message_at(users, messages, sender_id, receiver_id, body, OffsetDateTime::now_utc()).await
}

/// Persists a message stamped with `now`. Self-messages, unknown receivers
/// and empty or oversized bodies are rejected, in that order.
pub async fn send_message_at(
    users: &dyn UserRepo,
    messages: &dyn MessageRepo,
    sender_id: Uuid,
    receiver_id: Uuid,
    body: String,
    now: OffsetDateTime,
) -> AppResult<Message> {
    if sender_id == receiver_id {
        return Err(AppError::validation("Cannot message yourself"));
    }
    if users.find_by_id(receiver_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }
    validate_body(&body)?;

    let message = Message {
        id: Uuid::new_v4(),
        sender_id,
        receiver_id,
        body,
        created_at: now,
    };
    messages.insert_message(&message).await?;
    debug!(message_id = %message.id, %sender_id, %receiver_id, "message sent");
    Ok(message)
}

/// Full history between the caller and `partner_id`, oldest first.
pub async fn get_thread(
    users: &dyn UserRepo,
    messages: &dyn MessageRepo,
    user_id: Uuid,
    partner_id: Uuid,
    presence: Presence,
) -> AppResult<ThreadView> {
    let partner = users
        .find_by_id(partner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut thread = messages.thread_between(user_id, partner_id).await?;
    thread.sort_by_key(Message::order_key);

    Ok(ThreadView {
        messages: thread,
        partner: ProfileView::for_viewer(partner, Some(user_id), presence),
    })
}

/// Reduces `user_id`'s message log to the newest message per counterpart,
/// newest conversation first.
pub fn latest_per_counterpart(user_id: Uuid, log: Vec<Message>) -> Vec<(Uuid, Message)> {
    let mut latest: HashMap<Uuid, Message> = HashMap::new();
    for message in log.into_iter().filter(|m| m.involves(user_id)) {
        let counterpart = message.counterpart(user_id);
        match latest.get(&counterpart) {
            Some(current) if current.order_key() >= message.order_key() => {}
            _ => {
                latest.insert(counterpart, message);
            }
        }
    }

    let mut out: Vec<(Uuid, Message)> = latest.into_iter().collect();
    out.sort_by(|(_, a), (_, b)| b.order_key().cmp(&a.order_key()));
    out
}

pub async fn list_conversations(
    users: &dyn UserRepo,
    messages: &dyn MessageRepo,
    user_id: Uuid,
    presence: Presence,
) -> AppResult<Vec<ConversationSummary>> {
    let latest = latest_per_counterpart(user_id, messages.involving(user_id).await?);
    if latest.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = latest.iter().map(|(id, _)| *id).collect();
    let mut partners: HashMap<Uuid, _> = users
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut out = Vec::with_capacity(latest.len());
    for (counterpart, message) in latest {
        let Some(partner) = partners.remove(&counterpart) else {
            warn!(%counterpart, "conversation partner missing; skipped");
            continue;
        };
        out.push(ConversationSummary {
            partner: ProfileView::for_viewer(partner, Some(user_id), presence),
            last_message: message.body,
            last_message_at: message.created_at,
            last_message_sender_id: message.sender_id,
        });
    }
    Ok(out)
}
