//! The single place where a stored user becomes an outbound profile.
//!
//! Email is withheld from everyone but the owner when `show_email` is off.
//! There is intentionally no `From<UserRecord> for ProfileView`.

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo_types::UserRecord;

/// Clock reading plus the window within which a user counts as online.
#[derive(Debug, Clone, Copy)]
pub struct Presence {
    pub now: OffsetDateTime,
    pub window: Duration,
}

impl Presence {
    pub fn new(window: Duration) -> Self {
        Self {
            now: OffsetDateTime::now_utc(),
            window,
        }
    }

    pub fn is_online(&self, last_seen: Option<OffsetDateTime>) -> bool {
        last_seen.is_some_and(|seen| self.now - seen < self.window)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: String,
    pub department: Option<String>,
    pub title: Option<String>,
    pub skills: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub show_email: bool,
    pub online: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_seen_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ProfileView {
    /// Builds the view of `user` as seen by `viewer` (`None` = anonymous).
    pub fn for_viewer(user: UserRecord, viewer: Option<Uuid>, presence: Presence) -> Self {
        let is_owner = viewer == Some(user.id);
        let email = (is_owner || user.show_email).then_some(user.email);
        Self {
            id: user.id,
            email,
            name: user.name,
            department: user.department,
            title: user.title,
            skills: user.skills,
            bio: user.bio,
            avatar_url: user.avatar_url,
            show_email: user.show_email,
            online: presence.is_online(user.last_seen_at),
            last_seen_at: user.last_seen_at,
            created_at: user.created_at,
        }
    }

    pub fn for_owner(user: UserRecord, presence: Presence) -> Self {
        let owner = user.id;
        Self::for_viewer(user, Some(owner), presence)
    }
}
