use std::{fmt, sync::Arc};

use axum::extract::FromRef;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::repo::{SessionRepo, UserRepo};
use crate::auth::repo_types::{SessionRecord, UserRecord};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Raw token length in bytes (256 bits of entropy).
pub const TOKEN_BYTES: usize = 32;

/// Opaque bearer capability. Never printed, compared in constant time.
#[derive(Clone)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        let mut buf = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut buf);
        Self(hex::encode(buf))
    }

    /// Accepts only well-formed tokens; anything else cannot be a session.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != TOKEN_BYTES * 2 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(raw.to_ascii_lowercase()))
    }

    /// The raw secret, for the transport layer only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.0.as_bytes(), other.0.as_bytes());
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

impl Eq for SessionToken {}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub expires_at: OffsetDateTime,
}

/// Issues, validates and revokes sessions.
#[derive(Clone)]
pub struct SessionManager {
    pub sessions: Arc<dyn SessionRepo>,
    pub users: Arc<dyn UserRepo>,
    pub ttl: Duration,
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        Self {
            sessions: state.sessions.clone(),
            users: state.users.clone(),
            ttl: state.config.session_ttl(),
        }
    }
}

impl SessionManager {
    pub async fn issue(&self, user_id: Uuid) -> AppResult<IssuedSession> {
        self.issue_at(user_id, OffsetDateTime::now_utc()).await
    }

    pub async fn issue_at(&self, user_id: Uuid, now: OffsetDateTime) -> AppResult<IssuedSession> {
        let token = SessionToken::generate();
        let record = SessionRecord {
            token_hash: token.digest(),
            user_id,
            expires_at: now + self.ttl,
            created_at: now,
        };
        self.sessions.insert(&record).await?;
        debug!(user_id = %user_id, expires_at = %record.expires_at, "session issued");
        Ok(IssuedSession {
            token,
            expires_at: record.expires_at,
        })
    }

    pub async fn validate(&self, token: &SessionToken) -> AppResult<UserRecord> {
        self.validate_at(token, OffsetDateTime::now_utc()).await
    }

    /// Resolves a token to its user. Refreshes `last_seen_at` on success.
    pub async fn validate_at(
        &self,
        token: &SessionToken,
        now: OffsetDateTime,
    ) -> AppResult<UserRecord> {
        let hash = token.digest();
        let session = self
            .sessions
            .find(&hash)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        if session.expires_at <= now {
            debug!(user_id = %session.user_id, "session expired");
            if let Err(e) = self.sessions.delete(&hash).await {
                warn!(error = %e, "failed to drop expired session");
            }
            return Err(AppError::Unauthenticated);
        }

        let mut user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        match self.users.touch_last_seen(user.id, now).await {
            Ok(()) => user.last_seen_at = Some(now),
            Err(e) => warn!(error = %e, user_id = %user.id, "last_seen heartbeat failed"),
        }
        Ok(user)
    }

    pub async fn revoke(&self, token: &SessionToken) -> AppResult<()> {
        self.sessions.delete(&token.digest()).await?;
        Ok(())
    }
}
