use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, SessionRecord, UserRecord};
use crate::db::PgStore;

pub(crate) const USER_COLUMNS: &str = "id, email, password_hash, name, department, title, \
     skills, bio, avatar_url, show_email, last_seen_at, created_at";

/// Account lookups, creation and the presence heartbeat.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>>;
    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<UserRecord>>;
    /// Returns `None` when the email is already taken.
    async fn create(&self, user: NewUser<'_>) -> anyhow::Result<Option<UserRecord>>;
    async fn touch_last_seen(&self, id: Uuid, at: OffsetDateTime) -> anyhow::Result<()>;
}

#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn insert(&self, session: &SessionRecord) -> anyhow::Result<()>;
    async fn find(&self, token_hash: &str) -> anyhow::Result<Option<SessionRecord>>;
    /// Deleting an absent session is not an error.
    async fn delete(&self, token_hash: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<UserRecord>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create(&self, user: NewUser<'_>) -> anyhow::Result<Option<UserRecord>> {
        let created = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.name)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(&self.pool)
        .await?;
        Ok(created)
    }

    async fn touch_last_seen(&self, id: Uuid, at: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_seen_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepo for PgStore {
    async fn insert(&self, session: &SessionRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.token_hash)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> anyhow::Result<Option<SessionRecord>> {
        let session = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT token_hash, user_id, expires_at, created_at
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn delete(&self, token_hash: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
