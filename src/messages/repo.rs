use async_trait::async_trait;
use uuid::Uuid;

use crate::db::PgStore;
use crate::messages::repo_types::Message;

#[async_trait]
pub trait MessageRepo: Send + Sync {
    async fn insert_message(&self, message: &Message) -> anyhow::Result<()>;
    /// Both directions between `a` and `b`, oldest first.
    async fn thread_between(&self, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>>;
    /// Every message sent or received by `user_id`, in no particular order.
    async fn involving(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>>;
}

#[async_trait]
impl MessageRepo for PgStore {
    async fn insert_message(&self, message: &Message) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.body)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn thread_between(&self, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, receiver_id, body, created_at
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn involving(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, receiver_id, body, created_at
            FROM messages
            WHERE sender_id = $1 OR receiver_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
