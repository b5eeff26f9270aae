use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo::USER_COLUMNS;
use crate::auth::repo_types::UserRecord;
use crate::db::PgStore;
use crate::profiles::dto::ProfilePatch;

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    /// Applies the patch; `None` when the user does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<UserRecord>>;
}

#[async_trait]
impl ProfileRepo for PgStore {
    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users
            SET name       = COALESCE($2, name),
                department = COALESCE($3, department),
                title      = COALESCE($4, title),
                skills     = COALESCE($5, skills),
                bio        = COALESCE($6, bio),
                show_email = COALESCE($7, show_email)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.department.as_deref())
        .bind(patch.title.as_deref())
        .bind(patch.skills.as_deref())
        .bind(patch.bio.as_deref())
        .bind(patch.show_email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
