use async_trait::async_trait;

use crate::auth::repo::USER_COLUMNS;
use crate::auth::repo_types::UserRecord;
use crate::db::PgStore;

/// One page of matches plus the exact match count, read from a single snapshot.
#[derive(Debug)]
pub struct SearchPage {
    pub rows: Vec<UserRecord>,
    pub total: i64,
}

/// Directory listing. `filter` is a raw substring matched case-insensitively
/// against name, department and skills; `None` lists everyone. Rows are only
/// fetched when `offset` falls inside the match count.
#[async_trait]
pub trait DirectoryRepo: Send + Sync {
    async fn search(
        &self,
        filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<SearchPage>;
}

/// `%needle%` with LIKE metacharacters escaped, so the query matches literally.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[async_trait]
impl DirectoryRepo for PgStore {
    async fn search(
        &self,
        filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<SearchPage> {
        let pattern = filter.map(like_pattern);
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE $1::text IS NULL
               OR name ILIKE $1
               OR department ILIKE $1
               OR skills ILIKE $1
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        if offset >= total {
            tx.commit().await?;
            return Ok(SearchPage {
                rows: Vec::new(),
                total,
            });
        }

        let rows = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::text IS NULL
               OR name ILIKE $1
               OR department ILIKE $1
               OR skills ILIKE $1
            ORDER BY name ASC, id ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(SearchPage { rows, total })
    }
}
