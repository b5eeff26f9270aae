//! In-process store used by the test suite in place of Postgres.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::{SessionRepo, UserRepo};
use crate::auth::repo_types::{NewUser, SessionRecord, UserRecord};
use crate::directory::repo::{DirectoryRepo, SearchPage};
use crate::messages::repo::MessageRepo;
use crate::messages::repo_types::Message;
use crate::profiles::dto::ProfilePatch;
use crate::profiles::repo::ProfileRepo;

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    sessions: HashMap<String, SessionRecord>,
    messages: Vec<Message>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| anyhow::anyhow!("store lock poisoned: {}", e))
    }
}

fn matches_filter(user: &UserRecord, needle: &str) -> bool {
    let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(needle));
    hit(Some(&user.name)) || hit(user.department.as_deref()) || hit(user.skills.as_deref())
}

fn filtered(tables: &Tables, filter: Option<&str>) -> Vec<UserRecord> {
    let needle = filter.map(str::to_lowercase);
    let mut rows: Vec<UserRecord> = tables
        .users
        .iter()
        .filter(|u| needle.as_deref().map_or(true, |n| matches_filter(u, n)))
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    rows
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<UserRecord>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create(&self, user: NewUser<'_>) -> anyhow::Result<Option<UserRecord>> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email.to_string(),
            password_hash: user.password_hash.to_string(),
            name: user.name.to_string(),
            department: None,
            title: None,
            skills: None,
            bio: None,
            avatar_url: None,
            show_email: true,
            last_seen_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(record.clone());
        Ok(Some(record))
    }

    async fn touch_last_seen(&self, id: Uuid, at: OffsetDateTime) -> anyhow::Result<()> {
        if let Some(user) = self.lock()?.users.iter_mut().find(|u| u.id == id) {
            user.last_seen_at = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepo for MemoryStore {
    async fn insert(&self, session: &SessionRecord) -> anyhow::Result<()> {
        self.lock()?
            .sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> anyhow::Result<Option<SessionRecord>> {
        Ok(self.lock()?.sessions.get(token_hash).cloned())
    }

    async fn delete(&self, token_hash: &str) -> anyhow::Result<()> {
        self.lock()?.sessions.remove(token_hash);
        Ok(())
    }
}

#[async_trait]
impl DirectoryRepo for MemoryStore {
    async fn search(
        &self,
        filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<SearchPage> {
        let matches = filtered(&*self.lock()?, filter);
        let total = i64::try_from(matches.len())?;
        let rows = matches
            .into_iter()
            .skip(usize::try_from(offset)?)
            .take(usize::try_from(limit)?)
            .collect();
        Ok(SearchPage { rows, total })
    }
}

#[async_trait]
impl ProfileRepo for MemoryStore {
    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<UserRecord>> {
        let mut tables = self.lock()?;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        for (slot, value) in [
            (&mut user.department, &patch.department),
            (&mut user.title, &patch.title),
            (&mut user.skills, &patch.skills),
            (&mut user.bio, &patch.bio),
        ] {
            if value.is_some() {
                *slot = value.clone();
            }
        }
        if let Some(show) = patch.show_email {
            user.show_email = show;
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl MessageRepo for MemoryStore {
    async fn insert_message(&self, message: &Message) -> anyhow::Result<()> {
        self.lock()?.messages.push(message.clone());
        Ok(())
    }

    async fn thread_between(&self, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>> {
        let mut rows: Vec<Message> = self
            .lock()?
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
            })
            .cloned()
            .collect();
        rows.sort_by_key(Message::order_key);
        Ok(rows)
    }

    async fn involving(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
        Ok(self
            .lock()?
            .messages
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect())
    }
}
