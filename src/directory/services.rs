use uuid::Uuid;

use crate::auth::repo::UserRepo;
use crate::directory::dto::{PagedResult, PAGE_SIZE};
use crate::directory::repo::{DirectoryRepo, SearchPage};
use crate::error::{AppError, AppResult};
use crate::redaction::{Presence, ProfileView};

/// Lists profiles by display name, 20 per page, optionally filtered.
/// `total` counts every match regardless of the page requested.
pub async fn search_directory(
    directory: &dyn DirectoryRepo,
    query: Option<&str>,
    page: i64,
    viewer: Option<Uuid>,
    presence: Presence,
) -> AppResult<PagedResult<ProfileView>> {
    let filter = query.map(str::trim).filter(|q| !q.is_empty());
    let page = page.max(1);
    let offset = (page - 1).saturating_mul(PAGE_SIZE);

    let SearchPage { rows, total } = directory.search(filter, PAGE_SIZE, offset).await?;

    Ok(PagedResult {
        items: rows
            .into_iter()
            .map(|u| ProfileView::for_viewer(u, viewer, presence))
            .collect(),
        total,
        page,
        total_pages: (total + PAGE_SIZE - 1) / PAGE_SIZE,
    })
}

pub async fn view_profile(
    users: &dyn UserRepo,
    id: Uuid,
    viewer: Option<Uuid>,
    presence: Presence,
) -> AppResult<ProfileView> {
    let user = users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(ProfileView::for_viewer(user, viewer, presence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::{NewUser, UserRecord};
    use crate::memory::MemoryStore;
    use crate::profiles::dto::ProfilePatch;
    use crate::profiles::repo::ProfileRepo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::Duration;

    fn presence() -> Presence {
        Presence::new(Duration::minutes(5))
    }

    async fn add(
        store: &MemoryStore,
        email: &str,
        name: &str,
        department: &str,
        skills: &str,
        show_email: bool,
    ) -> UserRecord {
        let user = store
            .create(NewUser {
                email,
                password_hash: "unused",
                name,
            })
            .await
            .unwrap()
            .unwrap();
        let patch = ProfilePatch {
            department: Some(department.into()),
            skills: Some(skills.into()),
            show_email: Some(show_email),
            ..Default::default()
        };
        store.update_profile(user.id, &patch).await.unwrap().unwrap()
    }

    async fn staff() -> MemoryStore {
        let store = MemoryStore::default();
        add(&store, "eva@company.com", "Eva Rossi", "Product", "Roadmaps,Analytics", true).await;
        add(&store, "bob@company.com", "Bob Martinez", "Design", "Figma,Prototyping", true).await;
        add(&store, "david@company.com", "David Kim", "Marketing", "SEO,Analytics", false).await;
        add(&store, "alice@company.com", "Alice Johnson", "Engineering", "React,TypeScript", true).await;
        add(&store, "carol@company.com", "Carol Chen", "Engineering", "Python,System Design", true).await;
        store
    }

    #[tokio::test]
    async fn lists_everyone_by_name() {
        let store = staff().await;
        let res = search_directory(&store, None, 1, None, presence()).await.unwrap();
        let names: Vec<_> = res.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["Alice Johnson", "Bob Martinez", "Carol Chen", "David Kim", "Eva Rossi"]
        );
        assert_eq!(res.total, 5);
        assert_eq!(res.total_pages, 1);
    }

    #[tokio::test]
    async fn query_matches_name_department_or_skills_case_insensitively() {
        let store = staff().await;

        let by_dept = search_directory(&store, Some("ENGINEERING"), 1, None, presence())
            .await
            .unwrap();
        assert_eq!(by_dept.total, 2);

        let by_skill = search_directory(&store, Some("analytics"), 1, None, presence())
            .await
            .unwrap();
        let names: Vec<_> = by_skill.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["David Kim", "Eva Rossi"]);

        let by_name = search_directory(&store, Some("mart"), 1, None, presence())
            .await
            .unwrap();
        assert_eq!(by_name.total, 1);
        assert_eq!(by_name.items[0].name, "Bob Martinez");
    }

    #[tokio::test]
    async fn blank_query_means_no_filter() {
        let store = staff().await;
        let res = search_directory(&store, Some("   "), 1, None, presence()).await.unwrap();
        assert_eq!(res.total, 5);
    }

    #[tokio::test]
    async fn wildcards_in_query_are_literal() {
        let store = staff().await;
        let res = search_directory(&store, Some("%"), 1, None, presence()).await.unwrap();
        assert_eq!(res.total, 0);
        assert!(res.items.is_empty());
    }

    #[tokio::test]
    async fn pagination_and_out_of_range_pages() {
        let store = MemoryStore::default();
        for i in 0..45 {
            add(
                &store,
                &format!("user{i:02}@company.com"),
                &format!("User {i:02}"),
                "Ops",
                "",
                true,
            )
            .await;
        }

        let p1 = search_directory(&store, None, 1, None, presence()).await.unwrap();
        assert_eq!(p1.items.len(), 20);
        assert_eq!(p1.items[0].name, "User 00");
        assert_eq!(p1.total, 45);
        assert_eq!(p1.total_pages, 3);

        let p3 = search_directory(&store, None, 3, None, presence()).await.unwrap();
        assert_eq!(p3.items.len(), 5);
        assert_eq!(p3.items[0].name, "User 40");

        let p9 = search_directory(&store, None, 9, None, presence()).await.unwrap();
        assert!(p9.items.is_empty());
        assert_eq!(p9.total, 45);
        assert_eq!(p9.total_pages, 3);

        let p0 = search_directory(&store, None, 0, None, presence()).await.unwrap();
        assert_eq!(p0.page, 1);
        assert_eq!(p0.items[0].name, "User 00");
    }

    /// Counts store round trips made by the service.
    struct CountingDirectory {
        inner: MemoryStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DirectoryRepo for CountingDirectory {
        async fn search(
            &self,
            filter: Option<&str>,
            limit: i64,
            offset: i64,
        ) -> anyhow::Result<SearchPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.search(filter, limit, offset).await
        }
    }

    #[tokio::test]
    async fn page_and_total_come_from_one_store_read() {
        let repo = CountingDirectory {
            inner: staff().await,
            calls: AtomicUsize::new(0),
        };

        let res = search_directory(&repo, Some("engineering"), 1, None, presence())
            .await
            .unwrap();
        assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
        assert_eq!(res.total, 2);
        assert_eq!(res.items.len(), 2);

        let past_end = search_directory(&repo, None, 4, None, presence()).await.unwrap();
        assert_eq!(repo.calls.load(Ordering::SeqCst), 2);
        assert_eq!(past_end.total, 5);
        assert!(past_end.items.is_empty());
    }

    #[tokio::test]
    async fn hidden_emails_are_redacted_in_listings() {
        let store = staff().await;
        let viewer = store.find_by_email("alice@company.com").await.unwrap().unwrap();
        let res = search_directory(&store, None, 1, Some(viewer.id), presence())
            .await
            .unwrap();
        for p in &res.items {
            if p.show_email {
                assert!(p.email.is_some());
            } else {
                assert_eq!(p.email, None, "{} leaked", p.name);
            }
        }
    }

    #[tokio::test]
    async fn view_profile_redacts_for_others_but_not_owner() {
        let store = staff().await;
        let david = store.find_by_email("david@company.com").await.unwrap().unwrap();
        let alice = store.find_by_email("alice@company.com").await.unwrap().unwrap();

        let seen_by_alice = view_profile(&store, david.id, Some(alice.id), presence())
            .await
            .unwrap();
        assert_eq!(seen_by_alice.email, None);
        assert_eq!(seen_by_alice.department.as_deref(), Some("Marketing"));

        let seen_by_self = view_profile(&store, david.id, Some(david.id), presence())
            .await
            .unwrap();
        assert_eq!(seen_by_self.email.as_deref(), Some("david@company.com"));
    }

    #[tokio::test]
    async fn view_profile_unknown_is_not_found() {
        let store = staff().await;
        let err = view_profile(&store, Uuid::new_v4(), None, presence())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
