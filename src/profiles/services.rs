use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::profiles::dto::ProfilePatch;
use crate::profiles::repo::ProfileRepo;
use crate::redaction::{Presence, ProfileView};

const NAME_MAX: usize = 255;
const DEPARTMENT_MAX: usize = 255;
const TITLE_MAX: usize = 255;
const SKILLS_MAX: usize = 1000;
const BIO_MAX: usize = 2000;

fn check_len(value: &Option<String>, max: usize, field: &str) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max => {
            Err(AppError::validation(format!("{field} is too long")))
        }
        _ => Ok(()),
    }
}

fn validate(patch: &mut ProfilePatch) -> AppResult<()> {
    if let Some(name) = patch.name.as_mut() {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        *name = trimmed.to_string();
    }
    check_len(&patch.name, NAME_MAX, "Name")?;
    check_len(&patch.department, DEPARTMENT_MAX, "Department")?;
    check_len(&patch.title, TITLE_MAX, "Title")?;
    check_len(&patch.skills, SKILLS_MAX, "Skills")?;
    check_len(&patch.bio, BIO_MAX, "Bio")?;
    Ok(())
}

/// Merges `patch` onto the caller's own profile. Last write wins.
pub async fn update_own_profile(
    profiles: &dyn ProfileRepo,
    user_id: Uuid,
    mut patch: ProfilePatch,
    presence: Presence,
) -> AppResult<ProfileView> {
    validate(&mut patch)?;
    let user = profiles
        .update_profile(user_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!(user_id = %user_id, "profile updated");
    Ok(ProfileView::for_owner(user, presence))
}
