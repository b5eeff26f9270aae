use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::auth::repo::UserRepo;
use crate::auth::repo_types::{NewUser, UserRecord};
use crate::auth::session::{IssuedSession, SessionManager, SessionToken};
use crate::error::{AppError, AppResult, AuthError};
use crate::redaction::{Presence, ProfileView};

pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;
pub const NAME_MAX: usize = 255;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(req: &RegisterRequest, company_domain: &str) -> AppResult<()> {
    if !is_valid_email(&req.email) {
        return Err(AppError::validation("Invalid email address"));
    }
    if !req.email.ends_with(&format!("@{company_domain}")) {
        return Err(AppError::validation(format!(
            "Only @{company_domain} emails are allowed"
        )));
    }
    let password_len = req.password.chars().count();
    if password_len < PASSWORD_MIN {
        return Err(AppError::validation("Password must be at least 8 characters"));
    }
    if password_len > PASSWORD_MAX {
        return Err(AppError::validation("Password is too long"));
    }
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if name.chars().count() > NAME_MAX {
        return Err(AppError::validation("Name is too long"));
    }
    Ok(())
}

/// Checks an email/password pair. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn verify_credentials(
    users: &dyn UserRepo,
    email: &str,
    password: &str,
) -> AppResult<UserRecord> {
    match users.find_by_email(email).await? {
        Some(user) => {
            if verify_password(password, &user.password_hash)? {
                Ok(user)
            } else {
                warn!(user_id = %user.id, "login invalid password");
                Err(AuthError::InvalidCredentials.into())
            }
        }
        None => {
            verify_dummy(password);
            warn!("login unknown email");
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

/// Creates an account. The email must not be registered yet.
pub async fn create_account(
    users: &dyn UserRepo,
    email: &str,
    password: &str,
    name: &str,
) -> AppResult<UserRecord> {
    if users.find_by_email(email).await?.is_some() {
        return Err(AuthError::DuplicateEmail.into());
    }
    let hash = hash_password(password)?;
    users
        .create(NewUser {
            email,
            password_hash: &hash,
            name,
        })
        .await?
        .ok_or_else(|| AuthError::DuplicateEmail.into())
}

pub async fn authenticate(
    users: &dyn UserRepo,
    sessions: &SessionManager,
    mut req: LoginRequest,
) -> AppResult<(UserRecord, IssuedSession)> {
    req.email = normalize_email(&req.email);
    if !is_valid_email(&req.email) {
        return Err(AppError::validation("Invalid email address"));
    }
    if req.password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }

    let user = verify_credentials(users, &req.email, &req.password).await?;
    let issued = sessions.issue(user.id).await?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, issued))
}

/// Registers a user and opens their first session. The invite code is
/// checked before email uniqueness so a bad invite reveals nothing.
pub async fn register(
    users: &dyn UserRepo,
    sessions: &SessionManager,
    invite_code: Option<&str>,
    company_domain: &str,
    mut req: RegisterRequest,
) -> AppResult<(UserRecord, IssuedSession)> {
    req.email = normalize_email(&req.email);
    validate_registration(&req, company_domain)?;

    if let Some(required) = invite_code {
        if req.invite_code.as_deref() != Some(required) {
            warn!("registration with invalid invite code");
            return Err(AuthError::InvalidInvite.into());
        }
    }

    let user = create_account(users, &req.email, &req.password, req.name.trim()).await?;
    let issued = sessions.issue(user.id).await?;
    info!(user_id = %user.id, "user registered");
    Ok((user, issued))
}

pub async fn current_user(
    sessions: &SessionManager,
    token: &SessionToken,
    presence: Presence,
) -> AppResult<ProfileView> {
    let user = sessions.validate(token).await?;
    Ok(ProfileView::for_owner(user, presence))
}

pub async fn logout(sessions: &SessionManager, token: &SessionToken) -> AppResult<()> {
    sessions.revoke(token).await
}
