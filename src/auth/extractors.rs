use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderValue},
};
use time::Duration;

use crate::auth::repo_types::UserRecord;
use crate::auth::session::{SessionManager, SessionToken};
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session_id";

/// Reads the session token from the cookie, falling back to
/// `Authorization: Bearer <token>`.
pub(crate) fn token_from_parts(parts: &Parts) -> Option<SessionToken> {
    let from_cookie = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionToken::parse(value));
    if from_cookie.is_some() {
        return from_cookie;
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| {
            auth.strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
        })
        .and_then(SessionToken::parse)
}

/// `Set-Cookie` value carrying a fresh session token.
pub(crate) fn session_cookie(
    token: &SessionToken,
    max_age: Duration,
    secure: bool,
) -> anyhow::Result<HeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        token.expose(),
        max_age.whole_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    Ok(HeaderValue::from_str(&cookie)?)
}

pub(crate) fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("session_id=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("session_id=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
    }
}

/// The authenticated caller, resolved through the session manager.
pub struct AuthUser(pub UserRecord);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionManager: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(AppError::Unauthenticated)?;
        let user = SessionManager::from_ref(state).validate(&token).await?;
        Ok(AuthUser(user))
    }
}

/// The session token if one was presented, without validating it.
pub struct MaybeToken(pub Option<SessionToken>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeToken(token_from_parts(parts)))
    }
}
