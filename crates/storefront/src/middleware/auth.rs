//! Authentication extractors.
//!
//! The logged-in [`User`] lives in the session under
//! [`keys::CURRENT_USER`]. Anonymous visitors get a guest id on first use so
//! their favorites survive until they log in.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::models::session::keys;
use crate::services::favorites::FavoritesOwner;

const LOGIN_REQUIRED: &str = "Please log in to continue";
const ADMIN_REQUIRED: &str = "Admin access required";

/// Extractor that requires a logged-in user.
///
/// Rejects with 401 when nobody is logged in.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireUser(pub User);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED.to_string()))
    }
}

/// Extractor that requires a logged-in admin.
///
/// Rejects with 401 when nobody is logged in and 403 for regular users.
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await?
            .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED.to_string()))?;
        if !user.is_admin() {
            return Err(AppError::Forbidden(ADMIN_REQUIRED.to_string()));
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireUser`, this does not reject the request if the user is
/// not logged in.
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await.ok().flatten()))
    }
}

async fn current_user(parts: &Parts) -> Result<Option<User>, AppError> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

    // A session written by an older build may not deserialize; treat it as
    // logged out rather than failing every request.
    Ok(session.get::<User>(keys::CURRENT_USER).await.ok().flatten())
}

/// Log a user in: cycle the session id so a pre-login id cannot be
/// reused, then store the user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn log_in(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    set_current_user(session, user).await
}

/// Replace the user stored in the session (after a profile update).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_USER, user).await
}

/// Remove the logged-in user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<User>(keys::CURRENT_USER).await?;
    Ok(())
}

/// The session's guest id, if one was ever issued.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn existing_guest_id(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    session.get::<String>(keys::GUEST_ID).await
}

/// The session's guest id, issuing a new one on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn guest_id(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(id) = existing_guest_id(session).await? {
        return Ok(id);
    }
    let id = Uuid::new_v4().to_string();
    session.insert(keys::GUEST_ID, &id).await?;
    Ok(id)
}

/// Whose favorites a request works on: the user's, or the session guest's.
///
/// # Errors
///
/// Returns an error if a guest id cannot be issued.
pub async fn favorites_owner(
    session: &Session,
    user: Option<&User>,
) -> Result<FavoritesOwner, tower_sessions::session::Error> {
    match user {
        Some(user) => Ok(FavoritesOwner::User(user.id)),
        None => Ok(FavoritesOwner::Guest(guest_id(session).await?)),
    }
}
