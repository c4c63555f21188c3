//! Authentication handlers.
//!
//! Login and signup store the [`User`] in the session and move any guest
//! favorites over to the account.

use std::fmt;

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireUser, clear_current_user, existing_guest_id, log_in, set_current_user};
use crate::models::User;
use crate::services::auth::{AuthService, LoginKind, ProfileUpdate, SignupRequest};
use crate::services::favorites::FavoritesService;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// `admin` when submitted from the admin login page.
    #[serde(default)]
    pub kind: LoginKind,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Register a new account and log it in.
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.store(), state.shop())
        .signup(request)
        .await?;
    start_session(&state, &session, &user).await?;
    add_breadcrumb("auth", "Signed up", &[("user_id", user.id.to_string())]);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password.
#[instrument(skip(state, session, request), fields(email = %request.email, kind = ?request.kind))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.store(), state.shop())
        .login(&request.email, &request.password, request.kind)
        .await?;
    start_session(&state, &session, &user).await?;
    add_breadcrumb("auth", "Logged in", &[("user_id", user.id.to_string())]);
    Ok(Json(user))
}

/// Log out. The guest id is kept, so favorites added afterwards stay with
/// this browser.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn me(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

/// Update the logged-in user's profile.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    let updated = AuthService::new(state.store(), state.shop())
        .update_profile(&user, update)
        .await?;
    set_current_user(&session, &updated).await?;
    Ok(Json(updated))
}

async fn start_session(state: &AppState, session: &Session, user: &User) -> Result<()> {
    let guest_id = existing_guest_id(session).await?;
    log_in(session, user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    if let Some(guest_id) = guest_id {
        // A failed merge must not fail the login
        if let Err(e) = FavoritesService::new(state.store())
            .migrate_guest(&guest_id, user.id)
            .await
        {
            warn!(error = %e, "Failed to migrate guest favorites");
        }
    }
    Ok(())
}
