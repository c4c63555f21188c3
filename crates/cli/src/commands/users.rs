//! User account commands.

use tracing::info;

use inmind_core::UserRole;
use inmind_storefront::services::auth::{AuthError, AuthService};

use super::Context;

/// Create a user account.
///
/// # Errors
///
/// Returns an error if the email is invalid or taken, or the password is
/// too short.
pub async fn create(
    ctx: &Context,
    email: &str,
    username: &str,
    password: &str,
    admin: bool,
) -> Result<(), AuthError> {
    let role = if admin { UserRole::Admin } else { UserRole::User };
    let user = AuthService::new(&ctx.store, &ctx.shop)
        .create_user(email, username, password, role)
        .await?;

    info!(
        "User created! ID: {}, Email: {}, Role: {}",
        user.id, user.email, user.role
    );
    Ok(())
}
