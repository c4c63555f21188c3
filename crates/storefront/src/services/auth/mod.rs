//! Authentication service.
//!
//! Password login against the `registeredUsers` slot, plus the two built-in
//! demo accounts. Tokens are mocked: they identify nothing and are never
//! checked; the server session is what authenticates requests.

mod error;

pub use error::AuthError;

use std::fmt;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use inmind_core::{Email, UserId, UserRole};

use crate::config::ShopConfig;
use crate::models::user::{RegisteredUser, User};
use crate::services::next_epoch_id;
use crate::services::validation::Validator;
use crate::storage::{SlotStore, keys};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum username length.
const MIN_USERNAME_LENGTH: usize = 3;

/// Built-in demo logins: email, password, id, role.
const DEMO_ACCOUNTS: [(&str, &str, i64, UserRole); 2] = [
    ("admin@demo.com", "admin123", 1, UserRole::Admin),
    ("user@demo.com", "password123", 2, UserRole::User),
];

/// Which login form was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginKind {
    #[default]
    User,
    Admin,
}

/// Signup form data.
#[derive(Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    #[serde(default)]
    pub role: UserRole,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Profile changes. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a SlotStore,
    shop: &'a ShopConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a SlotStore, shop: &'a ShopConfig) -> Self {
        Self { store, shop }
    }

    /// Register a new user and return the session view of it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for bad fields (including an admin role
    /// when admin signup is disabled) and `AuthError::UserAlreadyExists` if
    /// the email is taken.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AuthError> {
        let mut v = Validator::new();
        let email = v.email("email", &request.email);
        v.min_len("username", &request.username, MIN_USERNAME_LENGTH)
            .required("firstname", &request.firstname)
            .required("lastname", &request.lastname)
            .signup_phone("phone", &request.phone);
        validate_password(&mut v, &request.password);
        if let Some(confirm) = &request.confirm_password
            && *confirm != request.password
        {
            v.fail("confirm_password", "does not match password");
        }
        if request.role == UserRole::Admin && !self.shop.allow_admin_signup {
            v.fail("role", "admin accounts cannot be created by signup");
        }
        v.finish()?;
        let Some(email) = email else {
            return Err(AuthError::InvalidCredentials);
        };

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let created = self
            .store
            .update(keys::REGISTERED_USERS, |users: &mut Vec<RegisteredUser>| {
                if users.iter().any(|u| u.email.eq_ignore_case(email.as_str())) {
                    return None;
                }
                let taken: Vec<i64> = users.iter().map(|u| u.id.as_i64()).collect();
                let user = RegisteredUser {
                    id: UserId::new(next_epoch_id(now, &taken)),
                    email,
                    username: request.username.trim().to_string(),
                    role: request.role,
                    firstname: Some(request.firstname.trim().to_string()),
                    lastname: Some(request.lastname.trim().to_string()),
                    phone: Some(request.phone.trim().to_string()),
                    profile_picture: None,
                    password_hash,
                    created_at: now,
                };
                users.push(user.clone());
                Some(user)
            })
            .await?
            .ok_or(AuthError::UserAlreadyExists)?;

        info!(user_id = %created.id, role = %created.role, "User registered");
        Ok(created.to_user(issue_token()))
    }

    /// Log in with email and password.
    ///
    /// Registered users are checked first, then the demo accounts (when
    /// enabled). An admin login by a non-admin fails with
    /// `AuthError::AdminAccessRequired`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        kind: LoginKind,
    ) -> Result<User, AuthError> {
        let users: Vec<RegisteredUser> = self.store.load(keys::REGISTERED_USERS).await?;

        let user = if let Some(registered) = users.iter().find(|u| u.email.eq_ignore_case(email))
            && verify_password(password, &registered.password_hash).is_ok()
        {
            registered.to_user(issue_token())
        } else {
            self.demo_login(email, password)
                .ok_or(AuthError::InvalidCredentials)?
        };

        if kind == LoginKind::Admin && !user.is_admin() {
            return Err(AuthError::AdminAccessRequired);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    fn demo_login(&self, email: &str, password: &str) -> Option<User> {
        if !self.shop.demo_accounts {
            return None;
        }
        let (demo_email, _, id, role) = DEMO_ACCOUNTS
            .into_iter()
            .find(|(e, p, _, _)| e.eq_ignore_ascii_case(email.trim()) && *p == password)?;
        let email = Email::parse(demo_email).ok()?;
        Some(User {
            id: UserId::new(id),
            username: email.local_part().to_string(),
            email,
            role,
            token: issue_token(),
            firstname: None,
            lastname: None,
            phone: None,
            profile_picture: None,
        })
    }

    /// Apply profile changes for `current` and return the new session user.
    ///
    /// Registered users are updated in storage (the password hash is kept).
    /// Demo users only get an updated session view.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for bad fields.
    #[instrument(skip(self, current, update), fields(user_id = %current.id))]
    pub async fn update_profile(
        &self,
        current: &User,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let mut v = Validator::new();
        if let Some(username) = &update.username {
            v.min_len("username", username, MIN_USERNAME_LENGTH);
        }
        if let Some(firstname) = &update.firstname {
            v.min_len("firstname", firstname, 2);
        }
        if let Some(lastname) = &update.lastname {
            v.min_len("lastname", lastname, 2);
        }
        if let Some(phone) = &update.phone {
            v.profile_phone("phone", phone);
        }
        v.finish()?;

        let mut merged = current.clone();
        apply_update(&mut merged, &update);

        let id = current.id;
        let stored = self
            .store
            .update(keys::REGISTERED_USERS, |users: &mut Vec<RegisteredUser>| {
                let user = users.iter_mut().find(|u| u.id == id)?;
                user.username.clone_from(&merged.username);
                user.firstname.clone_from(&merged.firstname);
                user.lastname.clone_from(&merged.lastname);
                user.phone.clone_from(&merged.phone);
                user.profile_picture.clone_from(&merged.profile_picture);
                Some(())
            })
            .await?;

        if stored.is_some() {
            info!("Profile updated");
        }
        Ok(merged)
    }

    /// Create a user directly (operator CLI). Skips the signup form rules
    /// except for email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let mut v = Validator::new();
        let email = v.email("email", email);
        validate_password(&mut v, password);
        v.finish()?;
        let Some(email) = email else {
            return Err(AuthError::InvalidCredentials);
        };

        let password_hash = hash_password(password)?;
        let now = Utc::now();
        let created = self
            .store
            .update(keys::REGISTERED_USERS, |users: &mut Vec<RegisteredUser>| {
                if users.iter().any(|u| u.email.eq_ignore_case(email.as_str())) {
                    return None;
                }
                let taken: Vec<i64> = users.iter().map(|u| u.id.as_i64()).collect();
                let user = RegisteredUser {
                    id: UserId::new(next_epoch_id(now, &taken)),
                    email,
                    username: username.to_string(),
                    role,
                    firstname: None,
                    lastname: None,
                    phone: None,
                    profile_picture: None,
                    password_hash,
                    created_at: now,
                };
                users.push(user.clone());
                Some(user)
            })
            .await?
            .ok_or(AuthError::UserAlreadyExists)?;

        Ok(created.to_user(issue_token()))
    }
}

fn apply_update(user: &mut User, update: &ProfileUpdate) {
    let trimmed = |s: &String| s.trim().to_string();
    if let Some(username) = &update.username {
        user.username = trimmed(username);
    }
    if let Some(firstname) = &update.firstname {
        user.firstname = Some(trimmed(firstname));
    }
    if let Some(lastname) = &update.lastname {
        user.lastname = Some(trimmed(lastname));
    }
    if let Some(phone) = &update.phone {
        user.phone = Some(trimmed(phone)).filter(|p| !p.is_empty());
    }
    if let Some(picture) = &update.profile_picture {
        user.profile_picture = Some(picture.clone()).filter(|p| !p.is_empty());
    }
}

/// A fresh mocked bearer token.
fn issue_token() -> String {
    format!("demo-{}", Uuid::new_v4().simple())
}

/// Validate password meets requirements.
fn validate_password(v: &mut Validator, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        v.fail(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
