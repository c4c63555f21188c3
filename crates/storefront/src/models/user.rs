//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inmind_core::{Email, UserId, UserRole};

/// A user as returned by the API and held in the session.
///
/// Never carries a password or hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: String,
    pub role: UserRole,
    /// Mocked bearer token; nothing verifies it.
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl User {
    /// Whether this user may use the admin API.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// "First Last", falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// A registered user as persisted in the `registeredUsers` slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub email: Email,
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl RegisteredUser {
    /// The session view of this user, with a freshly issued token.
    #[must_use]
    pub fn to_user(&self, token: String) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            token,
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            phone: self.phone.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registered() -> RegisteredUser {
        RegisteredUser {
            id: UserId::new(1_700_000_000_000),
            email: Email::parse("jane@example.com").unwrap(),
            username: "jane".to_string(),
            role: UserRole::User,
            firstname: Some("Jane".to_string()),
            lastname: Some("Doe".to_string()),
            phone: None,
            profile_picture: None,
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_user_has_no_password() {
        let user = registered().to_user("tok".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(!json.contains("phone"));
    }

    #[test]
    fn test_display_name() {
        let mut user = registered().to_user(String::new());
        assert_eq!(user.display_name(), "Jane Doe");
        user.firstname = None;
        user.lastname = None;
        assert_eq!(user.display_name(), "jane");
    }
}
