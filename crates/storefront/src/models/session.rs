//! Session-related types.
//!
//! The logged-in [`User`](super::user::User) is stored in the session under
//! [`keys::CURRENT_USER`]; nothing else about the user is kept server-side
//! between requests.

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user profile.
    pub const CURRENT_USER: &str = "currentUser";

    /// Key for the random id that scopes a guest's favorites.
    pub const GUEST_ID: &str = "guestId";
}
