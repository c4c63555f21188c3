//! Authentication error types.

use thiserror::Error;

use crate::services::validation::ValidationError;
use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signup or profile fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Valid credentials, but an admin login was requested by a non-admin.
    #[error("Admin access required")]
    AdminAccessRequired,

    /// User already exists.
    #[error("User already exists with this email")]
    UserAlreadyExists,

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
