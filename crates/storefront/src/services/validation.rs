//! Request validation.
//!
//! Validators collect every failing field so the API can report them all at
//! once, mirroring what the forms show.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use inmind_core::Email;

/// Signup phone numbers: digits only, at least eight.
static SIGNUP_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8,}$").expect("Invalid regex"));

/// Profile phone numbers allow formatting characters.
static PROFILE_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("Invalid regex"));

/// One invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// One or more invalid fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", summary(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

fn summary(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{} {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// A single-field error.
    #[must_use]
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    /// Whether `field` is among the failures.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

/// Accumulates field errors.
#[derive(Debug, Default)]
pub struct Validator {
    fields: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Non-blank after trimming.
    pub fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "is required");
        }
        self
    }

    /// Required and at least `min` characters after trimming.
    pub fn min_len(&mut self, field: &'static str, value: &str, min: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            self.fail(field, "is required");
        } else if len < min {
            self.fail(field, format!("must be at least {min} characters"));
        }
        self
    }

    /// A well-formed email address. Returns the parsed value when valid.
    pub fn email(&mut self, field: &'static str, value: &str) -> Option<Email> {
        match Email::parse(value) {
            Ok(email) => Some(email),
            Err(e) => {
                self.fail(field, e.to_string());
                None
            }
        }
    }

    /// Digits only, at least eight.
    pub fn signup_phone(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !SIGNUP_PHONE_RE.is_match(value.trim()) {
            self.fail(field, "must be at least 8 digits");
        }
        self
    }

    /// Optional formatted phone number (`+`, digits, spaces, dashes, parentheses).
    pub fn profile_phone(&mut self, field: &'static str, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() && !PROFILE_PHONE_RE.is_match(value) {
            self.fail(field, "is not a valid phone number");
        }
        self
    }

    /// Finish validation.
    ///
    /// # Errors
    ///
    /// Returns every recorded failure.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                fields: self.fields,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_failures() {
        let mut v = Validator::new();
        v.required("city", "  ")
            .min_len("username", "ab", 3)
            .signup_phone("phone", "1234");
        assert!(v.email("email", "nope").is_none());
        let err = v.finish().unwrap_err();
        assert_eq!(err.fields.len(), 4);
        assert!(err.has_field("city"));
        assert!(err.has_field("email"));
        assert!(err.to_string().contains("username must be at least 3 characters"));
    }

    #[test]
    fn test_passes_valid_input() {
        let mut v = Validator::new();
        v.required("city", "Beirut")
            .min_len("message", "Hello there!", 10)
            .signup_phone("phone", "70123456")
            .profile_phone("phone", "+961 (70) 123-456");
        assert!(v.email("email", "user@demo.com").is_some());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_profile_phone_is_optional() {
        let mut v = Validator::new();
        v.profile_phone("phone", "");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.profile_phone("phone", "call me");
        assert!(v.finish().is_err());
    }
}
