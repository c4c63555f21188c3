//! Contact form relay.
//!
//! Posts contact form submissions to a Formspree-compatible endpoint, which
//! forwards them by email. The relay is disabled when no endpoint is
//! configured.

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::services::validation::{ValidationError, Validator};

/// Shown when no phone number was given.
const NO_PHONE: &str = "Not provided";

/// Errors that can occur when relaying a contact message.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No relay endpoint configured.
    #[error("Contact form is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Relay returned an error response.
    #[error("Relay error: {status} - {message}")]
    Relay { status: u16, message: String },
}

/// Contact form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.min_len("first_name", &self.first_name, 2)
            .min_len("last_name", &self.last_name, 2)
            .required("subject", &self.subject)
            .min_len("message", &self.message, 10);
        v.email("email", &self.email);
        v.finish()
    }

    fn name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    fn phone(&self) -> &str {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(NO_PHONE)
    }
}

/// JSON body sent to the relay.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RelayPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl RelayPayload {
    /// Build the relay body. The message is expanded with a header block so
    /// the forwarded email is readable on its own.
    #[must_use]
    pub fn new(form: &ContactMessage, sent_at: DateTime<Utc>) -> Self {
        let name = form.name();
        let email = form.email.trim().to_string();
        let phone = form.phone().to_string();
        let subject = form.subject.trim().to_string();
        let message = format!(
            "Subject: {subject}\n\nName: {name}\nEmail: {email}\nPhone: {phone}\n\nMessage:\n{}\n\n---\nSent from InMind Contact Form\nTime: {}",
            form.message.trim(),
            sent_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
        Self {
            name,
            email,
            phone,
            subject,
            message,
        }
    }
}

/// Client for the contact relay.
#[derive(Clone)]
pub struct ContactClient {
    client: reqwest::Client,
    endpoint: Option<SecretString>,
}

impl ContactClient {
    /// Create a new relay client. `None` disables sending.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(endpoint: Option<SecretString>) -> Result<Self, ContactError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Whether an endpoint is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Validate and relay a contact message.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Validation` for bad input,
    /// `ContactError::NotConfigured` without an endpoint, or a transport or
    /// relay error.
    #[instrument(skip(self, form), fields(subject = %form.subject))]
    pub async fn send(&self, form: &ContactMessage) -> Result<(), ContactError> {
        form.validate()?;
        let endpoint = self.endpoint.as_ref().ok_or(ContactError::NotConfigured)?;

        let payload = RelayPayload::new(form, Utc::now());
        let response = self
            .client
            .post(endpoint.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = %status, "Contact relay rejected message");
            return Err(ContactError::Relay {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        info!("Contact message relayed");
        Ok(())
    }
}
