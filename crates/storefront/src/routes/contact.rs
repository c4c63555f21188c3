//! Contact form handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::services::contact::ContactMessage;
use crate::state::AppState;

/// Acknowledgement shown after sending.
#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    pub message: &'static str,
}

/// Relay a contact message.
#[instrument(skip_all, fields(subject = %form.subject))]
pub async fn send(
    State(state): State<AppState>,
    Json(form): Json<ContactMessage>,
) -> Result<(StatusCode, Json<ContactReceipt>)> {
    state.contact().send(&form).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ContactReceipt {
            message: "Thank you for your message! We'll get back to you soon.",
        }),
    ))
}
