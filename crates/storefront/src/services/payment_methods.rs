//! Saved payment methods.
//!
//! All users' cards share the `paymentMethods` slot. Only the last four
//! digits, network, expiry and holder name are stored.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use inmind_core::{CardExpiry, CardNumber, UserId};

use crate::models::payment::PaymentMethod;
use crate::services::validation::{ValidationError, Validator};
use crate::storage::{SlotStore, StorageError, keys};

/// Errors from payment method operations.
#[derive(Debug, Error)]
pub enum PaymentMethodError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Payment method not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// New card form.
#[derive(Clone, Deserialize)]
pub struct NewCard {
    pub card_number: String,
    pub holder_name: String,
    /// `MM/YY`
    pub expiry_date: String,
}

impl fmt::Debug for NewCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCard")
            .field("holder_name", &self.holder_name)
            .finish_non_exhaustive()
    }
}

/// Payment method service.
pub struct PaymentMethodService<'a> {
    store: &'a SlotStore,
}

impl<'a> PaymentMethodService<'a> {
    #[must_use]
    pub const fn new(store: &'a SlotStore) -> Self {
        Self { store }
    }

    /// A user's saved cards.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn list(&self, user: UserId) -> Result<Vec<PaymentMethod>, PaymentMethodError> {
        let all: Vec<PaymentMethod> = self.store.load(keys::PAYMENT_METHODS).await?;
        Ok(all.into_iter().filter(|m| m.user_id == user).collect())
    }

    /// Save a card. A user's first card becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `PaymentMethodError::Validation` for bad card input.
    #[instrument(skip(self, card), fields(user_id = %user))]
    pub async fn add(&self, user: UserId, card: NewCard) -> Result<PaymentMethod, PaymentMethodError> {
        let mut v = Validator::new();
        v.required("holder_name", &card.holder_name);
        let number = CardNumber::parse(&card.card_number)
            .map_err(|e| v.fail("card_number", e.to_string()))
            .ok();
        let expiry = CardExpiry::parse(&card.expiry_date)
            .map_err(|e| v.fail("expiry_date", e.to_string()))
            .ok();
        v.finish()?;
        let (Some(number), Some(expiry)) = (number, expiry) else {
            return Err(ValidationError::field("card_number", "is invalid").into());
        };

        let method = self
            .store
            .update(keys::PAYMENT_METHODS, |all: &mut Vec<PaymentMethod>| {
                let method = PaymentMethod {
                    id: Uuid::new_v4(),
                    user_id: user,
                    card_type: number.card_type(),
                    last_four: number.last4().to_string(),
                    expiry_month: expiry.month(),
                    expiry_year: expiry.year(),
                    holder_name: card.holder_name.trim().to_string(),
                    is_default: !all.iter().any(|m| m.user_id == user),
                };
                all.push(method.clone());
                method
            })
            .await?;

        info!(card_type = %method.card_type, "Payment method saved");
        Ok(method)
    }

    /// Delete a card. If it was the default, the user's first remaining card
    /// becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `PaymentMethodError::NotFound` if the user has no such card.
    #[instrument(skip(self))]
    pub async fn remove(&self, user: UserId, id: Uuid) -> Result<(), PaymentMethodError> {
        self.store
            .update(keys::PAYMENT_METHODS, |all: &mut Vec<PaymentMethod>| {
                let pos = all.iter().position(|m| m.id == id && m.user_id == user)?;
                let removed = all.remove(pos);
                if removed.is_default
                    && let Some(next) = all.iter_mut().find(|m| m.user_id == user)
                {
                    next.is_default = true;
                }
                Some(())
            })
            .await?
            .ok_or(PaymentMethodError::NotFound)
    }

    /// Make a card the user's default.
    ///
    /// # Errors
    ///
    /// Returns `PaymentMethodError::NotFound` if the user has no such card.
    #[instrument(skip(self))]
    pub async fn set_default(&self, user: UserId, id: Uuid) -> Result<(), PaymentMethodError> {
        self.store
            .update(keys::PAYMENT_METHODS, |all: &mut Vec<PaymentMethod>| {
                if !all.iter().any(|m| m.id == id && m.user_id == user) {
                    return None;
                }
                for method in all.iter_mut().filter(|m| m.user_id == user) {
                    method.is_default = method.id == id;
                }
                Some(())
            })
            .await?
            .ok_or(PaymentMethodError::NotFound)
    }
}
