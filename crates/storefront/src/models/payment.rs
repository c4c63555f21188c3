//! Saved payment methods.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use inmind_core::{CardType, UserId};

/// A saved card. Only the last four digits are ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub user_id: UserId,
    pub card_type: CardType,
    pub last_four: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub holder_name: String,
    pub is_default: bool,
}
