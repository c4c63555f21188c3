//! Business logic services for the storefront.
//!
//! Services borrow the slot store for the duration of a request and
//! read-modify-write whole collections through it.
//!
//! # Services
//!
//! - `auth` - Signup, password and demo-account login, profile updates
//! - `cart` - Per-user cart
//! - `favorites` - Per-user and per-guest favorites
//! - `orders` - Order history and reporting
//! - `inventory` - Mock stock ledger
//! - `checkout` - Cart to order
//! - `payment_methods` - Saved cards
//! - `contact` - Contact form relay
//! - `admin` - Dashboard and order status changes

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod favorites;
pub mod inventory;
pub mod orders;
pub mod payment_methods;
pub mod validation;

use chrono::{DateTime, Utc};

/// The current epoch millisecond, bumped past any id already in `taken`.
///
/// Users and orders are numbered this way.
#[must_use]
pub fn next_epoch_id(now: DateTime<Utc>, taken: &[i64]) -> i64 {
    let mut id = now.timestamp_millis();
    while taken.contains(&id) {
        id += 1;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_epoch_id_skips_taken() {
        let now = Utc::now();
        let millis = now.timestamp_millis();
        assert_eq!(next_epoch_id(now, &[]), millis);
        assert_eq!(next_epoch_id(now, &[millis, millis + 1]), millis + 2);
    }
}
