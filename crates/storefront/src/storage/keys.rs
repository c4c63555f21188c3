//! Fixed slot keys.
//!
//! Every collection lives under one of these keys as a single JSON blob.

use inmind_core::UserId;

/// All orders from all customers, newest first.
pub const ORDERS: &str = "orders_data";

/// The stock ledger.
pub const INVENTORY: &str = "inventory_data";

/// Registered (non-demo) user accounts including password hashes.
pub const REGISTERED_USERS: &str = "registeredUsers";

/// Saved payment methods of all users.
pub const PAYMENT_METHODS: &str = "paymentMethods";

/// Prefix shared by every favorites slot (users and guests).
pub const FAVORITES_PREFIX: &str = "favorites_";

/// Cart of a logged-in user.
#[must_use]
pub fn cart(user: UserId) -> String {
    format!("cart_user_{user}")
}

/// Favorites of a logged-in user.
#[must_use]
pub fn user_favorites(user: UserId) -> String {
    format!("{FAVORITES_PREFIX}{user}")
}

/// Favorites of an anonymous visitor, scoped to their session's guest id.
#[must_use]
pub fn guest_favorites(guest_id: &str) -> String {
    format!("{FAVORITES_PREFIX}guest_{guest_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shapes() {
        assert_eq!(cart(UserId::new(2)), "cart_user_2");
        assert_eq!(user_favorites(UserId::new(1)), "favorites_1");
        assert_eq!(guest_favorites("abc"), "favorites_guest_abc");
    }
}
