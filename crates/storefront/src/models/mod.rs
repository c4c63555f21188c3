//! Domain models for the storefront.
//!
//! Everything here is persisted as part of a whole-collection JSON slot
//! (see [`crate::storage`]) or held in the session.

pub mod cart;
pub mod inventory;
pub mod order;
pub mod payment;
pub mod session;
pub mod user;

pub use cart::{CartItem, CartSummary};
pub use inventory::InventoryItem;
pub use order::{NewOrder, Order, OrderItem, OrderPaymentMethod, ShippingAddress};
pub use payment::PaymentMethod;
pub use user::{RegisteredUser, User};
