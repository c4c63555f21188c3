//! Core types for InMind.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod card;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use card::{CardError, CardExpiry, CardNumber, CardType, Cvv};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, round_money};
pub use status::*;
