//! InMind Core - Shared domain types.
//!
//! This crate provides common types used across all InMind components:
//! - `storefront` - JSON API for browsing, cart, checkout and the admin panel
//! - `cli` - Command-line tools for inventory and order management
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, payment cards and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
