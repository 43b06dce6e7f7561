//! Book Kart Core - Shared types library.
//!
//! This crate provides common types used across all Book Kart components:
//! - `storefront` - API client, cache, state store and persistence
//! - `admin` - Admin console client (orders and seller payouts)
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Every entity here is a snapshot of a record owned by the remote
//! API; nothing in this crate derives persisted business state.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`models`] - Wire entities (users, books, carts, wishlists, orders)
//! - [`validation`] - Client-side form checks run before submission

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
