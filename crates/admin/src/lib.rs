//! Book Kart Admin library.
//!
//! The admin console: every order on the marketplace, order status edits,
//! and payouts to the sellers whose books sold.
//!
//! # Access
//!
//! The backend only serves these endpoints to accounts with the `admin`
//! role; [`AdminClient::for_user`] refuses other accounts up front.
//!
//! # List views
//!
//! Orders and payments are browsed through a [`ListView`]: a filter set, a
//! page size and a current page. Filters and pagination go to the server as
//! query parameters. Servers that answer with a plain full list are paged in
//! memory instead.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod error;
pub mod list;
pub mod orders;
pub mod payments;

pub use client::AdminClient;
pub use error::AdminError;
pub use list::{ListFilter, ListView, Page, PageMeta, page_count};
pub use orders::{OrderEdit, OrderFilters};
pub use payments::{PaymentFilters, PaymentsPage, PayoutForm};
