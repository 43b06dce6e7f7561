//! Book Kart Storefront library.
//!
//! Everything between the front end and the remote API:
//!
//! - [`api`] - typed endpoint calls over `reqwest`, with a `moka` cache keyed
//!   by endpoint + arguments and invalidated by tag after mutations
//! - [`store`] - the root state, its slices (auth, cart, wishlist) and the
//!   single dispatch path
//! - [`persist`] - saving the auth slice between runs and rehydrating it
//! - [`session`] - the effects that mirror API results into the store and
//!   turn failures into notifications
//! - [`config`] - environment configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use book_kart_storefront::{ApiClient, ClientConfig, Storefront, Store};
//!
//! let config = ClientConfig::from_env()?;
//! let storefront = Storefront::new(ApiClient::new(&config)?, Store::new());
//!
//! storefront.check_auth().await;
//! storefront.add_to_cart(&product_id, 1).await?;
//! let cart = storefront.store().snapshot().cart;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod notify;
pub mod persist;
pub mod session;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use notify::{Notification, NotificationLevel, Toaster};
pub use persist::{FileStorage, MemoryStorage, PersistError, Persistor, StateStorage};
pub use session::{Checkout, Storefront};
pub use store::{Action, RootState, Store};
