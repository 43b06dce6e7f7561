//! Client state: the root state, its slices, and the single dispatch path.
//!
//! Slices are pure reducers; nothing here touches the network. The session
//! facade dispatches actions after API calls succeed, and readers take
//! snapshots or subscribe to changes through a `tokio::sync::watch` channel.

pub mod auth;
pub mod cart;
pub mod wishlist;

pub use auth::{AuthAction, AuthState};
pub use cart::{CartAction, CartState};
pub use wishlist::{WishlistAction, WishlistState};

use std::sync::{Arc, OnceLock};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::persist::Persistor;

/// Every slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootState {
    pub auth: AuthState,
    pub cart: CartState,
    pub wishlist: WishlistState,
}

/// An action for one slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Auth(AuthAction),
    Cart(CartAction),
    Wishlist(WishlistAction),
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Self::Auth(action)
    }
}

impl From<CartAction> for Action {
    fn from(action: CartAction) -> Self {
        Self::Cart(action)
    }
}

impl From<WishlistAction> for Action {
    fn from(action: WishlistAction) -> Self {
        Self::Wishlist(action)
    }
}

impl RootState {
    /// Route an action to its slice.
    #[must_use]
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::Auth(action) => Self {
                auth: self.auth.reduce(action),
                ..self
            },
            Action::Cart(action) => Self {
                cart: self.cart.reduce(action),
                ..self
            },
            Action::Wishlist(action) => Self {
                wishlist: self.wishlist.reduce(action),
                ..self
            },
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Shared handle to the client state.
///
/// Clones refer to the same state. A store starts out not rehydrated; call
/// [`Store::rehydrate`] with the persistor before reading auth state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<RootState>,
    rehydrated: watch::Sender<bool>,
    persistor: OnceLock<Persistor>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// A store with initial state, waiting for rehydration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: watch::Sender::new(RootState::default()),
                rehydrated: watch::Sender::new(false),
                persistor: OnceLock::new(),
            }),
        }
    }

    /// A store that persists nothing and is ready immediately.
    #[must_use]
    pub fn unpersisted() -> Self {
        let store = Self::new();
        store.inner.rehydrated.send_replace(true);
        store
    }

    /// Restore the persisted auth slice and persist every later auth change.
    pub fn rehydrate(&self, persistor: Persistor) {
        let auth = persistor.auth();
        debug!(logged_in = auth.is_logged_in, "Rehydrating auth state");
        self.inner.state.send_modify(|state| state.auth = auth);

        if self.inner.persistor.set(persistor).is_err() {
            warn!("Store was already rehydrated; keeping the first persistor");
        }
        self.inner.rehydrated.send_replace(true);
    }

    #[must_use]
    pub fn is_rehydrated(&self) -> bool {
        *self.inner.rehydrated.borrow()
    }

    /// Resolve once rehydration has finished.
    pub async fn wait_rehydrated(&self) {
        let mut rx = self.inner.rehydrated.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Apply an action. Subscribers are only notified when the state changed.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        let touches_auth = matches!(action, Action::Auth(_));
        debug!(action = ?action, "Dispatch");

        let changed = self.inner.state.send_if_modified(|state| {
            let next = state.clone().reduce(action);
            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        });

        if changed && touches_auth {
            self.persist_auth();
        }
    }

    fn persist_auth(&self) {
        let Some(persistor) = self.inner.persistor.get() else {
            return;
        };
        let auth = self.inner.state.borrow().auth.clone();
        if let Err(e) = persistor.write_auth(&auth) {
            warn!(error = %e, "Failed to persist auth state");
        }
    }

    /// The persistor set by [`Store::rehydrate`], if any.
    #[must_use]
    pub fn persistor(&self) -> Option<&Persistor> {
        self.inner.persistor.get()
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RootState {
        self.inner.state.borrow().clone()
    }

    /// Read part of the state without cloning all of it.
    pub fn select<R>(&self, f: impl FnOnce(&RootState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RootState> {
        self.inner.state.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use book_kart_core::models::User;
    use book_kart_core::types::{ProductId, WishlistId};
    use book_kart_core::WishlistItem;

    use super::*;
    use crate::persist::MemoryStorage;

    fn user() -> User {
        serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "name": "Asha",
            "email": "asha@example.com"
        }))
        .unwrap()
    }

    #[test]
    fn test_dispatch_routes_to_slice() {
        let store = Store::unpersisted();
        store.dispatch(AuthAction::SetUser(user()));
        store.dispatch(WishlistAction::Add(WishlistItem {
            id: WishlistId::new("w1"),
            products: vec![ProductId::new("p1")],
        }));

        let state = store.snapshot();
        assert!(state.auth.is_logged_in);
        assert_eq!(state.wishlist.items.len(), 1);
        assert!(state.cart.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes_only() {
        let store = Store::unpersisted();
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.dispatch(CartAction::ClearCart);
        assert!(!rx.has_changed().unwrap());

        store.dispatch(AuthAction::ToggleLoginDialog);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().auth.login_dialog_open);
    }

    #[tokio::test]
    async fn test_wait_rehydrated() {
        let store = Store::new();
        assert!(!store.is_rehydrated());

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_rehydrated().await })
        };
        store.rehydrate(Persistor::open(MemoryStorage::new()));

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(store.is_rehydrated());
    }

    #[test]
    fn test_auth_survives_reload() {
        let storage = MemoryStorage::new();

        let store = Store::new();
        store.rehydrate(Persistor::open(storage.clone()));
        store.dispatch(AuthAction::SetUser(user()));
        store.dispatch(AuthAction::ToggleLoginDialog);
        store.dispatch(CartAction::ClearCart);

        let reloaded = Store::new();
        reloaded.rehydrate(Persistor::open(storage));
        let auth = reloaded.select(|s| s.auth.clone());
        assert_eq!(auth.user, Some(user()));
        assert!(auth.is_logged_in);
        assert!(!auth.login_dialog_open);
    }
}
