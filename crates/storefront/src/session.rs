//! Session facade: API calls plus the state effects that follow them.
//!
//! Every method here does what a page of the storefront did around an API
//! call: run it, mirror a successful result into the store, and leave a
//! notification describing the outcome. Failures never touch the store.

use book_kart_core::models::{
    Address, AddressInput, Book, CartItem, GatewayPayment, NewBook, Order, OrderUpdate,
    ProfileUpdate, RazorpayOrder, User,
};
use book_kart_core::types::{OrderId, ProductId};
use book_kart_core::validation::ValidationError;
use tracing::{info, instrument, warn};

use crate::api::{
    ApiClient, ApiError, ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm,
};
use crate::notify::Toaster;
use crate::persist::Persistor;
use crate::store::{AuthAction, CartAction, Store, WishlistAction};

/// A checkout in progress: the order and the gateway order to pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub order: Order,
    pub payment: RazorpayOrder,
}

/// The API client and the store, bound together.
#[derive(Clone)]
pub struct Storefront {
    client: ApiClient,
    store: Store,
    toaster: Toaster,
}

impl Storefront {
    #[must_use]
    pub fn new(client: ApiClient, store: Store) -> Self {
        Self {
            client,
            store,
            toaster: Toaster::new(),
        }
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub const fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    /// Restore persisted auth and the session cookie, then mark the store
    /// ready.
    pub fn rehydrate(&self, persistor: Persistor) {
        if let Some(cookie) = persistor.session_cookie() {
            self.client.restore_session_cookies(&cookie);
        }
        self.store.rehydrate(persistor);
    }

    /// Wait for rehydration, then confirm a restored session with the
    /// backend. A session the backend no longer knows is forgotten, in the
    /// store and in storage.
    ///
    /// # Errors
    ///
    /// Returns the auth check's error; the restored user is kept.
    #[instrument(skip_all)]
    pub async fn resume(&self) -> Result<Option<User>, ApiError> {
        self.store.wait_rehydrated().await;
        if !self.store.select(|s| s.auth.is_logged_in) {
            return Ok(None);
        }
        self.check_auth().await
    }

    /// The signed-in user, from the store.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.store.select(|s| s.auth.user.clone())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Turn a failure into an error notification and hand it back.
    fn notify_err(&self, err: ApiError) -> ApiError {
        self.toaster.error(err.user_message());
        err
    }

    /// The signed-in user, or an error that asks them to log in.
    fn require_user(&self) -> Result<User, ApiError> {
        if let Some(user) = self.current_user() {
            return Ok(user);
        }
        if !self.store.select(|s| s.auth.login_dialog_open) {
            self.store.dispatch(AuthAction::ToggleLoginDialog);
        }
        Err(self.notify_err(ApiError::Unauthorized(
            "Please log in to continue".to_string(),
        )))
    }

    fn save_session_cookie(&self) {
        if let Some(persistor) = self.store.persistor()
            && let Err(e) = persistor.write_session_cookie(self.client.session_cookies())
        {
            warn!(error = %e, "Failed to persist session cookie");
        }
    }

    /// Store `user` as the signed-in account.
    ///
    /// Cached queries and the cart and wishlist slices belong to whoever was
    /// signed in before; a different account starts without them.
    fn sign_in(&self, user: &User) {
        let previous = self
            .store
            .select(|s| s.auth.user.as_ref().map(|u| u.id.clone()));
        if previous.is_some_and(|id| id != user.id) {
            info!(user_id = %user.id, "Signed-in account changed");
            self.drop_account_data();
        }
        self.store.dispatch(AuthAction::SetUser(user.clone()));
        self.save_session_cookie();
    }

    fn drop_account_data(&self) {
        self.client.clear_cache();
        self.store.dispatch(CartAction::ClearCart);
        self.store.dispatch(WishlistAction::Clear);
    }

    fn clear_session(&self) {
        self.store.dispatch(AuthAction::ClearUser);
        self.drop_account_data();
        if let Some(persistor) = self.store.persistor()
            && let Err(e) = persistor.purge()
        {
            warn!(error = %e, "Failed to forget persisted session");
        }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Sign in and remember the user.
    ///
    /// # Errors
    ///
    /// Returns the API or validation error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn login(&self, form: &LoginForm) -> Result<User, ApiError> {
        let user = self
            .client
            .login(form)
            .await
            .map_err(|e| self.notify_err(e))?;

        info!(user_id = %user.id, "Signed in");
        self.sign_in(&user);
        self.toaster.success("Login successful");
        Ok(user)
    }

    /// Sign in to the admin console.
    ///
    /// Like [`Storefront::login`], but refuses accounts without the admin
    /// role. Those are signed out again.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin accounts.
    #[instrument(skip_all)]
    pub async fn admin_login(&self, form: &LoginForm) -> Result<User, ApiError> {
        let user = self
            .client
            .login(form)
            .await
            .map_err(|e| self.notify_err(e))?;

        if !user.is_admin() {
            if let Err(e) = self.client.logout().await {
                warn!(error = %e, "Failed to sign out refused admin login");
                self.client.clear_session_cookies();
            }
            return Err(self.notify_err(ApiError::Forbidden(
                "This account does not have admin access".to_string(),
            )));
        }

        self.store.dispatch(AuthAction::AuthStatus);
        self.sign_in(&user);
        self.toaster.success("Admin login successful");
        Ok(user)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns the API or validation error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn register(&self, form: &RegisterForm) -> Result<(), ApiError> {
        let message = self
            .client
            .register(form)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success(message);
        Ok(())
    }

    /// Confirm an email address; signs the user in when the API returns them.
    ///
    /// # Errors
    ///
    /// Returns the API error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<Option<User>, ApiError> {
        let user = self
            .client
            .verify_email(token)
            .await
            .map_err(|e| self.notify_err(e))?;

        if let Some(user) = &user {
            self.sign_in(user);
        }
        self.toaster.success("Email verified successfully");
        Ok(user)
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns the API or validation error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<(), ApiError> {
        let message = self
            .client
            .forgot_password(form)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success(message);
        Ok(())
    }

    /// Set a new password from a reset link.
    ///
    /// # Errors
    ///
    /// Returns the API or validation error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, form: &ResetPasswordForm) -> Result<(), ApiError> {
        let message = self
            .client
            .reset_password(form)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success(message);
        Ok(())
    }

    /// Check the session on startup.
    ///
    /// A live session refreshes the stored user. A missing or expired one
    /// clears every slice without a notification.
    ///
    /// # Errors
    ///
    /// Returns other API errors, leaving the store unchanged.
    #[instrument(skip_all)]
    pub async fn check_auth(&self) -> Result<Option<User>, ApiError> {
        match self.client.verify_auth().await {
            Ok(Some(user)) => {
                self.sign_in(&user);
                Ok(Some(user))
            }
            Ok(None) => {
                self.clear_session();
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => {
                info!("No active session");
                self.clear_session();
                Ok(None)
            }
            Err(e) => Err(self.notify_err(e)),
        }
    }

    /// End the session. Slices and the cache are only cleared when the API
    /// confirms.
    ///
    /// # Errors
    ///
    /// Returns the API error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let message = self.client.logout().await.map_err(|e| self.notify_err(e))?;
        self.clear_session();
        self.toaster.success(message);
        Ok(())
    }

    /// Update the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let current = self.require_user()?;
        let user = self
            .client
            .update_user(&current.id, update)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.store.dispatch(AuthAction::SetUser(user.clone()));
        self.toaster.success("Profile updated successfully");
        Ok(user)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the cart into the cart slice. Skipped while signed out.
    ///
    /// # Errors
    ///
    /// Returns the API error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn sync_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let Some(user) = self.current_user() else {
            return Ok(Vec::new());
        };
        let items = self
            .client
            .get_cart(&user.id)
            .await
            .map_err(|e| self.notify_err(e))?
            .map(|cart| cart.items)
            .unwrap_or_default();
        self.store.dispatch(CartAction::SetCart(items.clone()));
        Ok(items)
    }

    /// Add a book to the cart and refresh the cart slice.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        self.require_user()?;
        let message = self
            .client
            .add_to_cart(product_id, quantity)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success(message);
        self.sync_cart().await?;
        Ok(())
    }

    /// Remove a book from the cart and refresh the cart slice.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<(), ApiError> {
        self.require_user()?;
        let message = self
            .client
            .remove_from_cart(product_id)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success(message);
        self.sync_cart().await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Fetch the wishlist into the wishlist slice. Skipped while signed out.
    ///
    /// # Errors
    ///
    /// Returns the API error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn sync_wishlist(&self) -> Result<(), ApiError> {
        if self.current_user().is_none() {
            return Ok(());
        }
        let items = self
            .client
            .get_wishlist()
            .await
            .map_err(|e| self.notify_err(e))?;
        self.store.dispatch(WishlistAction::SetWishlist(items));
        Ok(())
    }

    /// Save a book, mirror the returned entry, then refetch.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip(self))]
    pub async fn add_to_wishlist(&self, product_id: &ProductId) -> Result<(), ApiError> {
        self.require_user()?;
        let entry = self
            .client
            .add_to_wishlist(product_id)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.store.dispatch(WishlistAction::Add(entry));
        self.toaster.success("Added to wishlist");
        self.sync_wishlist().await
    }

    /// Unsave a book and drop it from the wishlist slice.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<(), ApiError> {
        self.require_user()?;
        let message = self
            .client
            .remove_from_wishlist(product_id)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.store
            .dispatch(WishlistAction::Remove(product_id.clone()));
        self.toaster.success(message);
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every listing.
    ///
    /// # Errors
    ///
    /// Returns the API error; an error notification is queued.
    pub async fn books(&self) -> Result<Vec<Book>, ApiError> {
        self.client
            .get_products()
            .await
            .map_err(|e| self.notify_err(e))
    }

    /// One listing.
    ///
    /// # Errors
    ///
    /// Returns the API error; an error notification is queued.
    pub async fn book(&self, id: &ProductId) -> Result<Book, ApiError> {
        self.client
            .get_product_by_id(id)
            .await
            .map_err(|e| self.notify_err(e))
    }

    /// Listings of the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    pub async fn my_listings(&self) -> Result<Vec<Book>, ApiError> {
        let user = self.require_user()?;
        self.client
            .get_products_by_seller(&user.id)
            .await
            .map_err(|e| self.notify_err(e))
    }

    /// Post a listing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn sell_book(&self, book: &NewBook) -> Result<Book, ApiError> {
        self.require_user()?;
        let listed = self
            .client
            .add_product(book)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success("Book listed for sale");
        Ok(listed)
    }

    /// Withdraw a listing; carts are refetched since they may hold it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip(self))]
    pub async fn delete_listing(&self, id: &ProductId) -> Result<(), ApiError> {
        self.require_user()?;
        let message = self
            .client
            .delete_product(id)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success(message);
        self.sync_cart().await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.require_user()?;
        self.client
            .get_user_orders()
            .await
            .map_err(|e| self.notify_err(e))
    }

    /// One order of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    pub async fn order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.require_user()?;
        self.client
            .get_order_by_id(id)
            .await
            .map_err(|e| self.notify_err(e))
    }

    /// Place an order for the whole cart and open its gateway payment.
    ///
    /// The cart is refreshed first so the order matches the server's cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an empty cart, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip_all, fields(address_id = %shipping_address.id))]
    pub async fn checkout(&self, shipping_address: Address) -> Result<Checkout, ApiError> {
        self.require_user()?;
        let items = self.sync_cart().await?;
        if items.is_empty() {
            return Err(self.notify_err(ApiError::Validation(ValidationError::field(
                "items",
                "Your cart is empty",
            ))));
        }

        let total = self.store.select(|s| s.cart.summary().total());
        let order = self
            .client
            .create_or_update_order(&OrderUpdate::checkout(&items, total, shipping_address))
            .await
            .map_err(|e| self.notify_err(e))?;
        let payment = self
            .client
            .create_razorpay_payment(&order.id)
            .await
            .map_err(|e| self.notify_err(e))?;

        info!(order_id = %order.id, amount = payment.amount, "Checkout started");
        self.toaster
            .info(format!("Order placed, pay {total} to confirm"));
        Ok(Checkout { order, payment })
    }

    /// Record a completed gateway payment and refresh the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip(self, payment))]
    pub async fn confirm_payment(
        &self,
        order_id: &OrderId,
        payment: GatewayPayment,
    ) -> Result<Order, ApiError> {
        self.require_user()?;
        let order = self
            .client
            .create_or_update_order(&OrderUpdate::paid(order_id.clone(), payment))
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success("Payment successful");
        self.sync_cart().await?;
        Ok(order)
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Saved addresses of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when signed out, otherwise the API
    /// error; an error notification is queued.
    pub async fn addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.require_user()?;
        self.client
            .get_addresses()
            .await
            .map_err(|e| self.notify_err(e))
    }

    /// Create or update an address after checking the form.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an invalid form, otherwise the API
    /// error; an error notification is queued.
    #[instrument(skip_all)]
    pub async fn save_address(&self, input: &AddressInput) -> Result<Address, ApiError> {
        self.require_user()?;
        let address = self
            .client
            .add_or_update_address(input)
            .await
            .map_err(|e| self.notify_err(e))?;
        self.toaster.success(if input.is_update() {
            "Address updated successfully"
        } else {
            "Address added successfully"
        });
        Ok(address)
    }
}
