//! Cart endpoints.

use book_kart_core::models::Cart;
use book_kart_core::types::{ProductId, UserId};
use serde::de::IgnoredAny;
use serde_json::json;
use tracing::instrument;

use super::endpoint::{self, ApiRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// The cart of `user_id`; `None` before anything was ever added.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Option<Cart>, ApiError> {
        self.query(&ApiRequest::new(endpoint::GET_CART).segment(user_id.as_str()))
            .await
    }

    /// Add `quantity` copies of a book to the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<String, ApiError> {
        let request = ApiRequest::new(endpoint::ADD_TO_CART).body(json!({
            "productId": product_id,
            "quantity": quantity,
        }));
        let response = self.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Product added to cart"))
    }

    /// Remove a book from the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<String, ApiError> {
        let request = ApiRequest::new(endpoint::REMOVE_FROM_CART).segment(product_id.as_str());
        let response = self.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Product removed from cart"))
    }
}
