//! Wishlist endpoints.

use book_kart_core::models::WishlistItem;
use book_kart_core::types::ProductId;
use serde::de::IgnoredAny;
use serde_json::json;
use tracing::instrument;

use super::endpoint::{self, ApiRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Wishlist entries of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_wishlist(&self) -> Result<Vec<WishlistItem>, ApiError> {
        self.query(&ApiRequest::new(endpoint::GET_WISHLIST)).await
    }

    /// Save a book; returns the wishlist entry that now holds it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(&self, product_id: &ProductId) -> Result<WishlistItem, ApiError> {
        let request =
            ApiRequest::new(endpoint::ADD_TO_WISHLIST).body(json!({ "productId": product_id }));
        Ok(self.mutate::<WishlistItem>(&request).await?.data)
    }

    /// Unsave a book.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<String, ApiError> {
        let request =
            ApiRequest::new(endpoint::REMOVE_FROM_WISHLIST).segment(product_id.as_str());
        let response = self.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Removed from wishlist"))
    }
}
