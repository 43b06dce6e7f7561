//! Product listing endpoints.

use book_kart_core::models::{Book, NewBook};
use book_kart_core::types::{ProductId, UserId};
use serde::de::IgnoredAny;
use tracing::instrument;

use super::endpoint::{self, ApiRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List a book for sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the listing.
    #[instrument(skip_all, fields(title = %book.title))]
    pub async fn add_product(&self, book: &NewBook) -> Result<Book, ApiError> {
        let request = ApiRequest::new(endpoint::ADD_PRODUCT).json(book)?;
        Ok(self.mutate::<Book>(&request).await?.data)
    }

    /// Every listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Book>, ApiError> {
        self.query(&ApiRequest::new(endpoint::GET_PRODUCTS)).await
    }

    /// One listing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the listing does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_by_id(&self, id: &ProductId) -> Result<Book, ApiError> {
        self.query(&ApiRequest::new(endpoint::GET_PRODUCT_BY_ID).segment(id.as_str()))
            .await
    }

    /// Listings posted by one seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(seller_id = %seller_id))]
    pub async fn get_products_by_seller(&self, seller_id: &UserId) -> Result<Vec<Book>, ApiError> {
        self.query(&ApiRequest::new(endpoint::GET_PRODUCTS_BY_SELLER).segment(seller_id.as_str()))
            .await
    }

    /// Withdraw a listing. Carts holding it are refetched on next use.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not the seller.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<String, ApiError> {
        let request = ApiRequest::new(endpoint::DELETE_PRODUCT).segment(id.as_str());
        let response = self.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Product deleted"))
    }
}
