//! Order and payment endpoints.

use book_kart_core::models::{Order, OrderUpdate, RazorpayOrder};
use book_kart_core::types::OrderId;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::endpoint::{self, ApiRequest};
use super::{ApiClient, ApiError};

#[derive(Deserialize)]
struct PaymentData {
    order: RazorpayOrder,
}

impl ApiClient {
    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_user_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.query(&ApiRequest::new(endpoint::GET_USER_ORDERS)).await
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order_by_id(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        self.query(&ApiRequest::new(endpoint::GET_ORDER_BY_ID).segment(order_id.as_str()))
            .await
    }

    /// Create an order (POST) or patch an existing one (PATCH).
    ///
    /// The method follows `update.order_id`; the id travels in the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip_all, fields(order_id = ?update.order_id))]
    pub async fn create_or_update_order(&self, update: &OrderUpdate) -> Result<Order, ApiError> {
        let endpoint = if update.is_update() {
            endpoint::UPDATE_ORDER
        } else {
            endpoint::CREATE_ORDER
        };
        let request = ApiRequest::new(endpoint).json(update)?;
        Ok(self.mutate::<Order>(&request).await?.data)
    }

    /// Open a payment gateway order for `order_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_razorpay_payment(
        &self,
        order_id: &OrderId,
    ) -> Result<RazorpayOrder, ApiError> {
        let request =
            ApiRequest::new(endpoint::CREATE_RAZORPAY_PAYMENT).body(json!({ "orderId": order_id }));
        Ok(self.mutate::<PaymentData>(&request).await?.data.order)
    }
}
