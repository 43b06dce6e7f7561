//! Admin API calls.

use book_kart_core::models::{Order, SellerPayment, User, UserSummary};
use book_kart_core::types::OrderId;
use book_kart_core::validation::{Validate, ValidationError};
use book_kart_storefront::{ApiClient, ApiError};
use book_kart_storefront::api::{ApiRequest, Endpoint, HttpMethod, Tag};
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::json;
use tracing::instrument;

use crate::error::AdminError;
use crate::list::{ListView, Page, PageMeta};
use crate::orders::{OrderEdit, OrderFilters};
use crate::payments::{PaymentFilters, PaymentsPage, PayoutForm};

// =============================================================================
// Endpoints
// =============================================================================

pub const GET_ADMIN_ORDERS: Endpoint =
    Endpoint::query("getAdminOrders", "admin/orders", &[Tag::AdminOrder]);
pub const UPDATE_ORDER: Endpoint = Endpoint::mutation(
    "updateOrder",
    HttpMethod::Put,
    "admin/orders",
    &[Tag::AdminOrder, Tag::Order],
);
pub const GET_SELLER_PAYMENTS: Endpoint =
    Endpoint::query("getSellerPayments", "admin/payments", &[Tag::SellerPayment]);
pub const PROCESS_SELLER_PAYMENT: Endpoint = Endpoint::mutation(
    "processSellerPayment",
    HttpMethod::Post,
    "admin/process-seller-payment",
    &[Tag::SellerPayment, Tag::AdminOrder],
);

#[derive(Deserialize)]
struct OrdersData {
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    pagination: Option<PageMeta>,
}

#[derive(Deserialize)]
struct PaymentsData {
    #[serde(default)]
    payments: Vec<SellerPayment>,
    #[serde(default)]
    users: Vec<UserSummary>,
    #[serde(default)]
    pagination: Option<PageMeta>,
}

// =============================================================================
// AdminClient
// =============================================================================

/// Admin operations on top of the shared API client.
#[derive(Clone)]
pub struct AdminClient {
    api: ApiClient,
}

impl AdminClient {
    /// Admin client for `user`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAdmin` if `user` lacks the admin role.
    pub fn for_user(api: ApiClient, user: &User) -> Result<Self, AdminError> {
        if user.is_admin() {
            Ok(Self { api })
        } else {
            Err(AdminError::NotAdmin)
        }
    }

    /// The current page of the order list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(page = view.page()))]
    pub async fn orders(&self, view: &ListView<OrderFilters>) -> Result<Page<Order>, AdminError> {
        let request = with_query(ApiRequest::new(GET_ADMIN_ORDERS), view.query_pairs());
        let data: OrdersData = self.api.query(&request).await?;
        Ok(view.paginate(data.orders, data.pagination))
    }

    /// Change an order's status, payment status or notes.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` for an empty edit, otherwise any
    /// request error.
    #[instrument(skip(self, edit), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: &OrderId,
        edit: &OrderEdit,
    ) -> Result<String, AdminError> {
        if edit.is_empty() {
            return Err(ValidationError::field("updates", "Nothing to update").into());
        }
        let request = ApiRequest::new(UPDATE_ORDER)
            .segment(order_id.as_str())
            .json(edit)
            .map_err(ApiError::from)?;
        let response = self.api.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Order updated successfully"))
    }

    /// The current page of the payout list, with the seller list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(page = view.page()))]
    pub async fn payments(
        &self,
        view: &ListView<PaymentFilters>,
    ) -> Result<PaymentsPage, AdminError> {
        let request = with_query(ApiRequest::new(GET_SELLER_PAYMENTS), view.query_pairs());
        let data: PaymentsData = self.api.query(&request).await?;
        Ok(PaymentsPage {
            payments: view.paginate(data.payments, data.pagination),
            sellers: data.users,
        })
    }

    /// Pay the seller of one product in `order_id`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` without sending anything if the form
    /// is incomplete, otherwise any request error.
    #[instrument(skip(self, form), fields(order_id = %order_id))]
    pub async fn process_seller_payment(
        &self,
        order_id: &OrderId,
        form: &PayoutForm,
    ) -> Result<String, AdminError> {
        form.validate()?;
        let request = ApiRequest::new(PROCESS_SELLER_PAYMENT)
            .segment(order_id.as_str())
            .body(json!({
                "productId": form.product_id,
                "paymentMethod": form.payment_method,
                "amount": form.amount,
                "notes": form.notes.trim(),
            }));
        let response = self.api.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Payment processed successfully"))
    }
}

fn with_query(request: ApiRequest, pairs: Vec<(&'static str, String)>) -> ApiRequest {
    pairs
        .into_iter()
        .fold(request, |request, (key, value)| request.query_param(key, value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use book_kart_storefront::ClientConfig;

    use super::*;

    fn user(role: &str) -> User {
        serde_json::from_value(serde_json::json!({
            "_id": "u1",
            "name": "Asha",
            "email": "asha@example.com",
            "role": role
        }))
        .unwrap()
    }

    fn api() -> ApiClient {
        ApiClient::new(&ClientConfig::for_api_url("http://127.0.0.1:9/api").unwrap()).unwrap()
    }

    #[test]
    fn test_admin_role_required() {
        assert!(AdminClient::for_user(api(), &user("admin")).is_ok());
        assert!(matches!(
            AdminClient::for_user(api(), &user("user")),
            Err(AdminError::NotAdmin)
        ));
    }

    #[test]
    fn test_endpoint_tags() {
        assert!(GET_ADMIN_ORDERS.is_cached());
        assert!(UPDATE_ORDER.invalidates.contains(&Tag::AdminOrder));
        assert!(PROCESS_SELLER_PAYMENT.invalidates.contains(&Tag::SellerPayment));
    }

    #[tokio::test]
    async fn test_incomplete_payout_is_not_sent() {
        let client = AdminClient::for_user(api(), &user("admin")).unwrap();
        let form = PayoutForm {
            product_id: None,
            payment_method: None,
            amount: book_kart_core::types::Price::rupees(100),
            notes: String::new(),
        };
        let err = client
            .process_seller_payment(&OrderId::new("o1"), &form)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_edit_is_not_sent() {
        let client = AdminClient::for_user(api(), &user("admin")).unwrap();
        let err = client
            .update_order(&OrderId::new("o1"), &OrderEdit::default())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Nothing to update");
    }
}
