//! Orders and checkout payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Address, Book, CartItem, UserSummary};
use crate::types::{OrderId, OrderStatus, PaymentStatus, Price, ProductId};

/// One book in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: Book,
    pub quantity: u32,
}

/// Payment gateway references attached to a paid order.
///
/// Field names are the gateway's own and stay snake case on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPayment {
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<GatewayPayment>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub total_amount: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl Order {
    /// Name of the customer, or `"Unknown"` when the backend did not embed one.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
    }
}

/// A product and quantity in a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product: ProductId,
    pub quantity: u32,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product: item.product.id.clone(),
            quantity: item.quantity,
        }
    }
}

/// Body of the order upsert.
///
/// Without `order_id` a new order is created (POST); with it the existing
/// order is patched (PATCH). Absent fields are left unchanged on a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderLine>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<GatewayPayment>,
}

impl OrderUpdate {
    /// A new order for everything in the cart.
    #[must_use]
    pub fn checkout(items: &[CartItem], total_amount: Price, shipping_address: Address) -> Self {
        Self {
            items: Some(items.iter().map(OrderLine::from).collect()),
            total_amount: Some(total_amount),
            shipping_address: Some(shipping_address),
            payment_method: Some("razorpay".to_string()),
            ..Self::default()
        }
    }

    /// Record a gateway payment against an existing order.
    #[must_use]
    pub fn paid(order_id: OrderId, payment: GatewayPayment) -> Self {
        Self {
            order_id: Some(order_id),
            payment_status: Some(PaymentStatus::Completed),
            payment_details: Some(payment),
            ..Self::default()
        }
    }

    /// True when this patches an existing order.
    #[must_use]
    pub const fn is_update(&self) -> bool {
        self.order_id.is_some()
    }
}

/// Gateway order created for a checkout; the buyer pays against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    /// Amount in paise.
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_payload_with_string_total() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o1",
            "items": [],
            "paymentDetails": {"razorpay_order_id": "order_9", "razorpay_payment_id": "pay_9", "razorpay_signature": "sig"},
            "paymentStatus": "completed",
            "status": "shipped",
            "createdAt": "2024-05-01T08:30:00Z",
            "user": {"_id": "u1", "email": "asha@example.com", "name": "Asha"},
            "totalAmount": "840"
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert_eq!(order.total_amount, Price::rupees(840));
        assert_eq!(order.customer_name(), "Asha");
        assert_eq!(
            order.payment_details.unwrap().razorpay_payment_id,
            "pay_9"
        );
    }

    #[test]
    fn test_paid_update_body() {
        let update = OrderUpdate::paid(
            OrderId::new("o1"),
            GatewayPayment {
                razorpay_order_id: "order_9".to_string(),
                razorpay_payment_id: "pay_9".to_string(),
                razorpay_signature: "sig".to_string(),
            },
        );
        assert!(update.is_update());
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["orderId"], "o1");
        assert_eq!(body["paymentStatus"], "completed");
        assert!(body.get("items").is_none());
    }
}
