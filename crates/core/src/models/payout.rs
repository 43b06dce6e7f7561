//! Seller payouts recorded by the admin console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserSummary;
use crate::types::{OrderId, PaymentId, PaymentStatus, PayoutMethod, Price, ProductId};

/// The listing a payout settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_price: Option<Price>,
}

/// A payment from the marketplace to a seller for one sold book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerPayment {
    #[serde(rename = "_id")]
    pub id: PaymentId,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::models::reference::opt_id_or_doc"
    )]
    pub order: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<PaidProduct>,
    pub amount: Price,
    pub payment_method: PayoutMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SellerPayment {
    /// Seller name, or `"Unknown"`.
    #[must_use]
    pub fn seller_name(&self) -> &str {
        self.seller
            .as_ref()
            .map(|s| s.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_payload() {
        let payment: SellerPayment = serde_json::from_value(serde_json::json!({
            "_id": "pay1",
            "order": {"_id": "o1", "status": "delivered"},
            "seller": {"_id": "s1", "name": "Ravi"},
            "product": {"_id": "p1", "subject": "Physics", "finalPrice": 400},
            "amount": 400,
            "paymentMethod": "Bank Transfer",
            "status": "completed",
            "notes": "settled weekly batch",
            "createdAt": "2024-05-02T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(payment.order, Some(OrderId::new("o1")));
        assert_eq!(payment.payment_method, PayoutMethod::BankTransfer);
        assert_eq!(payment.seller_name(), "Ravi");
        assert_eq!(payment.product.unwrap().subject, "Physics");
    }
}
