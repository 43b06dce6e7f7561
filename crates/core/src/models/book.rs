//! Book listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserSummary;
use crate::types::{Price, ProductId, SellerPaymentMode, ShippingCharge, discount_percent};

/// Bank account a seller is paid into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
}

/// Where a seller is paid once the book sells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
}

/// A full listing, as returned by the product endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub class_type: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub edition: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub final_price: Price,
    #[serde(default)]
    pub shipping_charge: ShippingCharge,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<SellerPaymentMode>,
    #[serde(default)]
    pub payment_details: PayoutDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<UserSummary>,
}

impl Book {
    /// Discount shown on the listing card.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        discount_percent(self.price, self.final_price)
    }
}

/// The trimmed listing embedded in cart items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: Price,
    pub final_price: Price,
    #[serde(default)]
    pub shipping_charge: ShippingCharge,
}

impl BookSummary {
    /// Discount shown next to the cart line.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        discount_percent(self.price, self.final_price)
    }
}

/// Body of a new listing.
///
/// Images are URLs of already-uploaded files; uploading is handled by the
/// image host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub images: Vec<String>,
    pub category: String,
    pub condition: String,
    pub class_type: String,
    pub subject: String,
    pub author: String,
    pub edition: String,
    pub description: String,
    pub price: Price,
    pub final_price: Price,
    pub shipping_charge: ShippingCharge,
    pub payment_mode: SellerPaymentMode,
    pub payment_details: PayoutDetails,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_book_from_listing_payload() {
        let book: Book = serde_json::from_value(serde_json::json!({
            "_id": "b1",
            "title": "Concepts of Physics",
            "images": ["https://img.example.com/b1.jpg"],
            "category": "Reading Books (Novels)",
            "condition": "Good",
            "classType": "B.Tech",
            "subject": "Physics",
            "author": "H. C. Verma",
            "edition": "2019",
            "price": 500,
            "finalPrice": 400,
            "shippingCharge": "free",
            "paymentMode": "UPI",
            "paymentDetails": {"upiId": "seller@upi"},
            "createdAt": "2024-03-10T12:00:00.000Z",
            "seller": {"name": "Ravi", "email": "ravi@example.com", "keepPrivate": false}
        }))
        .unwrap();

        assert_eq!(book.discount_percent(), 20);
        assert!(book.shipping_charge.is_free());
        assert_eq!(book.payment_mode, Some(SellerPaymentMode::Upi));
        assert_eq!(book.payment_details.upi_id.as_deref(), Some("seller@upi"));
        assert_eq!(book.seller.unwrap().name, "Ravi");
    }
}
