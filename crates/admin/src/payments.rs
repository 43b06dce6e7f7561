//! Seller payout list and the payout form.

use book_kart_core::models::{Order, SellerPayment, UserSummary};
use book_kart_core::types::{PaymentStatus, PayoutMethod, Price, ProductId, UserId};
use book_kart_core::validation::{FieldErrors, Validate, ValidationError};
use chrono::NaiveDate;
use serde::Serialize;

use crate::list::{ListFilter, Page, day_param, search_matches, within_dates};

/// Filters of the seller payout list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilters {
    pub seller_id: Option<UserId>,
    pub status: Option<PaymentStatus>,
    pub payment_method: Option<PayoutMethod>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Matches notes, seller name or product subject.
    pub search: String,
}

impl ListFilter for PaymentFilters {
    type Item = SellerPayment;

    fn matches(&self, payment: &SellerPayment) -> bool {
        let seller_id = payment.seller.as_ref().and_then(|s| s.id.as_ref());

        self.seller_id
            .as_ref()
            .is_none_or(|id| seller_id == Some(id))
            && self.status.is_none_or(|s| payment.status == s)
            && self
                .payment_method
                .is_none_or(|m| payment.payment_method == m)
            && within_dates(payment.created_at, self.start_date, self.end_date)
            && search_matches(
                &self.search,
                [
                    payment.notes.as_deref(),
                    payment.seller.as_ref().map(|s| s.name.as_str()),
                    payment.product.as_ref().map(|p| p.subject.as_str()),
                ],
            )
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.seller_id {
            pairs.push(("sellerId", id.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(method) = self.payment_method {
            pairs.push(("paymentMethod", method.to_string()));
        }
        if let Some(day) = self.start_date {
            pairs.push(("startDate", day_param(day)));
        }
        if let Some(day) = self.end_date {
            pairs.push(("endDate", day_param(day)));
        }
        if !self.search.trim().is_empty() {
            pairs.push(("search", self.search.trim().to_string()));
        }
        pairs
    }
}

/// A page of payouts and the sellers the seller filter offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentsPage {
    pub payments: Page<SellerPayment>,
    pub sellers: Vec<UserSummary>,
}

/// The "pay seller" form of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutForm {
    pub product_id: Option<ProductId>,
    pub payment_method: Option<PayoutMethod>,
    pub amount: Price,
    pub notes: String,
}

impl PayoutForm {
    /// A payout for `order`: its total, paid by UPI, product still to pick.
    #[must_use]
    pub const fn for_order(order: &Order) -> Self {
        Self {
            product_id: None,
            payment_method: Some(PayoutMethod::Upi),
            amount: order.total_amount,
            notes: String::new(),
        }
    }
}

impl Validate for PayoutForm {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        errors.present("productId", self.product_id.as_ref(), "Please select a product");
        errors.present(
            "paymentMethod",
            self.payment_method.as_ref(),
            "Please select a payment method",
        );
        errors.finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payment(id: &str, seller: (&str, &str), subject: &str, notes: &str) -> SellerPayment {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "seller": {"_id": seller.0, "name": seller.1},
            "product": {"_id": format!("p-{id}"), "subject": subject},
            "amount": 250,
            "paymentMethod": "UPI",
            "status": "completed",
            "notes": notes,
            "createdAt": "2024-05-02T10:00:00Z"
        }))
        .unwrap()
    }

    fn payments() -> Vec<SellerPayment> {
        vec![
            payment("pay1", ("s1", "Ravi"), "Physics", "weekly batch"),
            payment("pay2", ("s2", "Meera"), "Chemistry", ""),
            payment("pay3", ("s1", "Ravi"), "Mathematics", "urgent"),
        ]
    }

    fn hits(filters: &PaymentFilters) -> Vec<String> {
        payments()
            .into_iter()
            .filter(|p| filters.matches(p))
            .map(|p| p.id.to_string())
            .collect()
    }

    #[test]
    fn test_search_fields() {
        let search = |s: &str| PaymentFilters {
            search: s.to_string(),
            ..PaymentFilters::default()
        };
        assert_eq!(hits(&search("BATCH")), vec!["pay1"]);
        assert_eq!(hits(&search("meera")), vec!["pay2"]);
        assert_eq!(hits(&search("math")), vec!["pay3"]);
        assert_eq!(hits(&search("")).len(), 3);
    }

    #[test]
    fn test_seller_and_method_filters() {
        let filters = PaymentFilters {
            seller_id: Some(UserId::new("s1")),
            ..PaymentFilters::default()
        };
        assert_eq!(hits(&filters), vec!["pay1", "pay3"]);

        let filters = PaymentFilters {
            payment_method: Some(PayoutMethod::BankTransfer),
            ..PaymentFilters::default()
        };
        assert!(hits(&filters).is_empty());
    }

    #[test]
    fn test_query_pairs_use_wire_values() {
        let filters = PaymentFilters {
            payment_method: Some(PayoutMethod::BankTransfer),
            status: Some(PaymentStatus::Pending),
            ..PaymentFilters::default()
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("status", "pending".to_string()),
                ("paymentMethod", "Bank Transfer".to_string()),
            ]
        );
    }

    #[test]
    fn test_payout_form_requires_product_and_method() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o1",
            "totalAmount": 840
        }))
        .unwrap();

        let mut form = PayoutForm::for_order(&order);
        assert_eq!(form.amount, Price::rupees(840));
        form.payment_method = None;

        let err = form.validate().unwrap_err();
        assert_eq!(err.message_for("productId"), Some("Please select a product"));
        assert_eq!(
            err.message_for("paymentMethod"),
            Some("Please select a payment method")
        );

        form.product_id = Some(ProductId::new("p1"));
        form.payment_method = Some(PayoutMethod::Other);
        assert!(form.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            serde_json::json!({
                "productId": "p1",
                "paymentMethod": "Other",
                "amount": 840.0,
                "notes": ""
            })
        );
    }
}
