//! Admin order list and order edits.

use book_kart_core::models::Order;
use book_kart_core::types::{OrderStatus, PaymentStatus};
use chrono::NaiveDate;
use serde::Serialize;

use crate::list::{ListFilter, day_param, search_matches, within_dates};

/// Filters of the admin order list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Matches the order id or the customer name.
    pub search: String,
}

impl ListFilter for OrderFilters {
    type Item = Order;

    fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| order.status == s)
            && self.payment_status.is_none_or(|s| order.payment_status == s)
            && within_dates(order.created_at, self.start_date, self.end_date)
            && search_matches(
                &self.search,
                [
                    Some(order.id.as_str()),
                    order.user.as_ref().map(|u| u.name.as_str()),
                ],
            )
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(status) = self.payment_status {
            pairs.push(("paymentStatus", status.to_string()));
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

/// Body of an admin order edit. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderEdit {
    /// Start from an order's current values.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            status: Some(order.status),
            payment_status: Some(order.payment_status),
            notes: None,
        }
    }

    /// True when nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.payment_status.is_none()
            && self.notes.as_deref().is_none_or(|n| n.trim().is_empty())
    }
}
