//! Cart records and the checkout summary.

use serde::{Deserialize, Serialize};

use crate::models::BookSummary;
use crate::types::{CartItemId, Price, UserId};

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: CartItemId,
    pub product: BookSummary,
    pub quantity: u32,
}

/// A user's cart, as returned by the cart endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::models::reference::opt_id_or_doc"
    )]
    pub user: Option<UserId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Totals shown on the checkout page.
///
/// Computed on display from the cart snapshot; the backend recomputes the
/// amount it actually charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Number of books, counting quantities.
    pub item_count: u32,
    /// Sum of list prices.
    pub list_total: Price,
    /// Sum of final prices.
    pub subtotal: Price,
    /// Sum of shipping charges.
    pub shipping: Price,
}

impl CartSummary {
    /// Summarise a list of cart lines.
    #[must_use]
    pub fn from_items(items: &[CartItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| {
            let product = &item.product;
            Self {
                item_count: acc.item_count.saturating_add(item.quantity),
                list_total: acc.list_total + product.price.times(item.quantity),
                subtotal: acc.subtotal + product.final_price.times(item.quantity),
                shipping: acc.shipping + product.shipping_charge.for_quantity(item.quantity),
            }
        })
    }

    /// What the buyer saves against list prices.
    #[must_use]
    pub fn savings(&self) -> Price {
        Price::new(self.list_total.amount() - self.subtotal.amount())
    }

    /// Amount due, shipping included.
    #[must_use]
    pub fn total(&self) -> Price {
        self.subtotal + self.shipping
    }
}
