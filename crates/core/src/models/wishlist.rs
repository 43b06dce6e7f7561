//! Wishlist records.

use serde::{Deserialize, Serialize};

use crate::types::{ProductId, WishlistId};

/// A wishlist collection and the products saved in it.
///
/// The list endpoint populates products, the add endpoint returns bare ids;
/// both are reduced to ids here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    #[serde(rename = "_id")]
    pub id: WishlistId,
    #[serde(default, deserialize_with = "crate::models::reference::ids_or_docs")]
    pub products: Vec<ProductId>,
}

impl WishlistItem {
    /// Whether this entry holds `product`.
    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.products.contains(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_populated_products_become_ids() {
        let item: WishlistItem = serde_json::from_str(
            r#"{"_id": "w1", "user": "u1", "products": [{"_id": "p1", "title": "x", "price": 1}, "p2"]}"#,
        )
        .unwrap();
        assert!(item.contains(&ProductId::new("p1")));
        assert!(item.contains(&ProductId::new("p2")));
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            serde_json::json!({"_id": "w1", "products": ["p1", "p2"]})
        );
    }
}
