//! Wishlist slice.

use book_kart_core::models::WishlistItem;
use book_kart_core::types::ProductId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistState {
    pub items: Vec<WishlistItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistAction {
    SetWishlist(Vec<WishlistItem>),
    /// Replace the entry with the same id, or append.
    Add(WishlistItem),
    /// Drop the product from every entry, then drop entries left empty.
    Remove(ProductId),
    Clear,
}

impl WishlistState {
    #[must_use]
    pub fn reduce(mut self, action: WishlistAction) -> Self {
        match action {
            WishlistAction::SetWishlist(items) => Self { items },
            WishlistAction::Add(item) => {
                match self.items.iter_mut().find(|existing| existing.id == item.id) {
                    Some(existing) => *existing = item,
                    None => self.items.push(item),
                }
                self
            }
            WishlistAction::Remove(product) => {
                for entry in &mut self.items {
                    entry.products.retain(|p| *p != product);
                }
                self.items.retain(|entry| !entry.products.is_empty());
                self
            }
            WishlistAction::Clear => Self::default(),
        }
    }

    /// Whether any entry holds `product`.
    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.items.iter().any(|entry| entry.contains(product))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use book_kart_core::types::WishlistId;

    use super::*;

    fn entry(id: &str, products: &[&str]) -> WishlistItem {
        WishlistItem {
            id: WishlistId::new(id),
            products: products.iter().map(|p| ProductId::new(*p)).collect(),
        }
    }

    #[test]
    fn test_add_replaces_same_id() {
        let state = WishlistState::default()
            .reduce(WishlistAction::Add(entry("w1", &["p1"])))
            .reduce(WishlistAction::Add(entry("w1", &["p1", "p2"])))
            .reduce(WishlistAction::Add(entry("w2", &["p3"])));
        assert_eq!(state.items, vec![entry("w1", &["p1", "p2"]), entry("w2", &["p3"])]);
    }

    #[test]
    fn test_remove_drops_emptied_entries() {
        let state = WishlistState::default()
            .reduce(WishlistAction::SetWishlist(vec![
                entry("w1", &["p1"]),
                entry("w2", &["p1", "p2"]),
            ]))
            .reduce(WishlistAction::Remove(ProductId::new("p1")));

        assert_eq!(state.items, vec![entry("w2", &["p2"])]);
        assert!(!state.contains(&ProductId::new("p1")));
        assert!(state.contains(&ProductId::new("p2")));
    }

    #[test]
    fn test_remove_unknown_product_is_noop() {
        let before = WishlistState::default()
            .reduce(WishlistAction::SetWishlist(vec![entry("w1", &["p1"])]));
        let after = before.clone().reduce(WishlistAction::Remove(ProductId::new("p9")));
        assert_eq!(before, after);
    }
}
