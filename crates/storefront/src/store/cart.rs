//! Cart slice: the lines of the signed-in user's cart.

use book_kart_core::models::{CartItem, CartSummary};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Replace the whole list.
    SetCart(Vec<CartItem>),
    ClearCart,
}

impl CartState {
    #[must_use]
    pub fn reduce(self, action: CartAction) -> Self {
        match action {
            CartAction::SetCart(items) => Self { items },
            CartAction::ClearCart => Self::default(),
        }
    }

    /// Totals for the checkout page.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_items(&self.items)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
