//! Wire entities mirrored from the Book Kart API.
//!
//! The backend is a document store: keys are camelCase and every document id
//! is `_id`. References between documents arrive either as a bare id or as
//! the populated document, depending on the endpoint; [`reference`] accepts
//! both shapes.

pub mod address;
pub mod book;
pub mod cart;
pub mod order;
pub mod payout;
pub mod reference;
pub mod user;
pub mod wishlist;

pub use address::{Address, AddressInput};
pub use book::{BankDetails, Book, BookSummary, NewBook, PayoutDetails};
pub use cart::{Cart, CartItem, CartSummary};
pub use order::{GatewayPayment, Order, OrderItem, OrderLine, OrderUpdate, RazorpayOrder};
pub use payout::{PaidProduct, SellerPayment};
pub use user::{ProfileUpdate, User, UserSummary};
pub use wishlist::WishlistItem;
