//! Browsing, wishlist, addresses, checkout and selling.

#![allow(clippy::unwrap_used)]

use book_kart_core::models::{AddressInput, GatewayPayment, NewBook, PayoutDetails};
use book_kart_core::types::{
    PaymentStatus, Price, ProductId, SellerPaymentMode, ShippingCharge,
};
use book_kart_integration_tests::{
    BUYER_EMAIL, BUYER_ID, CHEMISTRY, FakeBackend, MATHS, PASSWORD, PHYSICS, SELLER_EMAIL,
};
use book_kart_storefront::api::LoginForm;
use book_kart_storefront::{ApiError, Storefront};
use secrecy::SecretString;

async fn signed_in(backend: &FakeBackend, email: &str) -> Storefront {
    let shop = backend.storefront().unwrap();
    shop.login(&LoginForm {
        email: email.to_string(),
        password: SecretString::from(PASSWORD),
    })
    .await
    .unwrap();
    shop.toaster().drain();
    shop
}

fn address(pincode: &str) -> AddressInput {
    AddressInput {
        address_id: None,
        phone_number: "9876543210".to_string(),
        address_line1: "12 MG Road".to_string(),
        address_line2: None,
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: pincode.to_string(),
    }
}

#[tokio::test]
async fn test_browse_books() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = backend.storefront().unwrap();

    let books = shop.books().await.unwrap();
    assert_eq!(books.len(), 3);
    assert_eq!(books[0].discount_percent(), 20);

    let book = shop.book(&ProductId::new(MATHS)).await.unwrap();
    assert_eq!(book.author, "B. S. Grewal");
    assert!(book.shipping_charge.is_free());

    let err = shop.book(&ProductId::new("b-missing")).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_wishlist_add_and_remove() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend, BUYER_EMAIL).await;

    shop.add_to_wishlist(&ProductId::new(PHYSICS)).await.unwrap();
    shop.add_to_wishlist(&ProductId::new(CHEMISTRY)).await.unwrap();

    let wishlist = shop.store().snapshot().wishlist;
    assert!(wishlist.contains(&ProductId::new(PHYSICS)));
    assert!(wishlist.contains(&ProductId::new(CHEMISTRY)));

    shop.remove_from_wishlist(&ProductId::new(PHYSICS)).await.unwrap();
    let wishlist = shop.store().snapshot().wishlist;
    assert!(!wishlist.contains(&ProductId::new(PHYSICS)));
    assert!(wishlist.contains(&ProductId::new(CHEMISTRY)));

    // The removal invalidated the cached list
    shop.sync_wishlist().await.unwrap();
    assert_eq!(backend.hits("GET", "wishlist"), 3);
    assert_eq!(shop.store().snapshot().wishlist.items.len(), 1);
}

#[tokio::test]
async fn test_address_create_then_update() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend, BUYER_EMAIL).await;
    assert!(shop.addresses().await.unwrap().is_empty());

    let saved = shop.save_address(&address("560001")).await.unwrap();
    assert_eq!(shop.addresses().await.unwrap(), vec![saved.clone()]);

    let mut edit = AddressInput::editing(&saved);
    edit.pincode = "560002".to_string();
    let updated = shop.save_address(&edit).await.unwrap();
    assert_eq!(updated.id, saved.id);

    let list = shop.addresses().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].pincode, "560002");

    let notes: Vec<String> = shop.toaster().drain().into_iter().map(|n| n.message).collect();
    assert_eq!(
        notes,
        vec!["Address added successfully", "Address updated successfully"]
    );
}

#[tokio::test]
async fn test_invalid_address_is_not_sent() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend, BUYER_EMAIL).await;

    let err = shop.save_address(&address("56")).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(backend.hits("POST", "address/create-or-update"), 0);
}

#[tokio::test]
async fn test_checkout_and_payment() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend, BUYER_EMAIL).await;
    let address = shop.save_address(&address("560001")).await.unwrap();

    shop.add_to_cart(&ProductId::new(PHYSICS), 1).await.unwrap();
    shop.add_to_cart(&ProductId::new(CHEMISTRY), 1).await.unwrap();

    let checkout = shop.checkout(address).await.unwrap();
    assert_eq!(checkout.order.total_amount, Price::rupees(1050));
    assert_eq!(checkout.order.items.len(), 2);
    assert_eq!(checkout.payment.amount, 105_000);
    assert_eq!(checkout.payment.currency, "INR");

    let payment = GatewayPayment {
        razorpay_order_id: checkout.payment.id.clone(),
        razorpay_payment_id: "pay_test_1".to_string(),
        razorpay_signature: "sig".to_string(),
    };
    let order = shop.confirm_payment(&checkout.order.id, payment).await.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Completed);

    // The paid cart is emptied server-side and refetched
    assert!(shop.store().snapshot().cart.is_empty());
    assert!(backend.cart_of(BUYER_ID).is_empty());

    let orders = shop.orders().await.unwrap();
    assert!(orders.iter().any(|o| o.id == checkout.order.id));
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend, BUYER_EMAIL).await;
    let address = shop.save_address(&address("560001")).await.unwrap();
    shop.toaster().drain();

    let err = shop.checkout(address).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(backend.hits("POST", "orders"), 0);
    assert_eq!(shop.toaster().drain()[0].message, "Your cart is empty");
}

#[tokio::test]
async fn test_sell_and_withdraw_listing() {
    let backend = FakeBackend::start().await.unwrap();
    let seller = signed_in(&backend, SELLER_EMAIL).await;
    let buyer = signed_in(&backend, BUYER_EMAIL).await;

    let listing = seller
        .sell_book(&NewBook {
            title: "Signals and Systems".to_string(),
            images: vec![],
            category: "Engineering".to_string(),
            condition: "Like New".to_string(),
            class_type: "B.Tech".to_string(),
            subject: "Electronics".to_string(),
            author: "Oppenheim".to_string(),
            edition: "2nd".to_string(),
            description: String::new(),
            price: Price::rupees(900),
            final_price: Price::rupees(450),
            shipping_charge: ShippingCharge::Free,
            payment_mode: SellerPaymentMode::Upi,
            payment_details: PayoutDetails {
                upi_id: Some("ravi@upi".to_string()),
                bank_details: None,
            },
        })
        .await
        .unwrap();
    assert_eq!(seller.my_listings().await.unwrap().len(), 4);

    buyer.add_to_cart(&listing.id, 1).await.unwrap();
    seller.delete_listing(&listing.id).await.unwrap();

    assert_eq!(seller.my_listings().await.unwrap().len(), 3);
    assert!(backend.cart_of(BUYER_ID).is_empty());
}
