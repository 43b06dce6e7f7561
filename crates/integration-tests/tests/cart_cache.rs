//! Cart flows through the cache: queries are served from memory until a
//! mutation invalidates their tag.

#![allow(clippy::unwrap_used)]

use book_kart_core::types::ProductId;
use book_kart_integration_tests::{
    BUYER_EMAIL, BUYER_ID, CHEMISTRY, FakeBackend, PASSWORD, PHYSICS, SELLER_EMAIL,
};
use book_kart_storefront::Storefront;
use book_kart_storefront::api::LoginForm;
use secrecy::SecretString;

fn form(email: &str) -> LoginForm {
    LoginForm {
        email: email.to_string(),
        password: SecretString::from(PASSWORD),
    }
}

async fn signed_in(backend: &FakeBackend) -> Storefront {
    let shop = backend.storefront().unwrap();
    shop.login(&form(BUYER_EMAIL)).await.unwrap();
    shop
}

#[tokio::test]
async fn test_repeated_cart_reads_hit_the_cache() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend).await;
    let cart_path = format!("cart/{BUYER_ID}");

    shop.sync_cart().await.unwrap();
    shop.sync_cart().await.unwrap();

    assert_eq!(backend.hits("GET", &cart_path), 1);
}

#[tokio::test]
async fn test_add_to_cart_refetches_and_updates_store() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend).await;
    let cart_path = format!("cart/{BUYER_ID}");

    assert!(shop.sync_cart().await.unwrap().is_empty());

    shop.add_to_cart(&ProductId::new(PHYSICS), 1).await.unwrap();
    shop.add_to_cart(&ProductId::new(CHEMISTRY), 2).await.unwrap();

    assert_eq!(backend.hits("GET", &cart_path), 3, "every add invalidates the cart");
    assert_eq!(
        backend.cart_of(BUYER_ID),
        vec![(PHYSICS.to_string(), 1), (CHEMISTRY.to_string(), 2)]
    );

    let cart = shop.store().snapshot().cart;
    assert_eq!(cart.items.len(), 2);
    let summary = cart.summary();
    assert_eq!(summary.item_count, 3);
    assert_eq!(summary.subtotal.to_string(), "₹1600");
    assert_eq!(summary.shipping.to_string(), "₹100");
    assert_eq!(summary.total().to_string(), "₹1700");
}

#[tokio::test]
async fn test_remove_from_cart() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend).await;

    shop.add_to_cart(&ProductId::new(PHYSICS), 1).await.unwrap();
    shop.remove_from_cart(&ProductId::new(PHYSICS)).await.unwrap();

    assert!(shop.store().snapshot().cart.is_empty());
    assert!(backend.cart_of(BUYER_ID).is_empty());
}

#[tokio::test]
async fn test_other_tags_stay_cached() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend).await;

    shop.books().await.unwrap();
    shop.add_to_cart(&ProductId::new(PHYSICS), 1).await.unwrap();
    shop.books().await.unwrap();

    assert_eq!(backend.hits("GET", "products"), 1);
}

#[tokio::test]
async fn test_logout_clears_cart_and_cache() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend).await;

    shop.books().await.unwrap();
    shop.add_to_cart(&ProductId::new(PHYSICS), 1).await.unwrap();
    shop.logout().await.unwrap();

    let state = shop.store().snapshot();
    assert!(state.auth.user.is_none());
    assert!(state.cart.is_empty());

    shop.books().await.unwrap();
    assert_eq!(backend.hits("GET", "products"), 2);
}

#[tokio::test]
async fn test_switching_accounts_drops_previous_data() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend).await;
    let physics = ProductId::new(PHYSICS);

    shop.add_to_wishlist(&physics).await.unwrap();
    shop.add_to_cart(&physics, 1).await.unwrap();
    assert!(!shop.store().snapshot().wishlist.items.is_empty());
    assert_eq!(backend.hits("GET", "wishlist"), 1);

    shop.login(&form(SELLER_EMAIL)).await.unwrap();
    let state = shop.store().snapshot();
    assert!(state.cart.is_empty());
    assert!(state.wishlist.items.is_empty());

    let wishlist = shop.client().get_wishlist().await.unwrap();
    assert!(wishlist.is_empty());
    assert_eq!(backend.hits("GET", "wishlist"), 2);
}

#[tokio::test]
async fn test_signing_in_again_keeps_the_cache() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = signed_in(&backend).await;

    shop.sync_wishlist().await.unwrap();
    shop.login(&form(BUYER_EMAIL)).await.unwrap();
    shop.sync_wishlist().await.unwrap();

    assert_eq!(backend.hits("GET", "wishlist"), 1);
}
