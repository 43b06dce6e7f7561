//! Failed calls leave the store alone and surface the server's message.

#![allow(clippy::unwrap_used)]

use book_kart_core::types::ProductId;
use book_kart_integration_tests::{
    BUYER_EMAIL, BUYER_ID, FakeBackend, PASSWORD, PHYSICS, StatusCode,
};
use book_kart_storefront::api::LoginForm;
use book_kart_storefront::{ApiError, NotificationLevel};
use secrecy::SecretString;

fn form(password: &str) -> LoginForm {
    LoginForm {
        email: BUYER_EMAIL.to_string(),
        password: SecretString::from(password),
    }
}

#[tokio::test]
async fn test_wrong_password_is_reported() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = backend.storefront().unwrap();

    let err = shop.login(&form("wrong-password")).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, .. }));
    assert!(shop.current_user().is_none());

    let notes = shop.toaster().drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].message, "Invalid email or password");
}

#[tokio::test]
async fn test_failed_mutation_keeps_cart_and_cache() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = backend.storefront().unwrap();
    shop.login(&form(PASSWORD)).await.unwrap();
    shop.add_to_cart(&ProductId::new(PHYSICS), 1).await.unwrap();
    shop.toaster().drain();
    let cart_path = format!("cart/{BUYER_ID}");
    let reads = backend.hits("GET", &cart_path);

    backend.fail_next(
        "POST",
        "cart/add",
        StatusCode::BAD_REQUEST,
        "Product is out of stock",
    );
    let err = shop.add_to_cart(&ProductId::new(PHYSICS), 1).await.unwrap_err();
    assert_eq!(err.user_message(), "Product is out of stock");

    // Nothing was invalidated, so the next read is still cached
    shop.sync_cart().await.unwrap();
    assert_eq!(backend.hits("GET", &cart_path), reads);
    assert_eq!(shop.store().snapshot().cart.items[0].quantity, 1);

    let notes = shop.toaster().drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "Product is out of stock");
}

#[tokio::test]
async fn test_signed_out_cart_asks_for_login() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = backend.storefront().unwrap();

    let err = shop.add_to_cart(&ProductId::new(PHYSICS), 1).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(shop.store().snapshot().auth.login_dialog_open);
    assert_eq!(backend.hits("POST", "cart/add"), 0);
    assert_eq!(
        shop.toaster().drain()[0].message,
        "Please log in to continue"
    );
}

#[tokio::test]
async fn test_expired_session_clears_silently() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = backend.storefront().unwrap();
    shop.login(&form(PASSWORD)).await.unwrap();
    shop.toaster().drain();

    backend.fail_next("GET", "auth/verify-auth", StatusCode::UNAUTHORIZED, "jwt expired");
    assert_eq!(shop.check_auth().await.unwrap(), None);
    assert!(shop.current_user().is_none());
    assert!(shop.toaster().drain().is_empty());
}

#[tokio::test]
async fn test_server_error_on_auth_check_keeps_user() {
    let backend = FakeBackend::start().await.unwrap();
    let shop = backend.storefront().unwrap();
    shop.login(&form(PASSWORD)).await.unwrap();
    shop.toaster().drain();

    backend.fail_next(
        "GET",
        "auth/verify-auth",
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database unavailable",
    );
    assert!(shop.check_auth().await.is_err());
    assert!(shop.current_user().is_some());
    assert_eq!(shop.toaster().drain()[0].message, "Database unavailable");
}
