//! Sign-in, sign-up and profile commands.

use book_kart_core::models::{ProfileUpdate, User};
use book_kart_storefront::Storefront;
use book_kart_storefront::api::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
use secrecy::SecretString;

use super::CommandError;

#[allow(clippy::print_stdout)]
fn print_user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("  id:   {}", user.id);
    println!("  role: {}", user.role);
    if let Some(phone) = user.phone_number.as_deref().filter(|p| !p.is_empty()) {
        println!("  phone: {phone}");
    }
}

pub async fn login(shop: &Storefront, email: String, password: String) -> Result<(), CommandError> {
    let form = LoginForm {
        email,
        password: SecretString::from(password),
    };
    let user = shop.login(&form).await?;
    print_user(&user);
    Ok(())
}

/// Google sign-in finishes in the browser; the backend sets the session there.
#[allow(clippy::print_stdout)]
pub fn google_login(shop: &Storefront) -> Result<(), CommandError> {
    let url = shop.client().google_login_url()?;
    println!("Open this URL to continue with Google:\n{url}");
    Ok(())
}

pub async fn register(
    shop: &Storefront,
    name: String,
    email: String,
    password: String,
) -> Result<(), CommandError> {
    let form = RegisterForm {
        name,
        email,
        password: SecretString::from(password),
    };
    shop.register(&form).await?;
    Ok(())
}

pub async fn verify_email(shop: &Storefront, token: &str) -> Result<(), CommandError> {
    if let Some(user) = shop.verify_email(token).await? {
        print_user(&user);
    }
    Ok(())
}

pub async fn forgot_password(shop: &Storefront, email: String) -> Result<(), CommandError> {
    shop.forgot_password(&ForgotPasswordForm { email }).await?;
    Ok(())
}

pub async fn reset_password(
    shop: &Storefront,
    token: String,
    password: String,
) -> Result<(), CommandError> {
    let form = ResetPasswordForm {
        token,
        new_password: SecretString::from(password),
    };
    shop.reset_password(&form).await?;
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn whoami(shop: &Storefront) -> Result<(), CommandError> {
    match shop.check_auth().await? {
        Some(user) => print_user(&user),
        None => println!("Not signed in"),
    }
    Ok(())
}

pub async fn update_profile(
    shop: &Storefront,
    name: Option<String>,
    phone: Option<String>,
    private: Option<bool>,
) -> Result<(), CommandError> {
    let update = ProfileUpdate {
        name,
        phone_number: phone,
        profile_picture: None,
        keep_private: private,
    };
    let user = shop.update_profile(&update).await?;
    print_user(&user);
    Ok(())
}
