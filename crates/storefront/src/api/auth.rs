//! Authentication endpoints and their forms.

use book_kart_core::models::User;
use book_kart_core::validation::{FieldErrors, Validate, ValidationError};
use secrecy::{ExposeSecret, SecretString};
use serde::de::IgnoredAny;
use serde_json::json;
use tracing::instrument;
use url::Url;

use super::endpoint::{self, ApiRequest};
use super::{ApiClient, ApiError};

// =============================================================================
// Forms
// =============================================================================

/// Email and password sign-in.
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        errors.email("email", &self.email);
        errors.required("password", self.password.expose_secret(), "Password is required");
        errors.finish()
    }
}

/// New account sign-up.
#[derive(Debug)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        errors.required("name", &self.name, "Name is required");
        errors.email("email", &self.email);
        errors.min_len(
            "password",
            self.password.expose_secret(),
            8,
            "Password must be at least 8 characters",
        );
        errors.finish()
    }
}

/// Request a password reset link.
#[derive(Debug)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl Validate for ForgotPasswordForm {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        errors.email("email", &self.email);
        errors.finish()
    }
}

/// Choose a new password using the token from the reset link.
#[derive(Debug)]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: SecretString,
}

impl Validate for ResetPasswordForm {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        errors.required("token", &self.token, "Reset link is invalid");
        errors.min_len(
            "newPassword",
            self.new_password.expose_secret(),
            8,
            "Password must be at least 8 characters",
        );
        errors.finish()
    }
}

// =============================================================================
// Auth Methods
// =============================================================================

impl ApiClient {
    /// Create an account. The backend emails a verification link.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the API rejects it.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn register(&self, form: &RegisterForm) -> Result<String, ApiError> {
        form.validate()?;
        let request = ApiRequest::new(endpoint::REGISTER).body(json!({
            "name": form.name.trim(),
            "email": form.email.trim(),
            "password": form.password.expose_secret(),
        }));
        let response = self.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Registration successful, please check your email to verify your account"))
    }

    /// Sign in; the backend sets the session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid, the credentials are wrong, or
    /// the response carries no user.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Result<User, ApiError> {
        form.validate()?;
        let request = ApiRequest::new(endpoint::LOGIN).body(json!({
            "email": form.email.trim(),
            "password": form.password.expose_secret(),
        }));
        Ok(self.mutate::<User>(&request).await?.data)
    }

    /// URL that starts the Google sign-in flow in a browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot hold a path.
    pub fn google_login_url(&self) -> Result<Url, ApiError> {
        let mut url = self.base_url().clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url().to_string()))?
            .pop_if_empty()
            .extend(endpoint::GOOGLE_LOGIN.split('/'));
        Ok(url)
    }

    /// Confirm an email address with the token from the verification link.
    ///
    /// Returns the now-verified user when the backend signs them in.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<Option<User>, ApiError> {
        let request = ApiRequest::new(endpoint::VERIFY_EMAIL).segment(token.trim());
        Ok(self.mutate::<Option<User>>(&request).await?.data)
    }

    /// Ask for a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or the API rejects it.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<String, ApiError> {
        form.validate()?;
        let request =
            ApiRequest::new(endpoint::FORGOT_PASSWORD).body(json!({ "email": form.email.trim() }));
        let response = self.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Password reset link sent to your email"))
    }

    /// Set a new password.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is too short or the token is invalid.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, form: &ResetPasswordForm) -> Result<String, ApiError> {
        form.validate()?;
        let request = ApiRequest::new(endpoint::RESET_PASSWORD)
            .segment(form.token.trim())
            .body(json!({ "newPassword": form.new_password.expose_secret() }));
        let response = self.mutate::<IgnoredAny>(&request).await?;
        Ok(response.message_or("Password reset successfully"))
    }

    /// The user behind the current session cookie, if any.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when there is no valid session.
    #[instrument(skip_all)]
    pub async fn verify_auth(&self) -> Result<Option<User>, ApiError> {
        self.query(&ApiRequest::new(endpoint::VERIFY_AUTH)).await
    }

    /// End the session and drop every cached query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails; the cache is kept in that case.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<String, ApiError> {
        let response = self
            .mutate::<IgnoredAny>(&ApiRequest::new(endpoint::LOGOUT))
            .await?;
        self.clear_cache();
        Ok(response.message_or("Logged out successfully"))
    }
}
