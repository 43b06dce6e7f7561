//! Book Kart REST API client.
//!
//! Uses `reqwest` 0.13 with a shared cookie jar, so every request carries the
//! session cookie set at login. Query results are cached in `moka` by
//! endpoint name and arguments; mutations drop the cached entries whose tags
//! they invalidate.
//!
//! # Example
//!
//! ```rust,ignore
//! use book_kart_storefront::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(&ClientConfig::from_env()?)?;
//!
//! // Served from the network, then from the cache
//! let books = client.get_products().await?;
//! let books = client.get_products().await?;
//!
//! // Invalidates every cached cart query
//! client.add_to_cart(&books[0].id, 1).await?;
//! ```

mod addresses;
mod auth;
mod cache;
mod cart;
pub mod endpoint;
mod envelope;
mod error;
mod orders;
mod products;
mod users;
mod wishlist;

pub use auth::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
pub use endpoint::{ApiRequest, Endpoint, EndpointKind, HttpMethod, Tag};
pub use envelope::{ApiResponse, Envelope};
pub use error::ApiError;

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use cache::QueryCache;
use envelope::decode_data;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Book Kart REST API.
///
/// Cheap to clone; clones share the connection pool, cookie jar and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cookies: Arc<Jar>,
    cache: QueryCache,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let cookies = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(config.request_timeout)
            .user_agent(concat!("book-kart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                cookies,
                cache: QueryCache::new(config.cache_ttl),
            }),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Run a query, serving it from the cache when possible.
    ///
    /// Endpoints that are not cacheable always go to the network.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or `data`
    /// does not decode as `T`.
    #[instrument(skip_all, fields(endpoint = request.endpoint().name))]
    pub async fn query<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let endpoint = request.endpoint();
        if !endpoint.is_cached() {
            let envelope = self.execute(request).await?;
            return decode_data(envelope.data.unwrap_or_default());
        }

        let key = request.cache_key();
        if let Some(data) = self.inner.cache.get(&key).await {
            debug!(key = %key, "Cache hit");
            return decode_data(data);
        }

        let epoch = self.inner.cache.epoch();
        let envelope = self.execute(request).await?;
        let data = envelope.data.unwrap_or_default();

        // Decode before caching so a malformed body is never served again
        let decoded = decode_data(data.clone())?;
        self.inner
            .cache
            .insert(key, data, endpoint.provides, epoch)
            .await;

        Ok(decoded)
    }

    /// Run a mutation and invalidate the tags it declares.
    ///
    /// Tags are only invalidated when the mutation succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or `data`
    /// does not decode as `T`.
    #[instrument(skip_all, fields(endpoint = request.endpoint().name))]
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<ApiResponse<T>, ApiError> {
        let envelope = self.execute(request).await?;
        self.inner
            .cache
            .invalidate_tags(request.endpoint().invalidates)
            .await;
        envelope.into_response()
    }

    /// Drop every cached query.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Execute a request and unwrap its envelope.
    async fn execute(&self, request: &ApiRequest) -> Result<Envelope, ApiError> {
        let url = self.url_for(request)?;
        let method = request.endpoint().method;
        debug!(method = ?method, url = %url, "Sending API request");

        let mut builder = self.inner.client.request(method.to_reqwest(), url);
        if let Some(body) = request.json_body() {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::from_response(status, &response_text));
        }

        if response_text.trim().is_empty() {
            return Ok(Envelope {
                success: true,
                message: None,
                data: None,
            });
        }

        let envelope: Envelope = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })?;

        envelope.check()
    }

    /// Full URL of a request: base URL, endpoint path, arguments, query.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(request.path_segments());

        if !request.query_pairs().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query_pairs());
        }

        Ok(url)
    }

    // =========================================================================
    // Session cookies
    // =========================================================================

    /// The `Cookie` header the jar would send to the API, if any.
    #[must_use]
    pub fn session_cookies(&self) -> Option<String> {
        self.inner
            .cookies
            .cookies(&self.inner.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
            .filter(|header| !header.is_empty())
    }

    /// Put cookies from a saved `Cookie` header back into the jar.
    pub fn restore_session_cookies(&self, header: &str) {
        for cookie in header.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            self.inner
                .cookies
                .add_cookie_str(cookie, &self.inner.base_url);
        }
    }

    /// Expire every cookie the jar holds for the API.
    pub fn clear_session_cookies(&self) {
        let Some(header) = self.session_cookies() else {
            return;
        };
        let names: Vec<&str> = header
            .split(';')
            .filter_map(|pair| pair.split_once('=').map(|(name, _)| name.trim()))
            .filter(|name| !name.is_empty())
            .collect();
        for name in names {
            for expired in [
                format!("{name}=; Max-Age=0"),
                format!("{name}=; Max-Age=0; Path=/"),
            ] {
                self.inner
                    .cookies
                    .add_cookie_str(&expired, &self.inner.base_url);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::for_api_url(api_url).unwrap()).unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = client("http://localhost:8000/api");
        let request = ApiRequest::new(endpoint::GET_CART).segment("u1");
        assert_eq!(
            client.url_for(&request).unwrap().as_str(),
            "http://localhost:8000/api/cart/u1"
        );

        let client = self::client("http://localhost:8000/api/");
        let request = ApiRequest::new(endpoint::GET_PRODUCTS).query_param("page", 2);
        assert_eq!(
            client.url_for(&request).unwrap().as_str(),
            "http://localhost:8000/api/products?page=2"
        );
    }

    #[test]
    fn test_url_escapes_arguments() {
        let client = client("http://localhost:8000/api");
        let request = ApiRequest::new(endpoint::VERIFY_EMAIL).segment("a/b c");
        assert_eq!(
            client.url_for(&request).unwrap().as_str(),
            "http://localhost:8000/api/auth/verify-email/a%2Fb%20c"
        );
    }

    #[test]
    fn test_session_cookie_roundtrip() {
        let client = client("http://localhost:8000/api");
        assert!(client.session_cookies().is_none());

        client.restore_session_cookies("access_token=abc; theme=dark");
        let header = client.session_cookies().unwrap();
        assert!(header.contains("access_token=abc"));
        assert!(header.contains("theme=dark"));

        client.clear_session_cookies();
        assert!(client.session_cookies().is_none());
    }
}
