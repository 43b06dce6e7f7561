//! Declarative endpoint table.
//!
//! Every backend call is described by an [`Endpoint`] constant: its name (the
//! cache key prefix), HTTP method, base path, and the cache tags it provides
//! or invalidates. An [`ApiRequest`] binds an endpoint to its arguments.

use serde::Serialize;

/// Cache tag.
///
/// Queries provide tags; mutations invalidate them. Tags are coarse: a
/// mutation on one cart line invalidates every cached cart query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    User,
    Product,
    Cart,
    Wishlist,
    Order,
    Address,
    AdminOrder,
    SellerPayment,
}

impl Tag {
    /// Every tag. Invalidating this drops the whole cache.
    pub const ALL: &'static [Self] = &[
        Self::User,
        Self::Product,
        Self::Cart,
        Self::Wishlist,
        Self::Order,
        Self::Address,
        Self::AdminOrder,
        Self::SellerPayment,
    ];
}

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Whether results of an endpoint may be served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Idempotent read, cached by name and arguments.
    Query,
    /// Write or session-sensitive read, never cached.
    Mutation,
}

/// One backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    pub kind: EndpointKind,
    /// Base path below the API URL, without leading slash.
    pub path: &'static str,
    pub provides: &'static [Tag],
    pub invalidates: &'static [Tag],
}

impl Endpoint {
    /// A cached GET.
    #[must_use]
    pub const fn query(name: &'static str, path: &'static str, provides: &'static [Tag]) -> Self {
        Self {
            name,
            method: HttpMethod::Get,
            kind: EndpointKind::Query,
            path,
            provides,
            invalidates: &[],
        }
    }

    /// An uncached call that drops cached entries carrying `invalidates`.
    #[must_use]
    pub const fn mutation(
        name: &'static str,
        method: HttpMethod,
        path: &'static str,
        invalidates: &'static [Tag],
    ) -> Self {
        Self {
            name,
            method,
            kind: EndpointKind::Mutation,
            path,
            provides: &[],
            invalidates,
        }
    }

    /// Whether results may be cached.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self.kind, EndpointKind::Query)
    }
}

// =============================================================================
// Storefront endpoints
// =============================================================================

pub const REGISTER: Endpoint = Endpoint::mutation("register", HttpMethod::Post, "auth/register", &[]);
pub const LOGIN: Endpoint = Endpoint::mutation("login", HttpMethod::Post, "auth/login", &[Tag::User]);
pub const GOOGLE_LOGIN: &str = "auth/google";
pub const VERIFY_EMAIL: Endpoint =
    Endpoint::mutation("verifyEmail", HttpMethod::Get, "auth/verify-email", &[Tag::User]);
pub const FORGOT_PASSWORD: Endpoint =
    Endpoint::mutation("forgotPassword", HttpMethod::Post, "auth/forgot-password", &[]);
pub const RESET_PASSWORD: Endpoint =
    Endpoint::mutation("resetPassword", HttpMethod::Post, "auth/reset-password", &[]);
pub const VERIFY_AUTH: Endpoint =
    Endpoint::mutation("verifyAuth", HttpMethod::Get, "auth/verify-auth", &[]);
pub const LOGOUT: Endpoint = Endpoint::mutation("logout", HttpMethod::Get, "auth/logout", Tag::ALL);

pub const UPDATE_USER: Endpoint =
    Endpoint::mutation("updateUser", HttpMethod::Put, "users/profile/update", &[Tag::User]);

pub const ADD_PRODUCT: Endpoint =
    Endpoint::mutation("addProducts", HttpMethod::Post, "products", &[Tag::Product]);
pub const GET_PRODUCTS: Endpoint = Endpoint::query("getProducts", "products", &[Tag::Product]);
pub const GET_PRODUCT_BY_ID: Endpoint =
    Endpoint::query("getProductById", "products", &[Tag::Product]);
pub const GET_PRODUCTS_BY_SELLER: Endpoint =
    Endpoint::query("getProductBySellerId", "products/seller", &[Tag::Product]);
pub const DELETE_PRODUCT: Endpoint = Endpoint::mutation(
    "deleteProductById",
    HttpMethod::Delete,
    "products/seller",
    &[Tag::Product, Tag::Cart],
);

pub const GET_CART: Endpoint = Endpoint::query("getCart", "cart", &[Tag::Cart]);
pub const ADD_TO_CART: Endpoint =
    Endpoint::mutation("addToCart", HttpMethod::Post, "cart/add", &[Tag::Cart]);
pub const REMOVE_FROM_CART: Endpoint =
    Endpoint::mutation("removeFromCart", HttpMethod::Delete, "cart/remove", &[Tag::Cart]);

pub const GET_WISHLIST: Endpoint = Endpoint::query("getWishlist", "wishlist", &[Tag::Wishlist]);
pub const ADD_TO_WISHLIST: Endpoint =
    Endpoint::mutation("addToWishlist", HttpMethod::Post, "wishlist/add", &[Tag::Wishlist]);
pub const REMOVE_FROM_WISHLIST: Endpoint = Endpoint::mutation(
    "removeFromWishlist",
    HttpMethod::Delete,
    "wishlist/remove",
    &[Tag::Wishlist],
);

pub const GET_USER_ORDERS: Endpoint = Endpoint::query("getUserOrders", "orders", &[Tag::Order]);
pub const GET_ORDER_BY_ID: Endpoint = Endpoint::query("getOrderById", "orders", &[Tag::Order]);
pub const CREATE_ORDER: Endpoint = Endpoint::mutation(
    "createOrUpdateOrder",
    HttpMethod::Post,
    "orders",
    &[Tag::Order, Tag::Cart],
);
pub const UPDATE_ORDER: Endpoint = Endpoint::mutation(
    "createOrUpdateOrder",
    HttpMethod::Patch,
    "orders",
    &[Tag::Order, Tag::Cart],
);
pub const CREATE_RAZORPAY_PAYMENT: Endpoint = Endpoint::mutation(
    "createRazorpayPayment",
    HttpMethod::Post,
    "orders/payment-razorpay",
    &[],
);

pub const GET_ADDRESSES: Endpoint = Endpoint::query("getAddresses", "address", &[Tag::Address]);
pub const ADD_OR_UPDATE_ADDRESS: Endpoint = Endpoint::mutation(
    "addOrUpdateAddress",
    HttpMethod::Post,
    "address/create-or-update",
    &[Tag::Address],
);

// =============================================================================
// ApiRequest
// =============================================================================

/// An endpoint bound to its arguments.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    endpoint: Endpoint,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// A request with no arguments.
    #[must_use]
    pub const fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a path segment (an id or token).
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Set an already-built JSON body.
    #[must_use]
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Every path segment below the API URL: the base path then the arguments.
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.endpoint
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .chain(self.segments.iter().map(String::as_str))
    }

    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub const fn json_body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Cache key: endpoint name plus its arguments.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let mut key = format!("{}({})", self.endpoint.name, self.segments.join("/"));
        for (k, v) in &self.query {
            key.push_str(&format!("&{k}={v}"));
        }
        key
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segments_include_arguments() {
        let request = ApiRequest::new(REMOVE_FROM_CART).segment("p1");
        assert_eq!(
            request.path_segments().collect::<Vec<_>>(),
            vec!["cart", "remove", "p1"]
        );
    }

    #[test]
    fn test_cache_key_distinguishes_arguments() {
        let a = ApiRequest::new(GET_PRODUCT_BY_ID).segment("p1");
        let b = ApiRequest::new(GET_PRODUCT_BY_ID).segment("p2");
        let c = ApiRequest::new(GET_PRODUCT_BY_ID).segment("p1");
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), c.cache_key());
        assert_eq!(a.cache_key(), "getProductById(p1)");

        let paged = ApiRequest::new(GET_USER_ORDERS).query_param("page", 2);
        assert_eq!(paged.cache_key(), "getUserOrders()&page=2");
    }

    #[test]
    fn test_tag_table() {
        assert!(GET_CART.is_cached());
        assert!(!VERIFY_AUTH.is_cached());
        assert_eq!(LOGOUT.invalidates, Tag::ALL);
        assert_eq!(DELETE_PRODUCT.invalidates, &[Tag::Product, Tag::Cart]);
        assert_eq!(CREATE_ORDER.method, HttpMethod::Post);
        assert_eq!(UPDATE_ORDER.method, HttpMethod::Patch);
        assert_eq!(UPDATE_ORDER.invalidates, CREATE_ORDER.invalidates);
    }

    #[test]
    fn test_json_body() {
        let request = ApiRequest::new(ADD_TO_WISHLIST)
            .json(&serde_json::json!({"productId": "p1"}))
            .unwrap();
        assert_eq!(request.json_body().unwrap()["productId"], "p1");
    }
}
