//! HTTP implementation of [`PaymentProvider`] using reqwest.
//!
//! Requests go to `{api_base}/v1/...` with the secret key as a bearer token and
//! form-encoded bodies. Per-call [`RequestOptions`] become the `Stripe-Account` and
//! `Idempotency-Key` headers.

use std::sync::LazyLock;

use reqwest::{Client, Method, Request, header::CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    config::{DEFAULT_API_BASE, FacadeConfig, HttpConfig},
    error::{FacadeError, ProviderError, Result},
    form,
    models::{Charge, Coupon, Customer, Plan, Refund, Subscription},
    params::{ChargeParams, CustomerParams, RefundParams, RequestOptions, SubscriptionParams},
    provider::PaymentProvider,
};

const USER_AGENT: &str = concat!("payment-facade/", env!("CARGO_PKG_VERSION"));

const API_VERSION_HEADER: &str = "Stripe-Version";
const ACCOUNT_HEADER: &str = "Stripe-Account";
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";
const REQUEST_ID_HEADER: &str = "request-id";

/// Default HTTP client with connection pooling enabled.
///
/// Shared by every provider built with [`HttpProvider::new`].
#[allow(clippy::expect_used, reason = "default settings are known to be valid")]
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    build_client(&HttpConfig::default()).expect("Failed to create default HTTP client")
});

#[allow(clippy::expect_used, reason = "constant URL is known to be valid")]
static DEFAULT_API_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"));

fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(FacadeError::Http)
}

/// Rejects identifiers that would change the request target.
fn validate_id<'a>(kind: &str, id: &'a str) -> Result<&'a str> {
    if id.trim().is_empty() {
        return Err(FacadeError::Validation(format!("{kind} id cannot be empty")));
    }
    Ok(id)
}

/// Validates a header value for CRLF injection prevention.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if value.contains('\r') || value.contains('\n') || value.contains('\0') {
        return Err(FacadeError::Validation(format!(
            "invalid {name} value: control characters not allowed"
        )));
    }
    Ok(())
}

/// Payment provider client speaking the provider's HTTPS API.
///
/// Holds the credential for its own lifetime; nothing is stored process-wide, so several
/// providers with different keys can coexist.
///
/// # Examples
///
/// ```
/// use payment_facade::{config::FacadeConfig, provider::HttpProvider};
///
/// let default = HttpProvider::new("sk_test_123");
/// assert_eq!(default.api_base().as_str(), "https://api.stripe.com/");
///
/// let config = FacadeConfig::new("sk_test_123").with_api_version("2024-06-20");
/// let pinned = HttpProvider::from_config(&config).unwrap();
/// assert_eq!(pinned.api_version(), Some("2024-06-20"));
/// ```
#[derive(Debug)]
pub struct HttpProvider {
    client: Client,
    api_key: SecretString,
    api_base: Url,
    api_version: Option<String>,
}

impl HttpProvider {
    /// Creates a provider for the default API base with the given secret key.
    ///
    /// The key format is not checked; a rejected key fails the first request with an
    /// authentication error.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: DEFAULT_HTTP_CLIENT.clone(),
            api_key: SecretString::from(api_key.into()),
            api_base: DEFAULT_API_BASE_URL.clone(),
            api_version: None,
        }
    }

    /// Creates a provider from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Config`] if the configuration is invalid, or
    /// [`FacadeError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &FacadeConfig) -> Result<Self> {
        config.validate()?;

        let api_base = Url::parse(&config.api_base)
            .map_err(|e| FacadeError::Config(format!("invalid api_base: {e}")))?;

        Ok(Self {
            client: build_client(&config.http)?,
            api_key: config.secret(),
            api_base,
            api_version: config.api_version.clone(),
        })
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Returns the pinned API version, if any.
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Builds the full URL for `/v1/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                FacadeError::Config(format!("api_base cannot be a base: {}", self.api_base))
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    /// Builds an authenticated request without sending it.
    pub(crate) fn build_request<P: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        payload: Option<&P>,
        options: &RequestOptions,
    ) -> Result<Request> {
        let url = self.endpoint(segments)?;

        let mut request =
            self.client.request(method, url).bearer_auth(self.api_key.expose_secret());

        if let Some(version) = &self.api_version {
            validate_header(API_VERSION_HEADER, version)?;
            request = request.header(API_VERSION_HEADER, version);
        }
        if let Some(account) = &options.stripe_account {
            validate_header(ACCOUNT_HEADER, account)?;
            request = request.header(ACCOUNT_HEADER, account);
        }
        if let Some(key) = &options.idempotency_key {
            validate_header(IDEMPOTENCY_HEADER, key)?;
            request = request.header(IDEMPOTENCY_HEADER, key);
        }

        if let Some(payload) = payload {
            request = request
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(form::encode(payload)?);
        }

        request.build().map_err(FacadeError::Http)
    }

    /// Sends a request and decodes the JSON response.
    #[instrument(
        skip(self, request),
        fields(
            method = %request.method(),
            path = request.url().path(),
            request_id = tracing::field::Empty
        )
    )]
    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let response = self.client.execute(request).await?;

        let status = response.status();
        if let Some(request_id) =
            response.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok())
        {
            tracing::Span::current().record("request_id", request_id);
        }

        let body = response.bytes().await?;

        if !status.is_success() {
            let error = ProviderError::from_response(status.as_u16(), &body);
            warn!(
                status = error.status,
                kind = %error.kind,
                code = error.code.as_deref().unwrap_or(""),
                "provider rejected request"
            );
            return Err(error.into());
        }

        debug!(status = status.as_u16(), bytes = body.len(), "provider request succeeded");

        serde_json::from_slice(&body)
            .map_err(|e| FacadeError::Decode(format!("unexpected response body: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let request =
            self.build_request::<()>(Method::GET, segments, None, &RequestOptions::default())?;
        self.execute(request).await
    }

    async fn post<P, T>(&self, segments: &[&str], payload: &P, options: &RequestOptions) -> Result<T>
    where
        P: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(Method::POST, segments, Some(payload), options)?;
        self.execute(request).await
    }
}

impl Clone for HttpProvider {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            api_key: SecretString::from(self.api_key.expose_secret()),
            api_base: self.api_base.clone(),
            api_version: self.api_version.clone(),
        }
    }
}

impl PaymentProvider for HttpProvider {
    async fn retrieve_coupon<'a>(&'a self, coupon_id: &'a str) -> Result<Coupon> {
        self.get(&["coupons", validate_id("coupon", coupon_id)?]).await
    }

    async fn retrieve_plan<'a>(&'a self, plan_id: &'a str) -> Result<Plan> {
        self.get(&["plans", validate_id("plan", plan_id)?]).await
    }

    async fn create_customer<'a>(&'a self, params: &'a CustomerParams) -> Result<Customer> {
        self.post(&["customers"], params, &RequestOptions::default()).await
    }

    async fn create_subscription<'a>(
        &'a self,
        params: &'a SubscriptionParams,
    ) -> Result<Subscription> {
        self.post(&["subscriptions"], params, &RequestOptions::default()).await
    }

    async fn create_charge<'a>(
        &'a self,
        params: &'a ChargeParams,
        options: &'a RequestOptions,
    ) -> Result<Charge> {
        self.post(&["charges"], params, options).await
    }

    async fn create_refund<'a>(
        &'a self,
        params: &'a RefundParams,
        options: &'a RequestOptions,
    ) -> Result<Refund> {
        self.post(&["refunds"], params, options).await
    }
}
