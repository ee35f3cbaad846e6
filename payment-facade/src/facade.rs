//! The payment facade.
//!
//! [`PaymentFacade`] owns one credential (inside its provider) and exposes the operations
//! the application needs. Each operation shapes its input into a provider payload and
//! forwards it; provider errors are returned unchanged.

use tracing::{info, instrument, warn};

use crate::{
    config::FacadeConfig,
    error::Result,
    models::{Charge, Coupon, Customer, Enrollment, Plan, Refund},
    params::{ChargeRequest, CustomerParams, RefundRequest, SubscriptionParams},
    provider::{HttpProvider, PaymentProvider},
};

/// Typed entry point to the payment provider.
///
/// The facade is `Send + Sync` when its provider is, and can be shared across tasks
/// behind an `Arc`.
///
/// # Examples
///
/// ```rust,no_run
/// use payment_facade::{PaymentFacade, params::ChargeRequest};
///
/// # async fn example() -> payment_facade::Result<()> {
/// let facade = PaymentFacade::new("sk_test_123");
///
/// let customer = facade
///     .subscribe_customer_to_plan("plan_basic", "tok_visa", "a@example.com", None)
///     .await?;
/// println!("Subscribed customer {}", customer.id);
///
/// let charge = facade
///     .create_charge(ChargeRequest::new(2_000, "usd", "tok_visa").description("T-shirt"))
///     .await?;
/// println!("Charge {} for {} {}", charge.id, charge.amount, charge.currency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PaymentFacade<P = HttpProvider> {
    provider: P,
}

impl PaymentFacade<HttpProvider> {
    /// Creates a facade talking to the default API base with the given secret key.
    ///
    /// The key is not validated; a rejected key surfaces on the first remote call.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_provider(HttpProvider::new(api_key))
    }

    /// Creates a facade from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::Config`](crate::FacadeError::Config) if the configuration is
    /// invalid.
    pub fn from_config(config: &FacadeConfig) -> Result<Self> {
        HttpProvider::from_config(config).map(Self::with_provider)
    }
}

impl<P: PaymentProvider> PaymentFacade<P> {
    /// Creates a facade over an arbitrary provider client.
    #[must_use]
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    /// Returns the underlying provider client.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Looks up a coupon.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the coupon does not exist.
    #[instrument(skip(self))]
    pub async fn retrieve_coupon(&self, coupon_id: &str) -> Result<Coupon> {
        self.provider.retrieve_coupon(coupon_id).await
    }

    /// Looks up a plan.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the plan does not exist.
    #[instrument(skip(self))]
    pub async fn retrieve_plan(&self, plan_id: &str) -> Result<Plan> {
        self.provider.retrieve_plan(plan_id).await
    }

    /// Creates a customer from a payment token and subscribes it to a plan.
    ///
    /// Returns the created customer. The subscription is created but not returned; use
    /// [`enroll_customer_in_plan`](Self::enroll_customer_in_plan) when it is needed.
    ///
    /// An empty `coupon_id` is treated as no coupon.
    ///
    /// # Errors
    ///
    /// Returns the provider error of whichever call fails. If the subscription fails
    /// after the customer was created, the customer is left in place without a
    /// subscription; nothing is rolled back.
    #[instrument(skip(self, payment_token, customer_email))]
    pub async fn subscribe_customer_to_plan(
        &self,
        plan_id: &str,
        payment_token: &str,
        customer_email: &str,
        coupon_id: Option<&str>,
    ) -> Result<Customer> {
        self.enroll_customer_in_plan(plan_id, payment_token, customer_email, coupon_id)
            .await
            .map(|enrollment| enrollment.customer)
    }

    /// Creates a customer and subscribes it to a plan, returning both.
    ///
    /// Same requests and failure behavior as
    /// [`subscribe_customer_to_plan`](Self::subscribe_customer_to_plan).
    ///
    /// # Errors
    ///
    /// Returns the provider error of whichever call fails.
    #[instrument(skip(self, payment_token, customer_email))]
    pub async fn enroll_customer_in_plan(
        &self,
        plan_id: &str,
        payment_token: &str,
        customer_email: &str,
        coupon_id: Option<&str>,
    ) -> Result<Enrollment> {
        let customer_params = CustomerParams {
            source: payment_token.to_owned(),
            email: customer_email.to_owned(),
        };
        let customer = self.provider.create_customer(&customer_params).await?;

        let subscription_params = SubscriptionParams::new(customer.id.as_str(), plan_id, coupon_id);
        let subscription = match self.provider.create_subscription(&subscription_params).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(
                    customer_id = %customer.id,
                    error = %e,
                    "subscription failed after customer was created; customer left without subscription"
                );
                return Err(e);
            }
        };

        info!(customer_id = %customer.id, subscription_id = %subscription.id, "customer subscribed");
        Ok(Enrollment { customer, subscription })
    }

    /// Creates a charge.
    ///
    /// The application fee is only sent when it coerced to a positive integer, and a
    /// connected account is passed as a per-request option rather than a payload field.
    ///
    /// # Errors
    ///
    /// Returns a provider error on an invalid token or account, or a declined payment.
    #[instrument(skip(self, request), fields(amount = request.amount(), currency = request.currency()))]
    pub async fn create_charge(&self, request: ChargeRequest) -> Result<Charge> {
        let (params, options) = request.into_parts();
        let charge = self.provider.create_charge(&params, &options).await?;

        info!(charge_id = %charge.id, "charge created");
        Ok(charge)
    }

    /// Refunds a charge, fully or partially.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the charge is unknown or already fully refunded.
    #[instrument(skip(self, request), fields(charge_id = request.charge_id()))]
    pub async fn refund_charge(&self, request: RefundRequest) -> Result<Refund> {
        let (params, options) = request.into_parts();
        let refund = self.provider.create_refund(&params, &options).await?;

        info!(refund_id = %refund.id, amount = refund.amount, "charge refunded");
        Ok(refund)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_http_provider() {
        let facade = PaymentFacade::new("sk_test_1");
        assert_eq!(facade.provider().api_base().as_str(), "https://api.stripe.com/");
    }

    #[test]
    fn test_from_config() {
        let config = FacadeConfig::new("sk_test_1").with_api_base("http://localhost:12111");
        let facade = PaymentFacade::from_config(&config).unwrap();
        assert_eq!(facade.provider().api_base().as_str(), "http://localhost:12111/");
    }

    #[test]
    fn test_from_config_invalid() {
        let config = FacadeConfig::new("sk_test_1").with_api_base("ftp://example.com");
        assert!(PaymentFacade::from_config(&config).is_err());
    }

    #[test]
    fn test_facade_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PaymentFacade>();
    }
}
