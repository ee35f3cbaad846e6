//! Payment provider client abstraction.
//!
//! [`PaymentProvider`] is the seam between the facade's parameter shaping and the remote
//! API. The facade only depends on this request/response contract; [`HttpProvider`] is the
//! production implementation speaking the provider's HTTPS API.
//!
//! # Examples
//!
//! ```rust,no_run
//! use payment_facade::provider::{HttpProvider, PaymentProvider};
//!
//! # async fn example() -> payment_facade::error::Result<()> {
//! let provider = HttpProvider::new("sk_test_123");
//! let coupon = provider.retrieve_coupon("SAVE10").await?;
//! println!("Coupon: {}", coupon.id);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::{
    error::Result,
    models::{Charge, Coupon, Customer, Plan, Refund, Subscription},
    params::{ChargeParams, CustomerParams, RefundParams, RequestOptions, SubscriptionParams},
};

pub mod http;

pub use http::HttpProvider;

/// Remote operations offered by the payment provider.
///
/// Every method issues exactly one request. Errors reported by the provider surface as
/// [`FacadeError::Provider`](crate::error::FacadeError::Provider); implementations do not
/// retry.
pub trait PaymentProvider: Send + Sync {
    /// Looks up a coupon by id.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the coupon does not exist.
    fn retrieve_coupon<'a>(
        &'a self,
        coupon_id: &'a str,
    ) -> impl Future<Output = Result<Coupon>> + Send + 'a;

    /// Looks up a plan by id.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the plan does not exist.
    fn retrieve_plan<'a>(
        &'a self,
        plan_id: &'a str,
    ) -> impl Future<Output = Result<Plan>> + Send + 'a;

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the payment token is invalid or already used.
    fn create_customer<'a>(
        &'a self,
        params: &'a CustomerParams,
    ) -> impl Future<Output = Result<Customer>> + Send + 'a;

    /// Creates a subscription.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the customer, plan or coupon is invalid.
    fn create_subscription<'a>(
        &'a self,
        params: &'a SubscriptionParams,
    ) -> impl Future<Output = Result<Subscription>> + Send + 'a;

    /// Creates a charge, optionally on behalf of a connected account.
    ///
    /// # Errors
    ///
    /// Returns a provider error on an invalid token or account, or a declined payment.
    fn create_charge<'a>(
        &'a self,
        params: &'a ChargeParams,
        options: &'a RequestOptions,
    ) -> impl Future<Output = Result<Charge>> + Send + 'a;

    /// Creates a refund.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the charge is unknown or already fully refunded.
    fn create_refund<'a>(
        &'a self,
        params: &'a RefundParams,
        options: &'a RequestOptions,
    ) -> impl Future<Output = Result<Refund>> + Send + 'a;
}
