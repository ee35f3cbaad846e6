//! Payment Facade: a typed front door to a Stripe-compatible payments API
//!
//! This crate wraps the five provider operations a subscription-and-checkout backend needs
//! behind one value, [`PaymentFacade`], and takes care of the parameter shaping those
//! calls require: defaults, optional fields that must be omitted rather than zeroed, and
//! coercion of loosely-typed input.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Backend code   │  checkout, billing, support tooling
//! └────────┬────────┘
//!          │ typed requests (ChargeRequest, RefundRequest, ...)
//! ┌────────▼────────────────────────────────────────┐
//! │            PaymentFacade (this crate)           │
//! │  ┌──────────────┐      ┌──────────────────┐     │
//! │  │  shaping &   │──────│ PaymentProvider  │     │
//! │  │  coercion    │      │ (HttpProvider)   │     │
//! │  └──────────────┘      └──────────────────┘     │
//! └────────┬────────────────────────────────────────┘
//!          │ HTTPS, form-encoded, bearer key
//! ┌────────▼────────┐
//! │ Payment provider│  /v1/coupons, /v1/plans, /v1/customers, ...
//! └─────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Look up a coupon and a plan
//!
//! ```rust,no_run
//! use payment_facade::PaymentFacade;
//!
//! # async fn example() -> payment_facade::Result<()> {
//! let facade = PaymentFacade::new("sk_test_123");
//!
//! let coupon = facade.retrieve_coupon("SAVE10").await?;
//! let plan = facade.retrieve_plan("plan_basic").await?;
//! println!("{} applies to {}", coupon.id, plan.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Subscribe a customer
//!
//! ```rust,no_run
//! use payment_facade::PaymentFacade;
//!
//! # async fn example() -> payment_facade::Result<()> {
//! let facade = PaymentFacade::new("sk_test_123");
//!
//! let customer = facade
//!     .subscribe_customer_to_plan("plan_basic", "tok_visa", "a@example.com", Some("SAVE10"))
//!     .await?;
//! println!("Customer: {}", customer.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## 3. Charge on behalf of a connected account, then refund
//!
//! ```rust,no_run
//! use payment_facade::{
//!     PaymentFacade,
//!     models::RefundReason,
//!     params::{ChargeRequest, RefundRequest},
//! };
//!
//! # async fn example() -> payment_facade::Result<()> {
//! let facade = PaymentFacade::new("sk_test_123");
//!
//! let charge = facade
//!     .create_charge(
//!         ChargeRequest::new(5_000, "usd", "tok_visa")
//!             .connected_account("acct_123")
//!             .application_fee(250)
//!             .description("Concert ticket"),
//!     )
//!     .await?;
//!
//! let refund = facade
//!     .refund_charge(
//!         RefundRequest::new(&charge.id)
//!             .amount(1_000)
//!             .reason(RefundReason::RequestedByCustomer)
//!             .metadata_entry("ticket", "T-77"),
//!     )
//!     .await?;
//! println!("Refunded {} of {}", refund.amount, charge.amount);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`facade`]: the [`PaymentFacade`] operations
//! - [`params`]: request payloads and the caller-facing request builders
//! - [`models`]: resources returned by the provider
//! - [`provider`]: the [`PaymentProvider`] client seam and its HTTP implementation
//! - [`coerce`]: integer and boolean coercion of loosely-typed input
//! - [`form`]: bracket-notation form encoding
//! - [`config`]: configuration from code, TOML, or the environment
//! - [`error`]: error types
//!
//! # Behavior Notes
//!
//! - Credentials are held by the facade instance, never in global state.
//! - Provider errors are returned unchanged; there are no retries.
//! - [`PaymentFacade::subscribe_customer_to_plan`] performs two requests. If the second
//!   fails, the customer created by the first one remains without a subscription.
//!
//! # Error Handling
//!
//! ```rust
//! use payment_facade::{FacadeError, PaymentFacade};
//!
//! # async fn example() {
//! let facade = PaymentFacade::new("sk_test_123");
//!
//! match facade.retrieve_coupon("SPRING").await {
//!     Ok(coupon) => println!("Found {}", coupon.id),
//!     Err(e) if e.is_not_found() => eprintln!("No such coupon"),
//!     Err(FacadeError::Provider(e)) => eprintln!("Provider error: {}", e.message),
//!     Err(FacadeError::Http(e)) => eprintln!("Network error: {e}"),
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod coerce;
pub mod config;
pub mod error;
pub mod facade;
pub mod form;
pub mod models;
pub mod params;
pub mod provider;

pub use config::FacadeConfig;
pub use error::{FacadeError, ProviderError, Result};
pub use facade::PaymentFacade;
pub use provider::{HttpProvider, PaymentProvider};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let facade = PaymentFacade::new("sk_test_exports");
        let provider: &HttpProvider = facade.provider();
        assert_eq!(provider.api_base().as_str(), "https://api.stripe.com/");

        let config = FacadeConfig::new("sk_test_exports");
        assert!(PaymentFacade::from_config(&config).is_ok());

        let error: FacadeError = ProviderError::from_response(404, b"").into();
        assert!(error.is_not_found());
        let result: Result<()> = Err(error);
        assert!(result.is_err());
    }
}
