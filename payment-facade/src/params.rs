//! Request payloads sent to the payment provider.
//!
//! Payload structs mirror the provider's parameter names one to one. Optional fields are
//! `Option` and left out of the encoded request when `None`; they are never sent as zero or
//! empty. Per-call routing (connected account, idempotency key) lives in
//! [`RequestOptions`] and is transmitted as headers, never inside a payload.
//!
//! [`ChargeRequest`] and [`RefundRequest`] are the caller-facing builders. They apply the
//! facade's defaults and coercions and produce the final payloads.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    coerce::{self, BoolValue, IntValue},
    models::RefundReason,
};

/// Payload for creating a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerParams {
    /// Payment token to attach as the customer's default source.
    pub source: String,
    /// Customer email address.
    pub email: String,
}

/// Payload for creating a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionParams {
    /// Customer identifier.
    pub customer: String,
    /// Plan identifier.
    pub plan: String,
    /// Coupon identifier, sent only when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

impl SubscriptionParams {
    /// Creates a subscription payload. An empty coupon id is treated as no coupon.
    #[must_use]
    pub fn new(customer: impl Into<String>, plan: impl Into<String>, coupon: Option<&str>) -> Self {
        Self {
            customer: customer.into(),
            plan: plan.into(),
            coupon: coupon.filter(|c| !c.is_empty()).map(str::to_owned),
        }
    }
}

/// Payload for creating a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeParams {
    /// Amount in minor currency units.
    pub amount: i64,
    /// Three-letter ISO currency code.
    pub currency: String,
    /// Payment token.
    pub source: String,
    /// Charge description. Always sent, empty when the caller gave none.
    pub description: String,
    /// Platform fee in minor units, sent only when strictly positive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_fee: Option<i64>,
}

/// Payload for creating a refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundParams {
    /// Charge to refund.
    pub charge: String,
    /// Amount to refund. The provider refunds the full charge when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Arbitrary key/value metadata. Always sent, possibly empty.
    pub metadata: BTreeMap<String, String>,
    /// Refund reason.
    pub reason: RefundReason,
    /// Whether the application fee is refunded as well.
    pub refund_application_fee: bool,
    /// Whether the transfer to the connected account is reversed.
    pub reverse_transfer: bool,
}

/// Per-call request options, sent as headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Connected account the request acts on behalf of.
    pub stripe_account: Option<String>,
    /// Idempotency key for safely repeating a creation request.
    pub idempotency_key: Option<String>,
}

impl RequestOptions {
    /// Options scoped to a connected account. Empty ids yield no scoping.
    #[must_use]
    pub fn for_account(account_id: Option<&str>) -> Self {
        Self {
            stripe_account: account_id.filter(|a| !a.is_empty()).map(str::to_owned),
            idempotency_key: None,
        }
    }

    /// Sets the idempotency key. Empty keys are ignored.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.idempotency_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Returns true if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stripe_account.is_none() && self.idempotency_key.is_none()
    }
}

/// Caller input for a charge.
///
/// # Examples
///
/// ```
/// use payment_facade::params::ChargeRequest;
///
/// let (params, options) = ChargeRequest::new(2_000, "usd", "tok_visa")
///     .connected_account("acct_123")
///     .application_fee("150")
///     .description("Order #42")
///     .into_parts();
///
/// assert_eq!(params.application_fee, Some(150));
/// assert_eq!(options.stripe_account.as_deref(), Some("acct_123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    amount: i64,
    currency: String,
    payment_token: String,
    connected_account: Option<String>,
    application_fee: Option<i64>,
    description: Option<String>,
    idempotency_key: Option<String>,
}

impl ChargeRequest {
    /// Starts a charge of `amount` minor units paid with `payment_token`.
    #[must_use]
    pub fn new(amount: i64, currency: impl Into<String>, payment_token: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            payment_token: payment_token.into(),
            connected_account: None,
            application_fee: None,
            description: None,
            idempotency_key: None,
        }
    }

    /// Attributes the charge to a connected account.
    #[must_use]
    pub fn connected_account(mut self, account_id: impl Into<String>) -> Self {
        self.connected_account = Some(account_id.into());
        self
    }

    /// Sets the platform fee. Values that do not coerce to a positive integer are dropped.
    #[must_use]
    pub fn application_fee<T: IntValue>(mut self, fee: T) -> Self {
        self.application_fee = coerce::application_fee(fee);
        self
    }

    /// Sets the charge description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets an idempotency key for the request.
    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Splits the request into the payload and the per-call options.
    #[must_use]
    pub fn into_parts(self) -> (ChargeParams, RequestOptions) {
        let mut options = RequestOptions::for_account(self.connected_account.as_deref());
        if let Some(key) = self.idempotency_key {
            options = options.with_idempotency_key(key);
        }

        let params = ChargeParams {
            amount: self.amount,
            currency: self.currency,
            source: self.payment_token,
            description: self.description.unwrap_or_default(),
            application_fee: self.application_fee,
        };

        (params, options)
    }
}

/// Caller input for a refund.
///
/// Defaults: full refund, empty metadata, reason `requested_by_customer`, application fee
/// refunded, transfer not reversed.
///
/// # Examples
///
/// ```
/// use payment_facade::{models::RefundReason, params::RefundRequest};
///
/// let (params, _) = RefundRequest::new("ch_123")
///     .amount(500)
///     .reason(RefundReason::Duplicate)
///     .reverse_transfer(1)
///     .into_parts();
///
/// assert_eq!(params.amount, Some(500));
/// assert!(params.refund_application_fee);
/// assert!(params.reverse_transfer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    charge_id: String,
    amount: Option<i64>,
    metadata: BTreeMap<String, String>,
    reason: RefundReason,
    refund_application_fee: bool,
    reverse_transfer: bool,
    idempotency_key: Option<String>,
}

impl RefundRequest {
    /// Starts a full refund of `charge_id` with default options.
    #[must_use]
    pub fn new(charge_id: impl Into<String>) -> Self {
        Self {
            charge_id: charge_id.into(),
            amount: None,
            metadata: BTreeMap::new(),
            reason: RefundReason::default(),
            refund_application_fee: true,
            reverse_transfer: false,
            idempotency_key: None,
        }
    }

    /// Sets a partial amount. Falsy amounts keep the full-refund default.
    #[must_use]
    pub fn amount<T: IntValue + BoolValue>(mut self, amount: T) -> Self {
        self.amount = coerce::refund_amount(amount);
        self
    }

    /// Replaces the metadata.
    #[must_use]
    pub fn metadata<I, K, V>(mut self, metadata: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata = metadata.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Adds one metadata entry.
    #[must_use]
    pub fn metadata_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the refund reason.
    #[must_use]
    pub fn reason(mut self, reason: RefundReason) -> Self {
        self.reason = reason;
        self
    }

    /// Sets whether the application fee is refunded.
    #[must_use]
    pub fn refund_application_fee<T: BoolValue>(mut self, value: T) -> Self {
        self.refund_application_fee = value.bool_value();
        self
    }

    /// Sets whether the connected-account transfer is reversed.
    #[must_use]
    pub fn reverse_transfer<T: BoolValue>(mut self, value: T) -> Self {
        self.reverse_transfer = value.bool_value();
        self
    }

    /// Sets an idempotency key for the request.
    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Returns the charge being refunded.
    #[must_use]
    pub fn charge_id(&self) -> &str {
        &self.charge_id
    }

    /// Splits the request into the payload and the per-call options.
    #[must_use]
    pub fn into_parts(self) -> (RefundParams, RequestOptions) {
        let options = match self.idempotency_key {
            Some(key) => RequestOptions::default().with_idempotency_key(key),
            None => RequestOptions::default(),
        };

        let params = RefundParams {
            charge: self.charge_id,
            amount: self.amount,
            metadata: self.metadata,
            reason: self.reason,
            refund_application_fee: self.refund_application_fee,
            reverse_transfer: self.reverse_transfer,
        };

        (params, options)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_subscription_params_skip_empty_coupon() {
        let params = SubscriptionParams::new("cus_1", "plan_basic", Some(""));
        assert!(params.coupon.is_none());
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"customer": "cus_1", "plan": "plan_basic"})
        );
    }

    #[test]
    fn test_subscription_params_with_coupon() {
        let params = SubscriptionParams::new("cus_1", "plan_basic", Some("SAVE10"));
        assert_eq!(serde_json::to_value(&params).unwrap()["coupon"], json!("SAVE10"));
    }

    #[test]
    fn test_charge_defaults() {
        let (params, options) = ChargeRequest::new(1_000, "eur", "tok_visa").into_parts();

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"amount": 1000, "currency": "eur", "source": "tok_visa", "description": ""})
        );
        assert!(options.is_empty());
    }

    #[test]
    fn test_charge_fee_zero_is_omitted() {
        let (params, _) = ChargeRequest::new(1_000, "usd", "tok").application_fee(0).into_parts();
        let value = serde_json::to_value(&params).unwrap();
        assert!(value.get("application_fee").is_none());
    }

    #[test]
    fn test_charge_fee_non_numeric_is_omitted() {
        let (params, _) =
            ChargeRequest::new(1_000, "usd", "tok").application_fee("none").into_parts();
        assert!(params.application_fee.is_none());
    }

    #[test]
    fn test_charge_fee_float_is_floored() {
        let (params, _) = ChargeRequest::new(1_000, "usd", "tok").application_fee(99.99).into_parts();
        assert_eq!(params.application_fee, Some(99));
    }

    #[test]
    fn test_charge_connected_account_goes_to_options() {
        let (params, options) =
            ChargeRequest::new(1_000, "usd", "tok").connected_account("acct_9").into_parts();

        assert_eq!(options.stripe_account.as_deref(), Some("acct_9"));
        let value = serde_json::to_value(&params).unwrap();
        let body = value.as_object().unwrap();
        assert!(body.values().all(|v| v != &json!("acct_9")));
        assert!(!body.contains_key("stripe_account"));
    }

    #[test]
    fn test_charge_empty_connected_account_is_ignored() {
        let (_, options) =
            ChargeRequest::new(1_000, "usd", "tok").connected_account("").into_parts();
        assert!(options.stripe_account.is_none());
    }

    #[test]
    fn test_charge_accessors_and_idempotency_key() {
        let request = ChargeRequest::new(750, "gbp", "tok").idempotency_key("order-42");
        assert_eq!(request.amount(), 750);
        assert_eq!(request.currency(), "gbp");

        let (_, options) = request.into_parts();
        assert_eq!(options.idempotency_key.as_deref(), Some("order-42"));
    }

    #[test]
    fn test_refund_defaults() {
        let (params, options) = RefundRequest::new("ch_1").into_parts();

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "charge": "ch_1",
                "metadata": {},
                "reason": "requested_by_customer",
                "refund_application_fee": true,
                "reverse_transfer": false
            })
        );
        assert!(options.is_empty());
    }

    #[test]
    fn test_refund_zero_amount_means_full_refund() {
        let (params, _) = RefundRequest::new("ch_1").amount(0).into_parts();
        assert!(params.amount.is_none());

        let (params, _) = RefundRequest::new("ch_1").amount("").into_parts();
        assert!(params.amount.is_none());

        for (params, _) in [
            RefundRequest::new("ch_1").amount(0.5).into_parts(),
            RefundRequest::new("ch_1").amount("abc").into_parts(),
            RefundRequest::new("ch_1").amount("0.0").into_parts(),
        ] {
            let value = serde_json::to_value(&params).unwrap();
            assert!(value.get("amount").is_none(), "amount sent: {value}");
        }
    }

    #[test]
    fn test_refund_flags_are_coerced() {
        let (params, _) = RefundRequest::new("ch_1")
            .refund_application_fee(0)
            .reverse_transfer("yes")
            .into_parts();

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["refund_application_fee"], Value::Bool(false));
        assert_eq!(value["reverse_transfer"], Value::Bool(true));
    }

    #[test]
    fn test_refund_metadata() {
        let (params, _) = RefundRequest::new("ch_1")
            .metadata([("ticket", "T-1")])
            .metadata_entry("agent", "ops")
            .into_parts();

        assert_eq!(params.metadata.len(), 2);
        assert_eq!(params.metadata["ticket"], "T-1");
        assert_eq!(params.metadata["agent"], "ops");
    }

    #[test]
    fn test_request_options_empty_idempotency_key_ignored() {
        let options = RequestOptions::default().with_idempotency_key("");
        assert!(options.is_empty());
    }

    proptest! {
        #[test]
        fn test_refund_flags_always_present_and_boolean(fee in any::<i64>(), reverse in any::<i64>()) {
            let (params, _) = RefundRequest::new("ch_1")
                .refund_application_fee(fee)
                .reverse_transfer(reverse)
                .into_parts();
            let value = serde_json::to_value(&params).unwrap();

            prop_assert_eq!(&value["refund_application_fee"], &Value::Bool(fee != 0));
            prop_assert_eq!(&value["reverse_transfer"], &Value::Bool(reverse != 0));
        }

        #[test]
        fn test_refund_amount_field_never_zero(amount in -1.0e6_f64..1.0e6) {
            let (params, _) = RefundRequest::new("ch_1").amount(amount).into_parts();
            let value = serde_json::to_value(&params).unwrap();

            #[allow(clippy::cast_possible_truncation, reason = "range is well inside i64")]
            let expected = amount.trunc() as i64;
            if expected == 0 {
                prop_assert!(value.get("amount").is_none());
            } else {
                prop_assert_eq!(&value["amount"], &json!(expected));
            }
        }

        #[test]
        fn test_charge_fee_field_matches_threshold(fee in any::<i64>()) {
            let (params, _) = ChargeRequest::new(100, "usd", "tok").application_fee(fee).into_parts();
            let value = serde_json::to_value(&params).unwrap();

            if fee > 0 {
                prop_assert_eq!(&value["application_fee"], &json!(fee));
            } else {
                prop_assert!(value.get("application_fee").is_none());
            }
        }
    }
}
