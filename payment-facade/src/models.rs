//! Remote resources returned by the payment provider.
//!
//! These types are owned and persisted by the provider. Each model decodes the fields
//! the facade cares about and keeps everything else in `extra`, so a value read from the
//! provider can be handed to callers without losing any data.
//!
//! The provider always sends every field of a resource, using `null` for unset ones, so the
//! typed `Option` fields are always serialized: `None` becomes `null`. A provider document
//! re-serializes to the same JSON, nulls included.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FacadeError;

/// Discount that can be applied to a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon identifier.
    pub id: String,
    /// Fixed discount in minor currency units.
    #[serde(default)]
    pub amount_off: Option<i64>,
    /// Percentage discount.
    #[serde(default)]
    pub percent_off: Option<f64>,
    /// Whether the coupon can still be redeemed.
    #[serde(default)]
    pub valid: Option<bool>,
    /// Remaining fields as returned by the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Recurring price a customer can subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier.
    pub id: String,
    /// Price per interval in minor currency units.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Three-letter ISO currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Billing interval (`day`, `week`, `month`, `year`).
    #[serde(default)]
    pub interval: Option<String>,
    /// Remaining fields as returned by the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Customer record created when subscribing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier.
    pub id: String,
    /// Customer email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Remaining fields as returned by the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Subscription linking a customer to a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription identifier.
    pub id: String,
    /// Owning customer identifier.
    #[serde(default)]
    pub customer: Option<String>,
    /// Subscription status (`active`, `trialing`, `incomplete`, ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Remaining fields as returned by the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a charge request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Charge identifier.
    pub id: String,
    /// Charged amount in minor currency units.
    pub amount: i64,
    /// Three-letter ISO currency code.
    pub currency: String,
    /// Whether the charge succeeded.
    #[serde(default)]
    pub paid: Option<bool>,
    /// Amount refunded so far.
    #[serde(default)]
    pub amount_refunded: Option<i64>,
    /// Charge description.
    #[serde(default)]
    pub description: Option<String>,
    /// Remaining fields as returned by the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a refund request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    /// Refund identifier.
    pub id: String,
    /// Refunded amount in minor currency units.
    pub amount: i64,
    /// Refunded charge identifier.
    #[serde(default)]
    pub charge: Option<String>,
    /// Reason given for the refund, as reported by the provider.
    #[serde(default)]
    pub reason: Option<String>,
    /// Refund status (`pending`, `succeeded`, `failed`, ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Metadata attached to the refund.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Remaining fields as returned by the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reason recorded with a refund.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    /// The customer asked for the refund.
    #[default]
    RequestedByCustomer,
    /// The charge was a duplicate.
    Duplicate,
    /// The charge was fraudulent.
    Fraudulent,
}

impl RefundReason {
    /// Returns the wire name of this reason.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestedByCustomer => "requested_by_customer",
            Self::Duplicate => "duplicate",
            Self::Fraudulent => "fraudulent",
        }
    }
}

impl fmt::Display for RefundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundReason {
    type Err = FacadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested_by_customer" => Ok(Self::RequestedByCustomer),
            "duplicate" => Ok(Self::Duplicate),
            "fraudulent" => Ok(Self::Fraudulent),
            other => Err(FacadeError::Validation(format!(
                "unknown refund reason '{other}', expected one of: \
                 requested_by_customer, duplicate, fraudulent"
            ))),
        }
    }
}

/// Customer and subscription created by a single enrollment.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    /// The created customer.
    pub customer: Customer,
    /// The subscription linking the customer to the plan.
    pub subscription: Subscription,
}
