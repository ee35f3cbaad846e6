//! Coercion of loosely-typed caller input.
//!
//! Callers of the facade frequently forward values straight from form posts or JSON, so
//! an application fee may arrive as `"250"`, `250.9` or `0`. The facade accepts anything
//! implementing [`IntValue`] or [`BoolValue`] and coerces it the same way regardless of the
//! source type:
//!
//! - integer cast: floats truncate toward zero, strings parse their leading integer prefix
//!   (`"12abc"` is 12, `"abc"` is 0), booleans map to 0/1. Strings are read as decimal
//!   digits only: there is no exponent or fraction handling, so `"1e3"` is 1 and `"12.9"`
//!   is 12.
//! - boolean cast: zero, empty strings and `"0"` are false, everything else is true
//!
//! # Examples
//!
//! ```
//! use payment_facade::coerce::{BoolValue, IntValue, application_fee};
//!
//! assert_eq!("250".int_value(), 250);
//! assert_eq!(99.9_f64.int_value(), 99);
//! assert!(1_i32.bool_value());
//! assert!(!"0".bool_value());
//!
//! assert_eq!(application_fee(150.7), Some(150));
//! assert_eq!(application_fee(-5), None);
//! assert_eq!(application_fee("free"), None);
//! ```

/// Integer cast of a loosely-typed value.
pub trait IntValue {
    /// Returns the value as an integer.
    fn int_value(&self) -> i64;
}

/// Boolean cast of a loosely-typed value.
pub trait BoolValue {
    /// Returns the value as a boolean.
    fn bool_value(&self) -> bool;
}

macro_rules! impl_lossless_int {
    ($($t:ty),*) => {
        $(
            impl IntValue for $t {
                fn int_value(&self) -> i64 {
                    i64::from(*self)
                }
            }

            impl BoolValue for $t {
                fn bool_value(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

macro_rules! impl_saturating_int {
    ($($t:ty),*) => {
        $(
            impl IntValue for $t {
                fn int_value(&self) -> i64 {
                    i64::try_from(*self).unwrap_or(if *self > 0 { i64::MAX } else { i64::MIN })
                }
            }

            impl BoolValue for $t {
                fn bool_value(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

impl_lossless_int!(i8, i16, i32, i64, u8, u16, u32);
impl_saturating_int!(i128, isize, u64, u128, usize);

impl IntValue for f64 {
    #[allow(clippy::cast_possible_truncation, reason = "saturating float cast is the intent")]
    fn int_value(&self) -> i64 {
        // `as` truncates toward zero, saturates at the bounds and maps NaN to 0.
        *self as i64
    }
}

impl BoolValue for f64 {
    fn bool_value(&self) -> bool {
        *self != 0.0
    }
}

impl IntValue for f32 {
    fn int_value(&self) -> i64 {
        f64::from(*self).int_value()
    }
}

impl BoolValue for f32 {
    fn bool_value(&self) -> bool {
        *self != 0.0
    }
}

impl IntValue for bool {
    fn int_value(&self) -> i64 {
        i64::from(*self)
    }
}

impl BoolValue for bool {
    fn bool_value(&self) -> bool {
        *self
    }
}

impl IntValue for str {
    fn int_value(&self) -> i64 {
        let trimmed = self.trim_start();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let mut value: i64 = 0;
        for byte in digits.bytes().take_while(u8::is_ascii_digit) {
            let digit = i64::from(byte - b'0');
            value = value.saturating_mul(10);
            value = if negative { value.saturating_sub(digit) } else { value.saturating_add(digit) };
        }
        value
    }
}

impl BoolValue for str {
    fn bool_value(&self) -> bool {
        !(self.is_empty() || self == "0")
    }
}

impl IntValue for String {
    fn int_value(&self) -> i64 {
        self.as_str().int_value()
    }
}

impl BoolValue for String {
    fn bool_value(&self) -> bool {
        self.as_str().bool_value()
    }
}

impl<T: IntValue + ?Sized> IntValue for &T {
    fn int_value(&self) -> i64 {
        (**self).int_value()
    }
}

impl<T: BoolValue + ?Sized> BoolValue for &T {
    fn bool_value(&self) -> bool {
        (**self).bool_value()
    }
}

impl<T: IntValue> IntValue for Option<T> {
    fn int_value(&self) -> i64 {
        self.as_ref().map_or(0, IntValue::int_value)
    }
}

impl<T: BoolValue> BoolValue for Option<T> {
    fn bool_value(&self) -> bool {
        self.as_ref().is_some_and(BoolValue::bool_value)
    }
}

/// Coerces an application fee argument.
///
/// Returns the integer fee only when it is strictly positive. Zero, negative and
/// non-numeric values yield `None` so the field is left out of the request entirely.
#[must_use]
pub fn application_fee<T: IntValue>(value: T) -> Option<i64> {
    let fee = value.int_value();
    (fee > 0).then_some(fee)
}

/// Coerces a refund amount argument.
///
/// A truthy amount is forwarded as its integer value. A falsy amount, or one whose integer
/// value is zero (`0.5`, `"abc"`), means "refund the full charge" and yields `None`.
#[must_use]
pub fn refund_amount<T: IntValue + BoolValue>(value: T) -> Option<i64> {
    value.bool_value().then(|| value.int_value()).filter(|amount| *amount != 0)
}
