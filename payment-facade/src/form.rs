//! Form encoding of request payloads.
//!
//! The provider accepts `application/x-www-form-urlencoded` bodies and expresses nesting
//! with brackets: `metadata[order_id]=42`, `items[0][price]=price_1`. Payloads are first
//! serialized to a JSON tree and then flattened into key/value pairs.
//!
//! Encoding rules:
//! - `null` values are skipped
//! - booleans are `true` / `false`
//! - empty maps and lists are sent as an empty value (`metadata=`)
//! - keys appear in lexicographic order within each level

use serde::Serialize;
use serde_json::Value;

use crate::error::{FacadeError, Result};

/// Flattens a payload into form key/value pairs.
///
/// # Errors
///
/// Returns [`FacadeError::Validation`] if the payload cannot be serialized or is not a
/// JSON object at the top level.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use payment_facade::form::to_pairs;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Payload {
///     charge: &'static str,
///     metadata: BTreeMap<&'static str, &'static str>,
/// }
///
/// let payload = Payload { charge: "ch_1", metadata: BTreeMap::from([("order", "42")]) };
/// let pairs = to_pairs(&payload).unwrap();
///
/// assert_eq!(
///     pairs,
///     vec![
///         ("charge".to_owned(), "ch_1".to_owned()),
///         ("metadata[order]".to_owned(), "42".to_owned()),
///     ]
/// );
/// ```
pub fn to_pairs<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(payload)
        .map_err(|e| FacadeError::Validation(format!("cannot encode request payload: {e}")))?;

    let Value::Object(fields) = value else {
        return Err(FacadeError::Validation("request payload must be an object".to_owned()));
    };

    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        flatten(key, value, &mut pairs);
    }
    Ok(pairs)
}

/// Encodes a payload as an `application/x-www-form-urlencoded` string.
///
/// # Errors
///
/// Same as [`to_pairs`].
pub fn encode<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    let pairs = to_pairs(payload)?;
    Ok(url::form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish())
}

fn flatten(key: String, value: Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, b.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s)),
        Value::Array(items) if items.is_empty() => pairs.push((key, String::new())),
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                flatten(format!("{key}[{index}]"), item, pairs);
            }
        }
        Value::Object(map) if map.is_empty() => pairs.push((key, String::new())),
        Value::Object(map) => {
            for (child, item) in map {
                flatten(format!("{key}[{child}]"), item, pairs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::params::{ChargeRequest, RefundRequest};

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_owned(), v.to_owned())
    }

    #[test]
    fn test_scalars() {
        let pairs = to_pairs(&json!({"amount": 500, "paid": true, "note": "hi", "gone": null}))
            .unwrap();
        assert_eq!(pairs, vec![pair("amount", "500"), pair("note", "hi"), pair("paid", "true")]);
    }

    #[test]
    fn test_nested_map_and_list() {
        let pairs = to_pairs(&json!({
            "metadata": {"b": "2", "a": "1"},
            "items": [{"price": "p_1"}, {"price": "p_2"}]
        }))
        .unwrap();

        assert_eq!(
            pairs,
            vec![
                pair("items[0][price]", "p_1"),
                pair("items[1][price]", "p_2"),
                pair("metadata[a]", "1"),
                pair("metadata[b]", "2"),
            ]
        );
    }

    #[test]
    fn test_empty_map_is_sent_blank() {
        let pairs = to_pairs(&json!({"metadata": {}, "tags": []})).unwrap();
        assert_eq!(pairs, vec![pair("metadata", ""), pair("tags", "")]);
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let result = to_pairs(&json!(["not", "an", "object"]));
        assert!(matches!(result, Err(FacadeError::Validation(_))));
    }

    #[test]
    fn test_encode_percent_escapes() {
        let body = encode(&json!({"description": "Order #42 & more", "metadata": {"k y": "v"}}))
            .unwrap();
        assert_eq!(body, "description=Order+%2342+%26+more&metadata%5Bk+y%5D=v");
    }

    #[test]
    fn test_encode_refund_payload() {
        let (params, _) = RefundRequest::new("ch_1").amount(250).into_parts();
        let body = encode(&params).unwrap();
        assert_eq!(
            body,
            "amount=250&charge=ch_1&metadata=&reason=requested_by_customer\
             &refund_application_fee=true&reverse_transfer=false"
        );
    }

    #[test]
    fn test_encode_charge_payload_without_fee() {
        let (params, _) = ChargeRequest::new(2_000, "usd", "tok_visa").application_fee(-1).into_parts();
        let body = encode(&params).unwrap();
        assert_eq!(body, "amount=2000&currency=usd&description=&source=tok_visa");
    }
}
