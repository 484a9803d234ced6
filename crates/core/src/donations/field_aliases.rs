//! Maps arbitrary webhook field names onto the canonical donation attributes.
//!
//! Each attribute owns an ordered alias list; the first alias whose value is
//! present wins. A value is present when it is not `null`, not an array or
//! object, and not a blank string.

use serde_json::{Map, Value};

use crate::constants::ANONYMOUS_USERNAME;
use crate::errors::{Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    pub username: &'static [&'static str],
    pub amount: &'static [&'static str],
    pub message: &'static [&'static str],
}

/// Field names seen in Saweria payloads and the relays that forward them.
pub const SAWERIA_FIELD_ALIASES: FieldAliases = FieldAliases {
    username: &[
        "donatur_name",
        "donator_name",
        "donor_name",
        "supporter_name",
        "username",
        "name",
        "from",
    ],
    amount: &["amount_raw", "amount", "donation_amount", "nominal", "value"],
    message: &[
        "message",
        "donatur_message",
        "donator_message",
        "msg",
        "note",
        "comment",
    ],
};

impl Default for FieldAliases {
    fn default() -> Self {
        SAWERIA_FIELD_ALIASES
    }
}

/// Canonical attributes pulled out of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationFields {
    pub username: String,
    pub amount: i64,
    pub message: String,
}

impl FieldAliases {
    /// Resolves every attribute of `payload`.
    ///
    /// Only a non-object payload is an error; missing fields fall back to
    /// `"Anonymous"`, `0` and `""`.
    pub fn extract(&self, payload: &Value) -> Result<DonationFields> {
        let object = payload.as_object().ok_or_else(|| {
            ValidationError::MalformedPayload(format!(
                "expected a JSON object, got {}",
                value_kind(payload)
            ))
        })?;

        let username = first_present(object, self.username)
            .map(as_text)
            .unwrap_or_else(|| ANONYMOUS_USERNAME.to_string());
        let amount = first_present(object, self.amount)
            .map(parse_amount)
            .unwrap_or(0);
        let message = first_present(object, self.message)
            .map(as_text)
            .unwrap_or_default();

        Ok(DonationFields {
            username,
            amount,
            message,
        })
    }
}

fn first_present<'a>(object: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| object.get(*alias))
        .find(|value| is_present(value))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Coerces a JSON value into a non-negative amount.
///
/// Strings are read by their leading integer prefix (`"5000.75"` is 5000,
/// `"abc"` is 0). Negative, out-of-range and non-numeric values become 0.
pub fn parse_amount(value: &Value) -> i64 {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.max(0)
            } else if n.is_u64() {
                0
            } else {
                n.as_f64().map(truncate_float).unwrap_or(0)
            }
        }
        Value::String(s) => parse_integer_prefix(s.trim()),
        _ => 0,
    }
}

fn truncate_float(f: f64) -> i64 {
    if f.is_finite() && f >= 0.0 && f < i64::MAX as f64 {
        f.trunc() as i64
    } else {
        0
    }
}

fn parse_integer_prefix(s: &str) -> i64 {
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if negative || digits_len == 0 {
        return 0;
    }
    rest[..digits_len].parse::<i64>().unwrap_or(0)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
