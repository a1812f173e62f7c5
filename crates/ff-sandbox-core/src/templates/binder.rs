//! Parameter binding: validates a caller's parameter bag against a contract and coerces
//! every value into render-ready snippet text.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SandboxError};
use crate::templates::contract::{Coercion, FieldSpec, ParameterContract};

/// Text emitted for a field that is deliberately shown without a value.
pub const UNDEFINED_MARKER: &str = "undefined";

/// Caller-supplied parameters, keyed by field name. Inserting a field twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterBag {
    values: BTreeMap<String, Value>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Builder-style [`ParameterBag::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (name, value) in iter {
            bag.insert(name, value);
        }
        bag
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for ParameterBag {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

/// A field's resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// A genuine value, already coerced to snippet text.
    Present(String),
    /// Deliberately no value: interpolates as [`UNDEFINED_MARKER`] but does not open a
    /// conditional block.
    Unset,
    /// Not supplied and nothing to show.
    Absent,
}

impl BoundValue {
    /// Whether the value satisfies a conditional block.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Text an interpolation of this value emits, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Present(text) => Some(text),
            Self::Unset => Some(UNDEFINED_MARKER),
            Self::Absent => None,
        }
    }
}

/// Per-request mapping from field name to [`BoundValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: BTreeMap<String, BoundValue>,
}

impl Binding {
    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(BoundValue::is_present)
    }
}

/// Bind `bag` against `contract`.
///
/// `null` and blank strings count as not supplied. A field that is still missing after applying its
/// default fails with [`SandboxError::MissingRequiredField`] if it is required.
pub fn bind(bag: &ParameterBag, contract: &ParameterContract) -> Result<Binding> {
    let mut values = BTreeMap::new();

    for spec in contract.fields() {
        let supplied = bag
            .get(spec.name)
            .filter(|v| is_supplied(v))
            .or_else(|| spec.default.as_ref().filter(|v| is_supplied(v)));

        let bound = match supplied {
            Some(value) => BoundValue::Present(coerce(spec, value)?),
            None if spec.required => {
                return Err(SandboxError::MissingRequiredField(spec.name.to_string()));
            }
            None if spec.coercion == Coercion::UndefinedWhenAbsent => BoundValue::Unset,
            None => BoundValue::Absent,
        };
        values.insert(spec.name.to_string(), bound);
    }

    for name in bag.names().filter(|name| !contract.contains(name)) {
        tracing::debug!(field = name, "ignoring parameter outside the contract");
    }

    Ok(Binding { values })
}

fn is_supplied(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn coerce(spec: &FieldSpec, value: &Value) -> Result<String> {
    if let Some(allowed) = spec.allowed {
        if !value.as_str().is_some_and(|s| allowed.contains(&s)) {
            return Err(invalid(
                spec.name,
                format!("expected one of: {}", allowed.join(", ")),
            ));
        }
    }

    match spec.coercion {
        Coercion::Text | Coercion::UndefinedWhenAbsent => Ok(literal(value)),
        Coercion::Decimal => decimal(spec.name, value).map(|digits| quote(&digits)),
    }
}

/// JavaScript literal for `value`. Strings are single-quoted at every depth, so structured
/// payloads read like the rest of the snippet: `{ greeting: 'hi', to: ['org1', 'org2'] }`.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let items: Vec<_> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let entries: Vec<_> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", object_key(key), literal(value)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        other => other.to_string(),
    }
}

fn object_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        key.to_string()
    } else {
        quote(key)
    }
}

fn decimal(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::Number(n) => {
            // The number's own text, as parsed: no detour through f64.
            let text = n.to_string();
            if text.starts_with('-') {
                return Err(invalid(field, format!("expected a non-negative amount, got {n}")));
            }
            canonical_number(&text)
                .ok_or_else(|| invalid(field, format!("cannot represent {n} as a decimal")))
        }
        Value::String(s) => canonical_decimal(s.trim())
            .ok_or_else(|| invalid(field, format!("expected a decimal number, got '{s}'"))),
        other => Err(invalid(field, format!("expected a number, got {other}"))),
    }
}

/// Largest exponent accepted in a number's text, which bounds the expanded digit string.
const MAX_EXPONENT: u32 = 1_000;

/// [`canonical_decimal`] for JSON number text, which may carry an exponent (`2.5e3`).
fn canonical_number(text: &str) -> Option<String> {
    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(at) => (&text[..at], text[at + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    if exponent.unsigned_abs() > u64::from(MAX_EXPONENT) {
        return None;
    }

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{int_part}{frac_part}");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let point = int_part.len() as i64 + exponent;
    let shifted = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (int_digits, frac_digits) = digits.split_at(point as usize);
        format!("{int_digits}.{frac_digits}")
    };
    canonical_decimal(&shifted)
}

/// Canonical form of an unsigned decimal string: no leading zeros in the integer part,
/// no trailing zeros in the fraction, and no `.` when the fraction is empty.
///
/// Returns `None` unless `text` is digits with at most one `.`.
pub fn canonical_decimal(text: &str) -> Option<String> {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let int_part = match int_part.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let frac_part = frac_part.trim_end_matches('0');

    Some(if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    })
}

/// Single-quoted JavaScript string literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn invalid(field: &str, reason: String) -> SandboxError {
    SandboxError::InvalidFieldValue {
        field: field.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract() -> ParameterContract {
        [
            FieldSpec::required("pool", Coercion::Text),
            FieldSpec::required("amount", Coercion::Decimal),
            FieldSpec::optional("tokenIndex", Coercion::Decimal),
            FieldSpec::optional("address", Coercion::UndefinedWhenAbsent),
            FieldSpec::optional("messagingMethod", Coercion::Text)
                .one_of(&["transfer_broadcast", "transfer_private"]),
        ]
        .into_iter()
        .collect()
    }

    fn bag() -> ParameterBag {
        ParameterBag::new().with("pool", "pool1").with("amount", 10)
    }

    fn present(binding: &Binding, name: &str) -> String {
        match binding.get(name) {
            Some(BoundValue::Present(text)) => text.clone(),
            other => panic!("expected {name} to be present, got {other:?}"),
        }
    }

    #[test]
    fn test_text_is_quoted() {
        let binding = bind(&bag(), &contract()).unwrap();
        assert_eq!(present(&binding, "pool"), "'pool1'");
    }

    #[test]
    fn test_integer_and_float_amounts_render_the_same() {
        for amount in [json!(10), json!(10.0), json!("10"), json!("010"), json!("10.000")] {
            let binding = bind(&bag().with("amount", amount.clone()), &contract()).unwrap();
            assert_eq!(present(&binding, "amount"), "'10'", "amount {amount}");
        }
        let binding = bind(&bag().with("amount", 1), &contract()).unwrap();
        assert_eq!(present(&binding, "amount"), "'1'");
    }

    #[test]
    fn test_fractional_amounts() {
        let binding = bind(&bag().with("amount", 1.5), &contract()).unwrap();
        assert_eq!(present(&binding, "amount"), "'1.5'");
        let binding = bind(&bag().with("amount", ".250"), &contract()).unwrap();
        assert_eq!(present(&binding, "amount"), "'0.25'");
    }

    #[test]
    fn test_large_amount_keeps_every_digit() {
        let big = "1000000000000000000000000000001";
        let binding = bind(&bag().with("amount", big), &contract()).unwrap();
        assert_eq!(present(&binding, "amount"), format!("'{big}'"));

        let binding = bind(&bag().with("amount", 1e21), &contract()).unwrap();
        assert_eq!(present(&binding, "amount"), "'1000000000000000000000'");
    }

    fn amount_from_json(amount: &str) -> String {
        let bag: ParameterBag =
            serde_json::from_str(&format!(r#"{{"pool": "pool1", "amount": {amount}}}"#)).unwrap();
        present(&bind(&bag, &contract()).unwrap(), "amount")
    }

    #[test]
    fn test_number_amounts_beyond_u64_keep_every_digit() {
        assert_eq!(amount_from_json("18446744073709551617"), "'18446744073709551617'");
        assert_eq!(amount_from_json("100000000000000000000001"), "'100000000000000000000001'");
        assert_eq!(amount_from_json("12345678901234567890.000000000000000001"), "'12345678901234567890.000000000000000001'");
    }

    #[test]
    fn test_number_amounts_with_exponent() {
        assert_eq!(amount_from_json("2.5e3"), "'2500'");
        assert_eq!(amount_from_json("1.5E-2"), "'0.015'");
        assert_eq!(amount_from_json("10E+0"), "'10'");
        assert_eq!(amount_from_json("100000000000000000000001e2"), "'10000000000000000000000100'");
    }

    #[test]
    fn test_canonical_number() {
        assert_eq!(canonical_number("0.000"), Some("0".into()));
        assert_eq!(canonical_number("5e-1"), Some("0.5".into()));
        assert_eq!(canonical_number("1e1001"), None);
        assert_eq!(canonical_number("-1"), None);
        assert_eq!(canonical_number("e5"), None);
    }

    #[test]
    fn test_invalid_amounts() {
        for amount in [json!(-1), json!(-0.5), json!("1e5"), json!("ten"), json!("1.2.3"), json!("."), json!(true), json!([1])] {
            let err = bind(&bag().with("amount", amount.clone()), &contract()).unwrap_err();
            assert!(
                matches!(&err, SandboxError::InvalidFieldValue { field, .. } if field == "amount"),
                "amount {amount}: {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_required() {
        let err = bind(&ParameterBag::new().with("pool", "p"), &contract()).unwrap_err();
        assert_eq!(err, SandboxError::MissingRequiredField("amount".into()));
    }

    #[test]
    fn test_null_and_empty_count_as_missing() {
        let err = bind(&bag().with("pool", Value::Null), &contract()).unwrap_err();
        assert_eq!(err, SandboxError::MissingRequiredField("pool".into()));
        let err = bind(&bag().with("pool", ""), &contract()).unwrap_err();
        assert_eq!(err, SandboxError::MissingRequiredField("pool".into()));
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let err = bind(&bag().with("pool", "   "), &contract()).unwrap_err();
        assert_eq!(err, SandboxError::MissingRequiredField("pool".into()));

        let binding = bind(&bag().with("address", " \t"), &contract()).unwrap();
        assert_eq!(binding.get("address"), Some(&BoundValue::Unset));

        let binding = bind(&bag().with("pool", " pool1 "), &contract()).unwrap();
        assert_eq!(present(&binding, "pool"), "' pool1 '");
    }

    #[test]
    fn test_optional_states() {
        let binding = bind(&bag().with("messagingMethod", Value::Null), &contract()).unwrap();
        assert_eq!(binding.get("tokenIndex"), Some(&BoundValue::Absent));
        assert_eq!(binding.get("messagingMethod"), Some(&BoundValue::Absent));
        assert_eq!(binding.get("address"), Some(&BoundValue::Unset));
        assert_eq!(binding.get("address").unwrap().text(), Some(UNDEFINED_MARKER));
        assert!(!binding.is_present("address"));
        assert!(!binding.is_present("tokenIndex"));
    }

    #[test]
    fn test_undefined_marker_field_with_value() {
        let binding = bind(&bag().with("address", "0xabc"), &contract()).unwrap();
        assert_eq!(present(&binding, "address"), "'0xabc'");
        assert!(binding.is_present("address"));
    }

    #[test]
    fn test_token_index_string_is_decimal() {
        let binding = bind(&bag().with("tokenIndex", "1"), &contract()).unwrap();
        assert_eq!(present(&binding, "tokenIndex"), "'1'");
    }

    #[test]
    fn test_allowed_values() {
        let binding = bind(&bag().with("messagingMethod", "transfer_private"), &contract()).unwrap();
        assert_eq!(present(&binding, "messagingMethod"), "'transfer_private'");

        let err = bind(&bag().with("messagingMethod", "carrier_pigeon"), &contract()).unwrap_err();
        match err {
            SandboxError::InvalidFieldValue { field, reason } => {
                assert_eq!(field, "messagingMethod");
                assert!(reason.contains("transfer_broadcast"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_applies_when_missing() {
        let contract: ParameterContract = [FieldSpec::required("type", Coercion::Text)
            .one_of(&["fungible", "nonfungible"])
            .with_default(json!("fungible"))]
        .into_iter()
        .collect();
        let binding = bind(&ParameterBag::new(), &contract).unwrap();
        assert_eq!(present(&binding, "type"), "'fungible'");

        let binding = bind(&ParameterBag::new().with("type", "nonfungible"), &contract).unwrap();
        assert_eq!(present(&binding, "type"), "'nonfungible'");
    }

    #[test]
    fn test_structured_values_are_structural_literals() {
        let contract: ParameterContract =
            [FieldSpec::required("value", Coercion::Text)].into_iter().collect();
        let bag = ParameterBag::new().with("value", json!({"a": [1, 2], "b": "x"}));
        let binding = bind(&bag, &contract).unwrap();
        assert_eq!(present(&binding, "value"), "{ a: [1, 2], b: 'x' }");

        let binding = bind(&ParameterBag::new().with("value", 42), &contract).unwrap();
        assert_eq!(present(&binding, "value"), "42");

        let binding = bind(&ParameterBag::new().with("value", json!(["org1", "org2"])), &contract).unwrap();
        assert_eq!(present(&binding, "value"), "['org1', 'org2']");
    }

    #[test]
    fn test_object_keys_quoted_only_when_needed() {
        let contract: ParameterContract =
            [FieldSpec::required("value", Coercion::Text)].into_iter().collect();
        let bag = ParameterBag::new().with(
            "value",
            json!({ "$id": true, "content-type": "json", "it's": null, "nested": {}, "list": [] }),
        );
        let binding = bind(&bag, &contract).unwrap();
        assert_eq!(
            present(&binding, "value"),
            r"{ $id: true, 'content-type': 'json', 'it\'s': null, list: [], nested: {} }"
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let binding = bind(&bag().with("pool", "it's a\\pool\n{{amount}}"), &contract()).unwrap();
        assert_eq!(present(&binding, "pool"), r"'it\'s a\\pool\n{{amount}}'");
    }

    #[test]
    fn test_last_write_wins() {
        let mut bag = bag();
        let previous = bag.insert("pool", "pool2");
        assert_eq!(previous, Some(json!("pool1")));
        let binding = bind(&bag, &contract()).unwrap();
        assert_eq!(present(&binding, "pool"), "'pool2'");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let binding = bind(&bag().with("color", "blue"), &contract()).unwrap();
        assert!(binding.get("color").is_none());
    }

    #[test]
    fn test_bag_from_json() {
        let bag: ParameterBag =
            serde_json::from_value(json!({"pool": "pool1", "amount": 10, "tokenIndex": null})).unwrap();
        assert_eq!(bag.get("amount"), Some(&json!(10)));
        assert_eq!(bag.get("tokenIndex"), Some(&Value::Null));
        assert!(serde_json::from_value::<ParameterBag>(json!(["pool"])).is_err());
    }

    #[test]
    fn test_quote_control_characters() {
        assert_eq!(quote("a\u{0}b"), r"'a\u0000b'");
        assert_eq!(quote("\u{2028}"), r"'\u2028'");
        assert_eq!(quote(""), "''");
    }
}
