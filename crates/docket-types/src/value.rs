use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A typed field value.
///
/// Top-level fields that arrive as text are coerced into `Integer` or `Text`.
/// Anything else a document carries (floats, booleans, null, nested arrays
/// and objects) is kept verbatim as `Raw`.
///
/// On the wire and on disk a `Value` is plain JSON: integers are numbers,
/// text is a string, raw content is embedded as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Text(String),
    Raw(serde_json::Value),
}

impl Value {
    /// Returns the text payload, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Coerce an externally supplied literal into a typed value.
///
/// A non-empty string made only of ASCII decimal digits becomes
/// `Integer`; everything else stays `Text`, unchanged. Digit strings that
/// overflow `i64` also stay `Text`.
///
/// ```
/// use docket_types::{coerce, Value};
///
/// assert_eq!(coerce("42"), Value::Integer(42));
/// assert_eq!(coerce("42a"), Value::Text("42a".into()));
/// assert_eq!(coerce("-1"), Value::Text("-1".into()));
/// ```
pub fn coerce(text: &str) -> Value {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = text.parse::<i64>() {
            return Value::Integer(n);
        }
    }
    Value::Text(text.to_string())
}

/// Coerce a JSON field value received from a flat create payload.
///
/// Strings go through [`coerce`]; every other JSON value is classified
/// as-is (see `From<serde_json::Value>`).
pub fn coerce_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::String(s) => coerce(&s),
        other => Value::from(other),
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Raw(serde_json::Value::Number(n)),
            },
            other => Self::Raw(other),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Raw(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Raw(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn digits_become_integers() {
        assert_eq!(coerce("0"), Value::Integer(0));
        assert_eq!(coerce("30"), Value::Integer(30));
        assert_eq!(coerce("007"), Value::Integer(7));
    }

    #[test]
    fn non_digits_stay_text() {
        assert_eq!(coerce("42a"), Value::Text("42a".into()));
        assert_eq!(coerce("alice"), Value::Text("alice".into()));
        assert_eq!(coerce(""), Value::Text(String::new()));
        assert_eq!(coerce("1.5"), Value::Text("1.5".into()));
        assert_eq!(coerce(" 1"), Value::Text(" 1".into()));
    }

    #[test]
    fn overflowing_digits_stay_text() {
        let big = "99999999999999999999999";
        assert_eq!(coerce(big), Value::Text(big.into()));
    }

    #[test]
    fn json_strings_are_coerced() {
        assert_eq!(coerce_json(json!("31")), Value::Integer(31));
        assert_eq!(coerce_json(json!("bob")), Value::Text("bob".into()));
    }

    #[test]
    fn json_non_strings_pass_through() {
        assert_eq!(coerce_json(json!(5)), Value::Integer(5));
        assert_eq!(coerce_json(json!(true)), Value::Raw(json!(true)));
        assert_eq!(coerce_json(json!(1.5)), Value::Raw(json!(1.5)));
        assert_eq!(
            coerce_json(json!({"nested": ["a", 1]})),
            Value::Raw(json!({"nested": ["a", 1]}))
        );
    }

    #[test]
    fn serializes_as_plain_json() {
        assert_eq!(serde_json::to_value(Value::Integer(30)).unwrap(), json!(30));
        assert_eq!(serde_json::to_value(Value::from("x")).unwrap(), json!("x"));
        assert_eq!(
            serde_json::to_value(Value::Raw(json!([1, 2]))).unwrap(),
            json!([1, 2])
        );
    }

    #[test]
    fn deserializes_by_json_shape() {
        let v: Value = serde_json::from_str("30").unwrap();
        assert_eq!(v, Value::Integer(30));
        let v: Value = serde_json::from_str("\"30\"").unwrap();
        assert_eq!(v, Value::Text("30".into()));
        let v: Value = serde_json::from_str("null").unwrap();
        assert_eq!(v, Value::Raw(serde_json::Value::Null));
    }

    #[test]
    fn integer_and_text_never_equal() {
        assert_ne!(Value::Integer(1), Value::Text("1".into()));
    }

    proptest! {
        #[test]
        fn coercion_is_stable(s in "\\PC*") {
            prop_assert_eq!(coerce(&s), coerce(&s));
        }

        #[test]
        fn small_numbers_coerce_to_themselves(n in 0i64..=i64::MAX) {
            prop_assert_eq!(coerce(&n.to_string()), Value::Integer(n));
        }

        #[test]
        fn text_with_a_letter_is_untouched(prefix in "[0-9]{0,6}", suffix in "[a-z]{1,6}") {
            let s = format!("{prefix}{suffix}");
            prop_assert_eq!(coerce(&s), Value::Text(s.clone()));
        }
    }
}
