//! Type inference for leaf values, and the inverse encoding back to save-file text.
//!
//! Save files store every value as bare text. [`decode`] applies an ordered set of rules to such
//! a token, first match wins:
//!
//! 1. `True` / `False` become [`Scalar::Bool`].
//! 2. Optionally signed digits become [`Scalar::Int`].
//! 3. Decimal or exponent notation becomes [`Scalar::Float`].
//! 4. Two or more comma-separated numbers, optionally in parentheses, become [`Scalar::Tuple`].
//! 5. Anything else stays a [`Scalar::Str`].
//!
//! Decoding is lossy for floats: `1.50` decodes to `1.5` and encodes back as `1.5`. The raw text
//! of every leaf is kept next to its decoded value for that reason.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::CodecError;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());
static FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$").unwrap());

/// Keys that are decoded even when recursive interpretation is off, provided the leaf sits
/// directly inside one of the known sections.
pub const KNOWN_KEYS: [&str; 8] = [
    "Seed",
    "scene",
    "launchID",
    "modded",
    "UT",
    "activeVessel",
    "mapViewFiltering",
    "commNetUIModeTracking",
];

/// Which leaves the parser runs through [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coercion {
    /// Only [`KNOWN_KEYS`] directly inside `GAME`, `PARAMETERS` or `FLIGHTSTATE`.
    #[default]
    KnownKeys,
    /// Every leaf.
    Recursive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Tuple(Tuple),
    Str(String),
}

impl Scalar {
    pub fn kind_desc(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Tuple(_) => "tuple",
            Scalar::Str(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// A vector-like value such as a position (`1.5,-2,0`) or a rotation quaternion.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub components: Vec<Number>,
    /// Whether the source wrapped the components in `(` `)`.
    pub parenthesized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Decode `raw`, reporting tokens that look numeric but overflow.
pub fn try_decode(raw: &str) -> Result<Scalar, CodecError> {
    match raw {
        "True" => return Ok(Scalar::Bool(true)),
        "False" => return Ok(Scalar::Bool(false)),
        _ => {}
    }

    if let Some(number) = decode_number(raw)? {
        return Ok(match number {
            Number::Int(n) => Scalar::Int(n),
            Number::Float(f) => Scalar::Float(f),
        });
    }

    if let Some(tuple) = decode_tuple(raw)? {
        return Ok(Scalar::Tuple(tuple));
    }

    Ok(Scalar::Str(raw.to_string()))
}

/// Decode `raw`, keeping out-of-range numbers verbatim as strings.
pub fn decode(raw: &str) -> Scalar {
    try_decode(raw).unwrap_or_else(|CodecError::NumericOverflow { raw }| Scalar::Str(raw))
}

/// The canonical save-file text of `value`.
pub fn encode(value: &Scalar) -> String {
    match value {
        Scalar::Bool(true) => "True".to_string(),
        Scalar::Bool(false) => "False".to_string(),
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(f) => encode_float(*f),
        Scalar::Tuple(tuple) => {
            let joined = tuple
                .components
                .iter()
                .map(|c| match c {
                    Number::Int(n) => n.to_string(),
                    Number::Float(f) => encode_float(*f),
                })
                .collect::<Vec<_>>()
                .join(",");
            if tuple.parenthesized {
                format!("({joined})")
            } else {
                joined
            }
        }
        Scalar::Str(s) => s.clone(),
    }
}

/// `Debug` formatting of `f64` is the shortest text that parses back to the same value, and
/// always carries a `.` or an exponent so the result decodes as a float again.
fn encode_float(f: f64) -> String {
    format!("{f:?}")
}

fn overflow(raw: &str) -> CodecError {
    CodecError::NumericOverflow {
        raw: raw.to_string(),
    }
}

fn decode_number(raw: &str) -> Result<Option<Number>, CodecError> {
    if INTEGER.is_match(raw) {
        return raw
            .parse::<i64>()
            .map(|n| Some(Number::Int(n)))
            .map_err(|_| overflow(raw));
    }

    if FLOAT.is_match(raw) {
        return match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Some(Number::Float(f))),
            _ => Err(overflow(raw)),
        };
    }

    Ok(None)
}

fn decode_tuple(raw: &str) -> Result<Option<Tuple>, CodecError> {
    let (inner, parenthesized) = match raw.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (inner, true),
        None => (raw, false),
    };

    if !inner.contains(',') {
        return Ok(None);
    }

    let mut components = Vec::new();
    for part in inner.split(',') {
        match decode_number(part.trim()) {
            Ok(Some(number)) => components.push(number),
            Ok(None) => return Ok(None),
            Err(_) => return Err(overflow(raw)),
        }
    }

    Ok(Some(Tuple {
        components,
        parenthesized,
    }))
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Int(n) => serializer.serialize_i64(*n),
            Number::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(n) => serializer.serialize_i64(*n),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Tuple(tuple) => {
                let mut seq = serializer.serialize_seq(Some(tuple.components.len()))?;
                for component in &tuple.components {
                    seq.serialize_element(component)?;
                }
                seq.end()
            }
            Scalar::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl From<Number> for serde_json::Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(n) => serde_json::Value::Number(n.into()),
            Number::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl From<&Scalar> for serde_json::Value {
    fn from(v: &Scalar) -> Self {
        match v {
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Int(n) => serde_json::Value::Number((*n).into()),
            Scalar::Float(f) => Number::Float(*f).into(),
            Scalar::Tuple(tuple) => serde_json::Value::Array(
                tuple.components.iter().map(|c| (*c).into()).collect(),
            ),
            Scalar::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("True", Scalar::Bool(true))]
    #[case("False", Scalar::Bool(false))]
    #[case("true", Scalar::Str("true".into()))]
    #[case("42", Scalar::Int(42))]
    #[case("-1026", Scalar::Int(-1026))]
    #[case("+7", Scalar::Int(7))]
    #[case("12345.6789", Scalar::Float(12345.6789))]
    #[case("1.2E-05", Scalar::Float(1.2e-5))]
    #[case(".5", Scalar::Float(0.5))]
    #[case("1.12.5", Scalar::Str("1.12.5".into()))]
    #[case("Kerbal X", Scalar::Str("Kerbal X".into()))]
    #[case("", Scalar::Str(String::new()))]
    fn decode_rules(#[case] raw: &str, #[case] expected: Scalar) {
        assert_eq!(decode(raw), expected);
    }

    #[rstest]
    #[case("159780.5,-1024.25,600012.125", vec![Number::Float(159780.5), Number::Float(-1024.25), Number::Float(600012.125)], false)]
    #[case("7, 8, 5, 6", vec![Number::Int(7), Number::Int(8), Number::Int(5), Number::Int(6)], false)]
    #[case("(1, 0.5)", vec![Number::Int(1), Number::Float(0.5)], true)]
    fn decode_tuples(#[case] raw: &str, #[case] components: Vec<Number>, #[case] parenthesized: bool) {
        assert_eq!(
            decode(raw),
            Scalar::Tuple(Tuple {
                components,
                parenthesized
            })
        );
    }

    #[rstest]
    #[case("1,two,3")]
    #[case("1,,3")]
    #[case("(5)")]
    #[case("Squad/Flags/default")]
    fn non_numeric_groups_stay_strings(#[case] raw: &str) {
        assert_eq!(decode(raw), Scalar::Str(raw.to_string()));
    }

    #[test]
    fn integer_overflow_is_reported() {
        let raw = "92233720368547758070";
        assert_eq!(
            try_decode(raw),
            Err(CodecError::NumericOverflow {
                raw: raw.to_string()
            })
        );
        assert_eq!(decode(raw), Scalar::Str(raw.to_string()));
    }

    #[test]
    fn float_overflow_is_reported() {
        assert!(try_decode("1e999").is_err());
        assert_eq!(decode("1e999"), Scalar::Str("1e999".into()));
        assert_eq!(decode("1,1e999"), Scalar::Str("1,1e999".into()));
    }

    #[test]
    fn float_encodes_shortest_form() {
        assert_eq!(encode(&decode("12345.6789")), "12345.6789");
        assert_eq!(encode(&decode("1.50")), "1.5");
        assert_eq!(encode(&Scalar::Float(1.0)), "1.0");
        assert_eq!(decode(&encode(&Scalar::Float(1e300))), Scalar::Float(1e300));
    }

    #[test]
    fn tuple_encoding_keeps_parentheses() {
        assert_eq!(encode(&decode("(1, 0.5)")), "(1,0.5)");
        assert_eq!(encode(&decode("0.1,-0.7,0.2,0.6")), "0.1,-0.7,0.2,0.6");
    }

    #[test]
    fn json_values() {
        assert_eq!(serde_json::Value::from(&decode("True")), serde_json::json!(true));
        assert_eq!(serde_json::Value::from(&decode("-3")), serde_json::json!(-3));
        assert_eq!(
            serde_json::Value::from(&decode("1,2.5")),
            serde_json::json!([1, 2.5])
        );
        assert_eq!(
            serde_json::to_value(decode("1,2.5")).unwrap(),
            serde_json::json!([1, 2.5])
        );
    }

    proptest! {
        #[test]
        fn integers_round_trip(n in any::<i64>()) {
            let text = n.to_string();
            prop_assert_eq!(encode(&decode(&text)), text);
        }

        #[test]
        fn strings_round_trip(s in "[A-Za-z_ /.-]{0,24}") {
            let decoded = decode(&s);
            if let Scalar::Str(_) = decoded {
                prop_assert_eq!(encode(&decoded), s);
            }
        }

        #[test]
        fn floats_re_decode_to_same_value(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
            prop_assert_eq!(decode(&encode(&Scalar::Float(f))), Scalar::Float(f));
        }
    }
}
