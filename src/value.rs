use std::collections::HashMap;
use std::fmt;

use serde_json::{Number as JsonNumber, Value as JsonValue, json};

/// Runtime value produced by the evaluator.
///
/// Arrays and objects own their elements outright. The evaluated grammar has
/// no way to alias one value from two places, so there is no need for shared
/// (`Rc`) storage here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
    Null,
}

impl Value {
    /// ToBoolean: `false`, `0`, `NaN`, `""` and `null` are falsy,
    /// everything else (arrays and objects included) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// ToNumber for the supported value domain. Strings are trimmed and
    /// read as a decimal literal (empty string is 0, anything outside the
    /// decimal grammar is NaN); arrays and objects become NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) | Value::Null => 0.0,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else if is_decimal_number(trimmed) {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                } else {
                    f64::NAN
                }
            }
            Value::Array(_) | Value::Object(_) => f64::NAN,
        }
    }

    /// ToInt32: NaN and infinities become 0, the rest truncates toward zero
    /// and wraps modulo 2^32.
    pub fn to_int32(&self) -> i32 {
        let n = self.to_number();
        if n.is_nan() || n.is_infinite() {
            return 0;
        }
        n.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
    }

    /// ToUint32, same truncation rules as [`Value::to_int32`].
    pub fn to_uint32(&self) -> u32 {
        self.to_int32() as u32
    }

    /// Loose (`==`) equality over the supported domain.
    ///
    /// Same tag compares structurally (with `NaN != NaN` for numbers),
    /// except arrays and objects, which always compare unequal: that stands
    /// in for reference identity, which an owning value model cannot
    /// observe, and the grammar cannot build two references to one value
    /// anyway. Mixed number/string and boolean operands coerce through
    /// ToNumber; `null` is only loosely equal to itself.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(_), _) | (_, Value::Array(_)) => false,
            (Value::Object(_), _) | (_, Value::Object(_)) => false,
            (Value::Number(a), Value::String(_)) => *a == other.to_number(),
            (Value::String(_), Value::Number(b)) => self.to_number() == *b,
            (Value::Boolean(_), _) => Value::Number(self.to_number()).loose_eq(other),
            (_, Value::Boolean(_)) => self.loose_eq(&Value::Number(other.to_number())),
            (Value::Null, _) | (_, Value::Null) => false,
        }
    }

    /// Convert into a `serde_json` value so hosts can serialize results.
    /// Non-finite numbers have no JSON representation and map to `null`,
    /// matching what `JSON.stringify` does.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Number(n) => JsonNumber::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
            Value::String(s) => json!(s),
            Value::Boolean(b) => json!(b),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => {
                JsonValue::Object(map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
            Value::Null => JsonValue::Null,
        }
    }
}

/// True when `s` matches the decimal number grammar: optional sign, digits
/// with optional fraction, optional exponent. `f64::parse` alone would also
/// accept spellings like `"inf"` and `"NaN"`, which ToNumber must reject.
fn is_decimal_number(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (s, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };

    // At least one digit somewhere in the mantissa.
    if int.is_empty() && frac.is_none_or(str::is_empty) {
        return false;
    }
    if !int.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if let Some(frac) = frac {
        if !frac.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }
    if let Some(exp) = exponent {
        let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp.is_empty() || !exp.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }
    true
}

/// Render a number the way JS does: integral values without a trailing
/// `.0`, `NaN` and `Infinity` spelled out.
fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}", if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == n.trunc() && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => format_number(*n, f),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}
