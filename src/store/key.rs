//! Typed store keys with a total ordering.
//!
//! Keys order deterministically as `Bool < Int < Float < String`. Floats
//! are held as sign-adjusted bit patterns so the derived ordering is total
//! even in the presence of the full IEEE range. Mixed-type comparisons
//! follow this variant order; it is the comparator every cursor and the
//! merge coordinator rely on.

use std::fmt;

use serde_json::Value;

/// A primary or index key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value, stored as total-ordering bits
    Float(u64),
    /// String value
    String(String),
}

impl Key {
    /// Create a key from a boolean.
    pub fn from_bool(v: bool) -> Self {
        Key::Bool(v)
    }

    /// Create a key from an integer.
    pub fn from_int(v: i64) -> Self {
        Key::Int(v)
    }

    /// Create a key from a float.
    ///
    /// Negative floats flip all bits, positive floats flip the sign bit,
    /// which makes the bit pattern order match numeric order.
    pub fn from_float(v: f64) -> Self {
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        Key::Float(ordered)
    }

    /// Create a key from a string.
    pub fn from_string(v: impl Into<String>) -> Self {
        Key::String(v.into())
    }

    /// Extract a key from a JSON scalar.
    ///
    /// Arrays, objects and null are not keyable and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Key::from_bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Key::from_int(i))
                } else {
                    n.as_f64().map(Key::from_float)
                }
            }
            Value::String(s) => Some(Key::from_string(s)),
            _ => None,
        }
    }

    /// Decode a float key back to its numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Key::Float(ordered) => {
                let bits = if (ordered >> 63) == 1 {
                    ordered ^ (1 << 63)
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            Key::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Render the key as a JSON scalar.
    pub fn to_json(&self) -> Value {
        match self {
            Key::Bool(b) => Value::Bool(*b),
            Key::Int(i) => Value::from(*i),
            Key::Float(_) => self
                .as_f64()
                .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                .unwrap_or(Value::Null),
            Key::String(s) => Value::String(s.clone()),
        }
    }

    /// The string form of the key, used for prefix matching and as the
    /// lookup-map key. Prefix matching on non-string keys goes through
    /// this form; that coercion is implementation-defined behavior.
    pub fn string_form(&self) -> String {
        match self {
            Key::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::Float(_) => match self.as_f64() {
                Some(v) => write!(f, "{}", v),
                None => write!(f, "NaN"),
            },
            Key::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::from_string(v)
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::String(v)
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}
