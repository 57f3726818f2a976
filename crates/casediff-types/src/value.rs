//! Typed namelist values.
//!
//! Source documents are untyped JSON; every value is converted once into the
//! closed [`Value`] enum so formatting and comparison can match exhaustively.

use serde::Serialize;

/// A single configuration value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null (present but empty), distinct from an absent key.
    Null,
    /// Fortran logical.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Real literal.
    Float(f64),
    /// Character literal, or any token that did not parse as another kind.
    String(String),
    /// Ordered array of values; may nest.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, for logs and debugging output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Lossless for every JSON kind the collector emits. Objects have no
    /// counterpart in a namelist and are kept as their compact JSON text so a
    /// stray derived-type value still shows up in the comparison.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            obj @ serde_json::Value::Object(_) => Self::String(obj.to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_scalars() {
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!(true)), Value::Bool(true));
        assert_eq!(Value::from(json!(1800)), Value::Int(1800));
        assert_eq!(Value::from(json!(1.5e-3)), Value::Float(1.5e-3));
        assert_eq!(Value::from(json!("cam")), Value::String("cam".into()));
    }

    #[test]
    fn integral_float_stays_float() {
        // serde_json keeps 1800.0 as an f64, which must not turn into an Int.
        assert_eq!(Value::from(json!(1800.0)), Value::Float(1800.0));
    }

    #[test]
    fn huge_unsigned_becomes_float() {
        let v = Value::from(json!(u64::MAX));
        assert!(matches!(v, Value::Float(_)));
    }

    #[test]
    fn converts_nested_lists() {
        let v = Value::from(json!([1, [2.5, "x"], null]));
        assert_eq!(
            v,
            Value::List(vec![
                Value::Int(1),
                Value::List(vec![Value::Float(2.5), Value::String("x".into())]),
                Value::Null,
            ])
        );
    }

    #[test]
    fn object_kept_as_json_text() {
        let v = Value::from(json!({"a": 1}));
        assert_eq!(v, Value::String("{\"a\":1}".into()));
    }

    #[test]
    fn null_text_is_not_null() {
        let v = Value::from(json!("null"));
        assert!(!v.is_null());
        assert_eq!(v.kind(), "string");
    }

    #[test]
    fn serializes_untagged() {
        let v = Value::List(vec![Value::Bool(false), Value::Int(2), Value::Null]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[false,2,null]");
    }
}
