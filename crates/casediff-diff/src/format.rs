//! Value formatting and the per-case cell type.
//!
//! Divergence is decided on formatted text, so this module fixes exactly one
//! spelling per value. Absence is a separate [`Cell`] variant rather than a
//! reserved string, which keeps it from ever comparing equal to real data.

use casediff_types::Value;
use serde::{Serialize, Serializer};

/// Display text for a case that has no value for a key.
pub const MISSING_MARKER: &str = "—";

const LIST_SEPARATOR: &str = ", ";

/// Format a value the way it is shown and compared.
///
/// Logicals use Fortran literal syntax (`.true.`/`.false.`), so two logical
/// sources compare equal to each other but not to the string `"true"`.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => ".true.".to_string(),
        Value::Bool(false) => ".false.".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::String(s) => s.clone(),
        Value::List(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
    }
}

/// Shortest round-trip decimal; exponent form outside `[1e-6, 1e21)`.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        format!("{f:e}")
    } else {
        format!("{f}")
    }
}

/// One case's entry in a diff row.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// The case has no value for this key (no document, group or key).
    Missing,
    /// The formatted value.
    Value(String),
}

impl Cell {
    /// Build a cell from an optional value.
    pub fn from_value(value: Option<&Value>) -> Self {
        value.map_or(Self::Missing, |v| Self::Value(format_value(v)))
    }

    /// Text to display; [`MISSING_MARKER`] for a missing value.
    pub fn text(&self) -> &str {
        match self {
            Self::Missing => MISSING_MARKER,
            Self::Value(text) => text,
        }
    }

    /// Returns `true` for [`Cell::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl Serialize for Cell {
    /// Missing serializes as `null`, present values as their text.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Value(text) => serializer.serialize_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logicals_use_fortran_literals() {
        assert_eq!(format_value(&Value::Bool(true)), ".true.");
        assert_eq!(format_value(&Value::Bool(false)), ".false.");
        assert_ne!(
            Cell::from_value(Some(&Value::Bool(true))),
            Cell::from_value(Some(&Value::String("true".into())))
        );
    }

    #[test]
    fn integers_and_integral_floats_agree() {
        assert_eq!(format_value(&Value::Int(1800)), "1800");
        assert_eq!(format_value(&Value::Float(1800.0)), "1800");
        assert_eq!(format_value(&Value::Int(-24)), "-24");
    }

    #[test]
    fn floats() {
        assert_eq!(format_value(&Value::Float(0.5)), "0.5");
        assert_eq!(format_value(&Value::Float(1e-4)), "0.0001");
        assert_eq!(format_value(&Value::Float(1e-5)), "0.00001");
        assert_eq!(format_value(&Value::Float(1e-7)), "1e-7");
        assert_eq!(format_value(&Value::Float(-2.5e-9)), "-2.5e-9");
        assert_eq!(format_value(&Value::Float(1e21)), "1e21");
        assert_eq!(format_value(&Value::Float(-0.0)), "0");
        assert_eq!(format_value(&Value::Float(f64::NAN)), "NaN");
        assert_eq!(format_value(&Value::Float(f64::NEG_INFINITY)), "-Infinity");
    }

    #[test]
    fn lists_join_and_recurse() {
        let v = Value::List(vec![
            Value::Int(0),
            Value::List(vec![Value::Int(-24), Value::Bool(true)]),
            Value::String("T".into()),
        ]);
        assert_eq!(format_value(&v), "0, -24, .true., T");
    }

    #[test]
    fn strings_verbatim() {
        assert_eq!(format_value(&Value::String("ZM".into())), "ZM");
        assert_eq!(format_value(&Value::String(String::new())), "");
    }

    #[test]
    fn missing_never_equals_present() {
        let missing = Cell::from_value(None);
        assert!(missing.is_missing());
        assert_eq!(missing.text(), MISSING_MARKER);
        for present in [
            Value::String(String::new()),
            Value::String("null".into()),
            Value::String(MISSING_MARKER.into()),
            Value::Null,
        ] {
            assert_ne!(missing, Cell::from_value(Some(&present)));
        }
    }

    #[test]
    fn cell_serialization() {
        assert_eq!(serde_json::to_string(&Cell::Missing).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&Cell::Value("1800".into())).unwrap(),
            "\"1800\""
        );
    }
}
