//! Attribute values
//!
//! Features carry loosely typed attributes, as found in the source datasets.
//! Values keep their JSON type so that stringification matches what a user
//! sees in an attribute table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single attribute value. `Null` covers both absent and explicit nulls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Null, blank text, or the literal string "null" in any case.
    pub fn is_missing(&self) -> bool {
        match self {
            AttrValue::Null => true,
            other => {
                let s = other.to_string();
                let t = s.trim();
                t.is_empty() || t.eq_ignore_ascii_case("null")
            }
        }
    }

    /// Stringified, trimmed value. `None` for nulls only: empty strings are kept.
    pub fn as_trimmed(&self) -> Option<String> {
        match self {
            AttrValue::Null => None,
            other => Some(other.to_string().trim().to_string()),
        }
    }

    /// Raw text form, `None` for nulls.
    pub fn as_text(&self) -> Option<String> {
        match self {
            AttrValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "NULL"),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Float(x) => write!(f, "{}", x),
            AttrValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Int(i64::from(i))
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        AttrValue::Float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values() {
        assert!(AttrValue::Null.is_missing());
        assert!(AttrValue::from("   ").is_missing());
        assert!(AttrValue::from("NuLL").is_missing());
        assert!(AttrValue::from(" null ").is_missing());
        assert!(!AttrValue::from("nullable").is_missing());
        assert!(!AttrValue::Int(0).is_missing());
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<AttrValue> = serde_json::from_str(r#"[null, 3, 2.5, "x", true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                AttrValue::Null,
                AttrValue::Int(3),
                AttrValue::Float(2.5),
                AttrValue::from("x"),
                AttrValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_trimmed_keeps_empty_strings() {
        assert_eq!(AttrValue::from("  A1 ").as_trimmed().as_deref(), Some("A1"));
        assert_eq!(AttrValue::from("").as_trimmed().as_deref(), Some(""));
        assert_eq!(AttrValue::Null.as_trimmed(), None);
        assert_eq!(AttrValue::Int(42).as_trimmed().as_deref(), Some("42"));
    }
}
