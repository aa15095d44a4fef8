//! Typed parameter extraction with descriptive validation errors.
//!
//! Handlers receive raw JSON maps from the transport; everything here
//! rejects wrong types, out-of-range integers, and unknown enum values
//! before any upstream work happens.

use std::collections::BTreeMap;

use serde_json::Value;

use research_core::{ResearchError, Result};

pub type Args = serde_json::Map<String, Value>;

pub fn require_str(args: &Args, key: &str) -> Result<String> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(ResearchError::InputInvalid(format!(
            "Parameter '{key}' must not be empty"
        ))),
        Some(_) => Err(ResearchError::InputInvalid(format!(
            "Parameter '{key}' must be a string"
        ))),
        None => Err(ResearchError::InputInvalid(format!(
            "Missing required parameter '{key}'"
        ))),
    }
}

pub fn opt_str(args: &Args, key: &str) -> Result<Option<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(ResearchError::InputInvalid(format!(
            "Parameter '{key}' must be a string"
        ))),
    }
}

pub fn bool_or(args: &Args, key: &str, default: bool) -> Result<bool> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ResearchError::InputInvalid(format!(
            "Parameter '{key}' must be a boolean"
        ))),
    }
}

/// Integer bounded to `[min, max]`; out-of-range values are rejected, not
/// clamped, so callers learn the real contract.
pub fn int_in_range(args: &Args, key: &str, min: i64, max: i64, default: i64) -> Result<i64> {
    let value = match args.get(key) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            ResearchError::InputInvalid(format!("Parameter '{key}' must be an integer"))
        })?,
        Some(_) => {
            return Err(ResearchError::InputInvalid(format!(
                "Parameter '{key}' must be an integer"
            )))
        }
    };
    if value < min || value > max {
        return Err(ResearchError::InputInvalid(format!(
            "Parameter '{key}' must be between {min} and {max} (got {value})"
        )));
    }
    Ok(value)
}

/// Enum-valued string with a default.
pub fn enum_or(args: &Args, key: &str, allowed: &[&str], default: &str) -> Result<String> {
    let value = match opt_str(args, key)? {
        Some(v) => v.to_ascii_lowercase(),
        None => return Ok(default.to_string()),
    };
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(ResearchError::InputInvalid(format!(
            "Parameter '{key}' must be one of {allowed:?} (got '{value}')"
        )))
    }
}

pub fn opt_str_array(args: &Args, key: &str) -> Result<Option<Vec<String>>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
                    _ => {
                        return Err(ResearchError::InputInvalid(format!(
                            "Parameter '{key}' must be an array of non-empty strings"
                        )))
                    }
                }
            }
            Ok(Some(out))
        }
        Some(_) => Err(ResearchError::InputInvalid(format!(
            "Parameter '{key}' must be an array of strings"
        ))),
    }
}

pub fn opt_str_map(args: &Args, key: &str) -> Result<Option<BTreeMap<String, String>>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => {
            let mut out = BTreeMap::new();
            for (name, value) in map {
                let Value::String(s) = value else {
                    return Err(ResearchError::InputInvalid(format!(
                        "Parameter '{key}' must map names to selector strings"
                    )));
                };
                out.insert(name.clone(), s.clone());
            }
            Ok(Some(out))
        }
        Some(_) => Err(ResearchError::InputInvalid(format!(
            "Parameter '{key}' must be an object"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Args {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn require_str_rejects_missing_empty_and_wrong_type() {
        let a = args(json!({"q": "ok", "empty": "  ", "num": 7}));
        assert_eq!(require_str(&a, "q").unwrap(), "ok");
        assert!(require_str(&a, "empty").is_err());
        assert!(require_str(&a, "num").is_err());
        assert!(require_str(&a, "missing").is_err());
    }

    #[test]
    fn int_in_range_rejects_out_of_range() {
        let a = args(json!({"n": 15}));
        assert!(int_in_range(&a, "n", 1, 10, 5).is_err());
        assert_eq!(int_in_range(&a, "absent", 1, 10, 5).unwrap(), 5);
        let ok = args(json!({"n": 10}));
        assert_eq!(int_in_range(&ok, "n", 1, 10, 5).unwrap(), 10);
    }

    #[test]
    fn enum_or_accepts_listed_values_only() {
        let a = args(json!({"category": "it", "bad": "nope"}));
        assert_eq!(
            enum_or(&a, "category", &["general", "it"], "general").unwrap(),
            "it"
        );
        assert!(enum_or(&a, "bad", &["general", "it"], "general").is_err());
        assert_eq!(
            enum_or(&a, "absent", &["general", "it"], "general").unwrap(),
            "general"
        );
    }
}
