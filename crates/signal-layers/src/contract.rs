//! The input contract handed to a component.

use indexmap::IndexMap;
use serde::Serialize;

use crate::value::Value;

/// Errors raised while building a contract from external input.
///
/// Resolution itself never fails; these only occur at the boundary where
/// JSON documents or `key=value` arguments are turned into a [`Contract`].
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// The JSON document was not an object.
    #[error("contract must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },
    /// The JSON text failed to parse.
    #[error("invalid contract JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A `key=value` assignment had an empty key.
    #[error("invalid signal assignment '{0}': expected NAME or NAME=VALUE")]
    Assignment(String),
}

/// A flat, ordered mapping from signal name to value.
///
/// Toggles are booleans, data-carrying signals hold arbitrary values.
/// A contract is read-only for the duration of a resolution pass.
///
/// # Example
///
/// ```rust
/// use signal_layers::Contract;
///
/// let contract = Contract::new()
///     .flag("primary")
///     .flag("lg")
///     .set("children", "Save");
///
/// assert!(contract.is_on("primary"));
/// assert!(!contract.is_on("ghost"));
/// assert_eq!(contract.text("children"), Some("Save"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Contract {
    signals: IndexMap<String, Value>,
}

impl Contract {
    /// Creates an empty contract.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a toggle signal to `true`, returning the contract for chaining.
    pub fn flag(self, name: &str) -> Self {
        self.set(name, true)
    }

    /// Sets a signal to any value, returning the contract for chaining.
    pub fn set<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a signal in place. A later value replaces an earlier one.
    pub fn insert<V: Into<Value>>(&mut self, name: &str, value: V) {
        self.signals.insert(name.to_string(), value.into());
    }

    /// Returns the raw value of a signal, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.signals.get(name)
    }

    /// Returns `true` if the signal is present, even when falsy.
    pub fn contains(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    /// Returns `true` if the signal is present and truthy.
    pub fn is_on(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_truthy)
    }

    /// Returns the signal as text when it holds a string.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.signals.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Builds a contract from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ContractError> {
        match json {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect()),
            other => Err(ContractError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Parses JSON text into a contract.
    pub fn from_json_str(text: &str) -> Result<Self, ContractError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(json)
    }

    /// Builds a contract from command-line style assignments.
    ///
    /// `NAME` alone sets a toggle; `NAME=VALUE` parses the value with
    /// [`Value::parse_literal`].
    ///
    /// ```rust
    /// use signal_layers::{Contract, Value};
    ///
    /// let contract = Contract::from_assignments(["primary", "label=Wi-Fi", "max=200"]).unwrap();
    /// assert!(contract.is_on("primary"));
    /// assert_eq!(contract.text("label"), Some("Wi-Fi"));
    /// assert_eq!(contract.get("max"), Some(&Value::Int(200)));
    /// ```
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut contract = Contract::new();
        for raw in assignments {
            let raw = raw.as_ref();
            let (name, value) = match raw.split_once('=') {
                Some((name, value)) => (name.trim(), Value::parse_literal(value)),
                None => (raw.trim(), Value::Bool(true)),
            };
            if name.is_empty() {
                return Err(ContractError::Assignment(raw.to_string()));
            }
            contract.insert(name, value);
        }
        Ok(contract)
    }

    /// Merges `other` over this contract; keys in `other` win.
    pub fn merged(mut self, other: &Contract) -> Self {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
        self
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Contract {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            signals: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_and_set() {
        let contract = Contract::new().flag("primary").set("count", 0);
        assert!(contract.is_on("primary"));
        assert!(contract.contains("count"));
        assert!(!contract.is_on("count"));
        assert!(!contract.contains("missing"));
    }

    #[test]
    fn test_insert_replaces_value() {
        let mut contract = Contract::new().flag("lg");
        contract.insert("lg", false);
        assert!(!contract.is_on("lg"));
        assert_eq!(contract.len(), 1);
    }

    #[test]
    fn test_from_json_object() {
        let contract = Contract::from_json_str(r#"{"primary": true, "children": "Go"}"#).unwrap();
        assert!(contract.is_on("primary"));
        assert_eq!(contract.text("children"), Some("Go"));
        assert_eq!(contract.keys().collect::<Vec<_>>(), vec!["primary", "children"]);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Contract::from_json_str("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_from_json_rejects_bad_syntax() {
        assert!(matches!(
            Contract::from_json_str("{oops"),
            Err(ContractError::Json(_))
        ));
    }

    #[test]
    fn test_from_assignments() {
        let contract = Contract::from_assignments(["lg", "disabled=false", "value=0.5"]).unwrap();
        assert!(contract.is_on("lg"));
        assert_eq!(contract.get("disabled"), Some(&Value::Bool(false)));
        assert_eq!(contract.get("value"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn test_from_assignments_rejects_empty_name() {
        let err = Contract::from_assignments(["=true"]).unwrap_err();
        assert!(matches!(err, ContractError::Assignment(raw) if raw == "=true"));
    }

    #[test]
    fn test_merged_prefers_other() {
        let base = Contract::new().flag("md").set("label", "a");
        let over = Contract::new().set("label", "b");
        let merged = base.merged(&over);
        assert!(merged.is_on("md"));
        assert_eq!(merged.text("label"), Some("b"));
    }
}
