//! Resolver configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layers::DEFAULT_SCOPE;
use crate::value::Value;

/// When a data signal counts as present.
///
/// Components disagree on this: most only forward truthy values, while form
/// controls must forward an explicit `false` or `0` (a `checked: false`
/// that never reaches the element is a bug).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataPresencePolicy {
    /// Present when the key exists and its value is truthy.
    #[default]
    Truthy,
    /// Present whenever the key exists, whatever its value.
    Defined,
}

impl DataPresencePolicy {
    /// Returns `true` if `value` should be copied into the payload.
    pub fn admits(self, value: Option<&Value>) -> bool {
        match self {
            DataPresencePolicy::Truthy => value.is_some_and(Value::is_truthy),
            DataPresencePolicy::Defined => value.is_some(),
        }
    }
}

impl fmt::Display for DataPresencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataPresencePolicy::Truthy => f.write_str("truthy"),
            DataPresencePolicy::Defined => f.write_str("defined"),
        }
    }
}

impl FromStr for DataPresencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "truthy" => Ok(DataPresencePolicy::Truthy),
            "defined" => Ok(DataPresencePolicy::Defined),
            other => Err(format!(
                "unknown data presence policy '{}' (expected 'truthy' or 'defined')",
                other
            )),
        }
    }
}

/// Settings for a resolution pass.
///
/// # Example
///
/// ```rust
/// use signal_layers::{DataPresencePolicy, ResolverConfig};
///
/// let config = ResolverConfig::new()
///     .with_default_scope("switch")
///     .with_data_presence(DataPresencePolicy::Defined);
/// assert_eq!(config.default_scope, "switch");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Scope used by layers declared without one.
    pub default_scope: String,
    /// Presence rule applied by `data()` calls without an explicit policy.
    pub data_presence: DataPresencePolicy,
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_scope(mut self, scope: &str) -> Self {
        self.default_scope = scope.to_string();
        self
    }

    pub fn with_data_presence(mut self, policy: DataPresencePolicy) -> Self {
        self.data_presence = policy;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_scope: DEFAULT_SCOPE.to_string(),
            data_presence: DataPresencePolicy::Truthy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_policy() {
        let policy = DataPresencePolicy::Truthy;
        assert!(policy.admits(Some(&Value::Text("x".into()))));
        assert!(!policy.admits(Some(&Value::Bool(false))));
        assert!(!policy.admits(Some(&Value::Int(0))));
        assert!(!policy.admits(None));
    }

    #[test]
    fn test_defined_policy() {
        let policy = DataPresencePolicy::Defined;
        assert!(policy.admits(Some(&Value::Bool(false))));
        assert!(policy.admits(Some(&Value::Int(0))));
        assert!(policy.admits(Some(&Value::Null)));
        assert!(!policy.admits(None));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("defined".parse(), Ok(DataPresencePolicy::Defined));
        assert_eq!("truthy".parse(), Ok(DataPresencePolicy::Truthy));
        assert!("strict".parse::<DataPresencePolicy>().is_err());
        assert_eq!(DataPresencePolicy::Defined.to_string(), "defined");
    }

    #[test]
    fn test_config_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.default_scope, DEFAULT_SCOPE);
        assert_eq!(config.data_presence, DataPresencePolicy::Truthy);
    }

    #[test]
    fn test_config_from_yaml_partial() {
        let config: ResolverConfig = serde_yaml::from_str("data_presence: defined\n").unwrap();
        assert_eq!(config.default_scope, DEFAULT_SCOPE);
        assert_eq!(config.data_presence, DataPresencePolicy::Defined);
    }
}
