//! Building blocks of a recipe: layer references, rules, data and state entries.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::RecipeError;
use crate::config::DataPresencePolicy;
use crate::resolver::Resolver;
use crate::value::Value;

/// A parsed layer reference: `name` (default scope) or `scope.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerRef {
    pub scope: Option<String>,
    pub name: String,
}

impl LayerRef {
    /// Parses `name` or `scope.name`.
    pub fn parse(raw: &str) -> Result<Self, RecipeError> {
        let raw = raw.trim();
        let invalid = || RecipeError::InvalidLayerRef(raw.to_string());

        match raw.split_once('.') {
            Some((scope, name)) => {
                if scope.is_empty() || name.is_empty() || name.contains('.') {
                    return Err(invalid());
                }
                Ok(Self {
                    scope: Some(scope.to_string()),
                    name: name.to_string(),
                })
            }
            None if raw.is_empty() => Err(invalid()),
            None => Ok(Self {
                scope: None,
                name: raw.to_string(),
            }),
        }
    }

    /// The explicit scope, or `default` when none was given.
    pub fn scope_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.scope.as_deref().unwrap_or(default)
    }

    /// `(scope, name)` with the default scope filled in.
    pub fn qualified(&self, default: &str) -> (String, String) {
        (self.scope_or(default).to_string(), self.name.clone())
    }
}

impl fmt::Display for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}.{}", scope, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A conditional override.
///
/// The rule fires when every signal in `when` is truthy and, if
/// `when_state` is set, the state exposed under that name is truthy. A
/// firing rule writes each `set` value into its layer and copies the text
/// of each `copy` contract key into its layer.
///
/// In YAML, `when` accepts a single signal or a list:
///
/// ```yaml
/// - when: primary
///   set: { color: "bg-blue-600 text-white" }
/// - when: [checked, lg]
///   set: { thumb.position: translate-x-6 }
/// - when: className
///   copy: { escape: className }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rule {
    #[serde(deserialize_with = "one_or_many")]
    pub when: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_state: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub set: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub copy: IndexMap<String, String>,
}

impl Rule {
    /// A rule conditioned on one signal.
    pub fn when(signal: &str) -> Self {
        Self::when_all([signal])
    }

    /// A rule conditioned on every listed signal.
    pub fn when_all<I, S>(signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            when: signals.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A rule conditioned on an exposed state being truthy.
    pub fn when_state(state: &str) -> Self {
        Self {
            when_state: Some(state.to_string()),
            ..Self::default()
        }
    }

    /// Adds a state condition to a signal rule.
    pub fn and_state(mut self, state: &str) -> Self {
        self.when_state = Some(state.to_string());
        self
    }

    /// Adds a layer write.
    pub fn set(mut self, layer: &str, value: &str) -> Self {
        self.set.insert(layer.to_string(), value.to_string());
        self
    }

    /// Adds a layer write taking its value from a contract key.
    pub fn copy(mut self, layer: &str, key: &str) -> Self {
        self.copy.insert(layer.to_string(), key.to_string());
        self
    }

    pub fn has_condition(&self) -> bool {
        !self.when.is_empty() || self.when_state.is_some()
    }

    /// Evaluates the condition against a pass in progress.
    pub(crate) fn matches(&self, pass: &Resolver<'_>) -> bool {
        if !self.has_condition() {
            return false;
        }
        let signals_on = self.when.iter().all(|signal| pass.on(signal));
        let state_on = match &self.when_state {
            Some(name) => pass.exposed_state(name).is_some_and(|h| h.is_on()),
            None => true,
        };
        signals_on && state_on
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(signal) => vec![signal],
        OneOrMany::Many(signals) => signals,
    })
}

/// A data extraction: copy contract `key` into the payload as `name`.
///
/// In YAML, either a bare name or a mapping:
///
/// ```yaml
/// data:
///   - children
///   - { name: aria-label, key: ariaLabel }
///   - { name: checked, policy: defined }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DataDeclRepr")]
pub struct DataDecl {
    pub name: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<DataPresencePolicy>,
}

impl DataDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: name.to_string(),
            policy: None,
        }
    }

    pub fn from_key(name: &str, key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::new(name)
        }
    }

    pub fn with_policy(mut self, policy: DataPresencePolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataDeclRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        policy: Option<DataPresencePolicy>,
    },
}

impl From<DataDeclRepr> for DataDecl {
    fn from(repr: DataDeclRepr) -> Self {
        match repr {
            DataDeclRepr::Name(name) => DataDecl::new(&name),
            DataDeclRepr::Full { name, key, policy } => DataDecl {
                key: key.unwrap_or_else(|| name.clone()),
                name,
                policy,
            },
        }
    }
}

/// A state registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDecl {
    pub name: String,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub initial: Value,
}

impl StateDecl {
    pub fn new(name: &str, priority: u32, initial: impl Into<Value>) -> Self {
        Self {
            name: name.to_string(),
            priority,
            initial: initial.into(),
        }
    }
}
