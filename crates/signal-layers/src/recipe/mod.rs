//! Declarative component recipes.
//!
//! A [`Recipe`] captures a component's signal table as data: which layers it
//! declares, their defaults, the ordered override rules, the data fields it
//! forwards and the state it registers. Replaying a recipe through a
//! [`Resolver`] gives the same result as writing the component by hand.
//!
//! # Resolution Order
//!
//! 1. Layers are declared in `layers` order (this fixes the class order)
//! 2. `defaults` are written
//! 3. `state` entries are registered
//! 4. `data` entries are extracted
//! 5. `rules` are applied top to bottom, so a later rule overrides an
//!    earlier one on the same layer
//!
//! # Format
//!
//! ```yaml
//! name: button
//! layers: [color, size, hover]
//! defaults:
//!   color: bg-gray-800 text-white
//!   size: px-4 py-2
//!   hover: hover:scale-105
//! rules:
//!   - when: primary
//!     set: { color: bg-blue-600 text-white }
//!   - when: lg
//!     set: { size: px-6 py-3 text-lg }
//! data: [children]
//! ```
//!
//! Scoped layers are written `scope.name`; a bare name uses the recipe's
//! `config.default_scope`.

mod error;
mod rule;

pub use error::RecipeError;
pub use rule::{DataDecl, LayerRef, Rule, StateDecl};

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{DataPresencePolicy, ResolverConfig};
use crate::contract::Contract;
use crate::resolver::{Resolution, Resolver};
use crate::state::StateHost;
use crate::value::Value;

/// A declarative component definition.
///
/// # Example
///
/// ```rust
/// use signal_layers::{Contract, Recipe, Rule};
///
/// let recipe = Recipe::new("badge")
///     .layer("color")
///     .layer("size")
///     .with_default("color", "bg-gray-100")
///     .with_default("size", "text-xs")
///     .rule(Rule::when("danger").set("color", "bg-red-600 text-white"));
/// recipe.validate().unwrap();
///
/// let out = recipe.resolve_stateless(&Contract::new().flag("danger"));
/// assert_eq!(out.classes("root"), "bg-red-600 text-white text-xs");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Recipe {
    name: String,
    config: ResolverConfig,
    layers: Vec<String>,
    defaults: IndexMap<String, String>,
    state: Vec<StateDecl>,
    data: Vec<DataDecl>,
    rules: Vec<Rule>,
}

impl Recipe {
    /// Creates an empty recipe.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Parses and validates a YAML recipe.
    pub fn from_yaml(text: &str) -> Result<Self, RecipeError> {
        let recipe: Recipe = serde_yaml::from_str(text)?;
        recipe.validate()?;
        tracing::debug!(
            recipe = %recipe.name,
            layers = recipe.layers.len(),
            rules = recipe.rules.len(),
            "loaded recipe"
        );
        Ok(recipe)
    }

    /// Reads, parses and validates a YAML recipe file.
    ///
    /// A recipe without a `name` takes the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RecipeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RecipeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut recipe = Self::from_yaml(&text)?;
        if recipe.name.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                recipe.name = stem.to_string();
            }
        }
        Ok(recipe)
    }

    /// Serializes the recipe back to YAML.
    pub fn to_yaml(&self) -> Result<String, RecipeError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Declares a layer (`name` or `scope.name`).
    pub fn layer(mut self, layer: &str) -> Self {
        self.layers.push(layer.to_string());
        self
    }

    /// Sets a layer's default value.
    pub fn with_default(mut self, layer: &str, value: &str) -> Self {
        self.defaults.insert(layer.to_string(), value.to_string());
        self
    }

    /// Registers a state entry.
    pub fn state(mut self, name: &str, priority: u32, initial: impl Into<Value>) -> Self {
        self.state.push(StateDecl::new(name, priority, initial));
        self
    }

    /// Forwards a contract key under its own name.
    pub fn data(mut self, name: &str) -> Self {
        self.data.push(DataDecl::new(name));
        self
    }

    /// Forwards contract `key` as `name`.
    pub fn data_from(mut self, name: &str, key: &str) -> Self {
        self.data.push(DataDecl::from_key(name, key));
        self
    }

    /// Forwards contract `key` as `name` with its own presence policy.
    pub fn data_with(mut self, name: &str, key: &str, policy: DataPresencePolicy) -> Self {
        self.data
            .push(DataDecl::from_key(name, key).with_policy(policy));
        self
    }

    /// Appends an override rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn defaults(&self) -> &IndexMap<String, String> {
        &self.defaults
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn data_decls(&self) -> &[DataDecl] {
        &self.data
    }

    pub fn state_decls(&self) -> &[StateDecl] {
        &self.state
    }

    /// Contract keys the rules react to, in first-use order.
    pub fn signal_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .flat_map(|rule| {
                rule.when
                    .iter()
                    .map(String::as_str)
                    .chain(rule.copy.values().map(String::as_str))
            })
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Scopes declared by the recipe, in declaration order.
    pub fn scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = Vec::new();
        for raw in &self.layers {
            if let Ok(layer) = LayerRef::parse(raw) {
                let scope = layer.scope_or(&self.config.default_scope);
                if !scopes.iter().any(|s| s == scope) {
                    scopes.push(scope.to_string());
                }
            }
        }
        scopes
    }

    /// Checks that every write targets a declared layer and every rule has
    /// a condition it can meet.
    pub fn validate(&self) -> Result<(), RecipeError> {
        let default_scope = self.config.default_scope.as_str();

        let mut declared: HashSet<(String, String)> = HashSet::new();
        for raw in &self.layers {
            let layer = LayerRef::parse(raw)?;
            if !declared.insert(layer.qualified(default_scope)) {
                return Err(RecipeError::DuplicateLayer { layer: raw.clone() });
            }
        }

        let check = |context: &dyn Fn() -> String, raw: &str| -> Result<(), RecipeError> {
            let layer = LayerRef::parse(raw)?;
            if declared.contains(&layer.qualified(default_scope)) {
                Ok(())
            } else {
                Err(RecipeError::UndeclaredLayer {
                    context: context(),
                    layer: raw.to_string(),
                })
            }
        };

        for raw in self.defaults.keys() {
            check(&|| "defaults".to_string(), raw)?;
        }

        let states: HashSet<&str> = self.state.iter().map(|s| s.name.as_str()).collect();

        // Replays promotion: only a priority above every earlier one is exposed.
        let mut high_water = 0;
        let mut exposed: HashSet<&str> = HashSet::new();
        for decl in &self.state {
            if decl.priority > high_water {
                high_water = decl.priority;
                exposed.insert(decl.name.as_str());
            }
        }

        for (i, rule) in self.rules.iter().enumerate() {
            if !rule.has_condition() {
                return Err(RecipeError::EmptyCondition { rule: i });
            }
            if let Some(state) = &rule.when_state {
                if !states.contains(state.as_str()) {
                    return Err(RecipeError::UnknownState {
                        rule: i,
                        state: state.clone(),
                    });
                }
                if !exposed.contains(state.as_str()) {
                    return Err(RecipeError::UnexposedState {
                        rule: i,
                        state: state.clone(),
                    });
                }
            }
            for raw in rule.set.keys().chain(rule.copy.keys()) {
                check(&|| format!("rule {}", i), raw)?;
            }
        }

        Ok(())
    }

    /// Resolves a contract with state cells kept in `host`.
    pub fn resolve(&self, contract: &Contract, host: &dyn StateHost) -> Resolution {
        self.resolve_with(contract, host, self.config.clone())
    }

    /// Resolves a contract with an explicit configuration.
    pub fn resolve_with(
        &self,
        contract: &Contract,
        host: &dyn StateHost,
        config: ResolverConfig,
    ) -> Resolution {
        let pass = Resolver::new(contract, host).with_config(config);
        self.apply(&pass);
        pass.finish()
    }

    /// Resolves a contract with throwaway state.
    pub fn resolve_stateless(&self, contract: &Contract) -> Resolution {
        let pass = Resolver::stateless(contract).with_config(self.config.clone());
        self.apply(&pass);
        pass.finish()
    }

    /// Replays the recipe into a pass in progress.
    ///
    /// Malformed layer references are skipped; [`validate`](Recipe::validate)
    /// reports them up front.
    pub fn apply(&self, pass: &Resolver<'_>) {
        for raw in &self.layers {
            if let Some(layer) = parse_or_skip(raw) {
                pass.layer_in(layer.scope_or(&pass.config().default_scope), &layer.name);
            }
        }

        for (raw, value) in &self.defaults {
            write(pass, raw, value);
        }

        for decl in &self.state {
            pass.state(&decl.name, decl.priority, decl.initial.clone());
        }

        for decl in &self.data {
            let policy = decl.policy.unwrap_or(pass.config().data_presence);
            pass.data_with(&decl.name, &decl.key, policy);
        }

        for rule in &self.rules {
            if !rule.matches(pass) {
                continue;
            }
            for (raw, value) in &rule.set {
                write(pass, raw, value);
            }
            for (raw, key) in &rule.copy {
                if let Some(value) = pass.contract().get(key).filter(|v| v.is_truthy()) {
                    write(pass, raw, &value.to_string());
                }
            }
        }
    }
}

fn parse_or_skip(raw: &str) -> Option<LayerRef> {
    match LayerRef::parse(raw) {
        Ok(layer) => Some(layer),
        Err(err) => {
            tracing::warn!(%err, "skipping layer reference");
            None
        }
    }
}

fn write(pass: &Resolver<'_>, raw: &str, value: &str) {
    if let Some(layer) = parse_or_skip(raw) {
        pass.layer_in(layer.scope_or(&pass.config().default_scope), &layer.name)
            .set(value);
    }
}
