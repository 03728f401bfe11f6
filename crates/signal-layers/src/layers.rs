//! Layer tables and class serialization.
//!
//! A layer is a single-valued slot identified by `(scope, name)`. Writing a
//! layer replaces whatever it held before, so within one pass the last write
//! wins. [`Layers`] holds the slots of one scope in declaration order and
//! [`LayerSet`] holds every scope of a pass.

use indexmap::IndexMap;
use serde::Serialize;

/// Scope used when a layer is declared without one.
pub const DEFAULT_SCOPE: &str = "root";

/// The layers of a single scope, in declaration order.
///
/// # Example
///
/// ```rust
/// use signal_layers::Layers;
///
/// let layers: Layers = [("a", Some("x")), ("b", None), ("c", Some("y"))]
///     .into_iter()
///     .collect();
/// assert_eq!(layers.classes(), "x y");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Layers {
    slots: IndexMap<String, Option<String>>,
}

impl Layers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an empty slot. Re-declaring keeps the slot's value and position.
    pub fn declare(&mut self, name: &str) {
        if !self.slots.contains_key(name) {
            self.slots.insert(name.to_string(), None);
        }
    }

    /// Writes a slot, replacing its previous value.
    ///
    /// An undeclared slot is declared on first write.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.slots.get_mut(name) {
            Some(slot) => *slot = Some(value),
            None => {
                self.slots.insert(name.to_string(), Some(value));
            }
        }
    }

    /// Empties a slot without removing its declaration.
    pub fn clear(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            *slot = None;
        }
    }

    /// Returns the current winner of a slot.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.slots.get(name).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Iterates `(name, winner)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Iterates the non-empty winners in declaration order.
    pub fn winners(&self) -> impl Iterator<Item = &str> {
        self.slots
            .values()
            .filter_map(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Joins the winners with single spaces, dropping empty slots.
    pub fn classes(&self) -> String {
        join_classes(self.winners())
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for Layers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, Option<V>)>>(iter: T) -> Self {
        Self {
            slots: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.map(Into::into)))
                .collect(),
        }
    }
}

/// Every scope's layers for one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayerSet {
    scopes: IndexMap<String, Layers>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a slot in a scope, creating the scope if needed.
    pub fn declare(&mut self, scope: &str, name: &str) {
        self.scope_mut(scope).declare(name);
    }

    /// Writes a slot in a scope, replacing its previous value.
    pub fn set(&mut self, scope: &str, name: &str, value: impl Into<String>) {
        self.scope_mut(scope).set(name, value);
    }

    pub fn get(&self, scope: &str, name: &str) -> Option<&str> {
        self.scope(scope).and_then(|layers| layers.get(name))
    }

    pub fn scope(&self, scope: &str) -> Option<&Layers> {
        self.scopes.get(scope)
    }

    fn scope_mut(&mut self, scope: &str) -> &mut Layers {
        self.scopes.entry(scope.to_string()).or_default()
    }

    /// Iterates scopes in the order they were first declared.
    pub fn scopes(&self) -> impl Iterator<Item = (&str, &Layers)> {
        self.scopes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Class string of one scope; empty when the scope was never declared.
    pub fn classes_for(&self, scope: &str) -> String {
        self.scope(scope).map(Layers::classes).unwrap_or_default()
    }

    /// One class string spanning every scope, in scope then layer order.
    pub fn classes(&self) -> String {
        join_classes(self.scopes.values().flat_map(Layers::winners))
    }
}

/// Serializes one scope's layers into a class string.
///
/// Winners are joined with a single space, empty layers are dropped and
/// declaration order is kept. An empty table yields an empty string.
pub fn classes(layers: &Layers) -> String {
    layers.classes()
}

fn join_classes<'a>(winners: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for winner in winners {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(winner);
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn last_write_wins(
            scope in "[a-z]{1,6}",
            name in "[a-z]{1,6}",
            first in "[a-z0-9:-]{1,12}",
            second in "[a-z0-9:-]{1,12}",
        ) {
            prop_assume!(first != second);
            let mut set = LayerSet::new();
            set.set(&scope, &name, first.clone());
            set.set(&scope, &name, second.clone());

            let out = set.classes_for(&scope);
            prop_assert_eq!(&out, &second);
            prop_assert!(!out.split(' ').any(|c| c == first));
        }

        #[test]
        fn classes_has_one_token_per_winner(
            values in prop::collection::vec(prop::option::of("[a-z]{1,8}"), 0..8),
        ) {
            let layers: Layers = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("l{}", i), v.clone()))
                .collect();
            let expected: Vec<&str> = values.iter().filter_map(|v| v.as_deref()).collect();
            prop_assert_eq!(layers.classes(), expected.join(" "));
        }
    }
}
