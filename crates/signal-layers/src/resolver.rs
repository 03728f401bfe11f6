//! The signal resolver.
//!
//! A [`Resolver`] is created once per resolution pass. It reads a
//! [`Contract`] and accumulates three pass-local tables:
//!
//! - layers, written through [`LayerSlot`] setters (last write wins)
//! - the data payload, filled by [`Resolver::data`]
//! - the state ledger, fed by [`Resolver::state`]
//!
//! Nothing in a pass fails. Unknown or falsy signals simply have no effect,
//! which yields a shorter class string or a missing payload field.
//!
//! # Example
//!
//! ```rust
//! use signal_layers::{Contract, Resolver};
//!
//! let contract = Contract::new().flag("primary").set("children", "Save");
//! let pass = Resolver::stateless(&contract);
//!
//! let color = pass.layer("color");
//! let size = pass.layer("size");
//!
//! color.set("bg-gray-800 text-white");
//! size.set("px-4 py-2");
//! color.set_if(pass.on("primary"), "bg-blue-600 text-white");
//! pass.data("children");
//!
//! let out = pass.finish();
//! assert_eq!(out.classes("root"), "bg-blue-600 text-white px-4 py-2");
//! assert_eq!(out.payload().text("children"), Some("Save"));
//! ```

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{DataPresencePolicy, ResolverConfig};
use crate::contract::Contract;
use crate::layers::LayerSet;
use crate::state::{Cells, StateHandle, StateHost, StateLedger};
use crate::value::Value;

/// Data signals extracted from a contract, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload {
    fields: IndexMap<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn is_on(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_truthy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }
}

/// Setter for one `(scope, name)` layer.
///
/// Returned by [`Resolver::layer`]. Each call to [`set`](LayerSlot::set)
/// replaces the layer's value for the rest of the pass.
#[derive(Clone)]
pub struct LayerSlot<'r> {
    layers: &'r RefCell<LayerSet>,
    scope: String,
    name: String,
}

impl LayerSlot<'_> {
    /// Makes `value` the layer's winner, overwriting any earlier value.
    pub fn set(&self, value: impl Into<String>) {
        let value = value.into();
        tracing::trace!(scope = %self.scope, layer = %self.name, value = %value, "layer write");
        self.layers.borrow_mut().set(&self.scope, &self.name, value);
    }

    /// Writes `value` only when `condition` holds. Returns `condition`.
    pub fn set_if(&self, condition: bool, value: impl Into<String>) -> bool {
        if condition {
            self.set(value);
        }
        condition
    }

    /// The layer's current winner.
    pub fn get(&self) -> Option<String> {
        self.layers
            .borrow()
            .get(&self.scope, &self.name)
            .map(str::to_string)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for LayerSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerSlot")
            .field("scope", &self.scope)
            .field("name", &self.name)
            .finish()
    }
}

enum Host<'a> {
    Borrowed(&'a dyn StateHost),
    Local(Cells),
}

impl Host<'_> {
    fn get(&self) -> &dyn StateHost {
        match self {
            Host::Borrowed(host) => *host,
            Host::Local(cells) => cells,
        }
    }
}

/// One resolution pass over a contract.
///
/// All tables are owned by the resolver, so passes running side by side
/// (for example when rendering many components on a server) never see each
/// other's writes. Only state cells outlive the pass; they belong to the
/// [`StateHost`] supplied by the caller.
pub struct Resolver<'a> {
    contract: &'a Contract,
    host: Host<'a>,
    config: ResolverConfig,
    layers: RefCell<LayerSet>,
    payload: RefCell<Payload>,
    ledger: RefCell<StateLedger>,
}

impl<'a> Resolver<'a> {
    /// Starts a pass whose state cells live in `host`.
    pub fn new(contract: &'a Contract, host: &'a dyn StateHost) -> Self {
        Self::with_host(contract, Host::Borrowed(host))
    }

    /// Starts a pass with a throwaway state store.
    ///
    /// Suitable for components without state; cells created here are lost
    /// when the pass ends.
    pub fn stateless(contract: &'a Contract) -> Self {
        Self::with_host(contract, Host::Local(Cells::new()))
    }

    fn with_host(contract: &'a Contract, host: Host<'a>) -> Self {
        Self {
            contract,
            host,
            config: ResolverConfig::default(),
            layers: RefCell::new(LayerSet::new()),
            payload: RefCell::new(Payload::new()),
            ledger: RefCell::new(StateLedger::new()),
        }
    }

    /// Replaces the pass configuration.
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn contract(&self) -> &'a Contract {
        self.contract
    }

    /// Returns `true` if the contract carries `signal` with a truthy value.
    pub fn on(&self, signal: &str) -> bool {
        self.contract.is_on(signal)
    }

    /// Returns the contract's text value for `signal`.
    pub fn text(&self, signal: &str) -> Option<&'a str> {
        self.contract.text(signal)
    }

    /// Declares a layer in the default scope and returns its setter.
    pub fn layer(&self, name: &str) -> LayerSlot<'_> {
        let scope = self.config.default_scope.clone();
        self.slot(scope, name)
    }

    /// Declares a layer in `scope` and returns its setter.
    pub fn layer_in(&self, scope: &str, name: &str) -> LayerSlot<'_> {
        self.slot(scope.to_string(), name)
    }

    fn slot(&self, scope: String, name: &str) -> LayerSlot<'_> {
        self.layers.borrow_mut().declare(&scope, name);
        LayerSlot {
            layers: &self.layers,
            scope,
            name: name.to_string(),
        }
    }

    /// Copies `contract[name]` into the payload under `name`.
    pub fn data(&self, name: &str) -> bool {
        self.data_from(name, name)
    }

    /// Copies `contract[key]` into the payload under `name`, using the
    /// configured presence policy.
    pub fn data_from(&self, name: &str, key: &str) -> bool {
        self.data_with(name, key, self.config.data_presence)
    }

    /// Copies `contract[key]` into the payload under `name` when `policy`
    /// admits it. Returns whether the field was written.
    pub fn data_with(&self, name: &str, key: &str, policy: DataPresencePolicy) -> bool {
        let value = self.contract.get(key);
        if !policy.admits(value) {
            return false;
        }
        let Some(value) = value else {
            return false;
        };
        tracing::trace!(field = name, key, %policy, "data extracted");
        self.payload.borrow_mut().insert(name, value.clone());
        true
    }

    /// Returns a payload field extracted earlier in this pass.
    pub fn data_value(&self, name: &str) -> Option<Value> {
        self.payload.borrow().get(name).cloned()
    }

    /// Registers a state candidate.
    ///
    /// The host cell for `name` is created with `initial` on first use and
    /// reused afterwards, never reset. The candidate is promoted, and its
    /// handle returned, only if `priority` is positive and strictly greater
    /// than every priority promoted earlier in this pass. Priority `0`
    /// registers the cell without ever promoting it.
    pub fn state(
        &self,
        name: &str,
        priority: u32,
        initial: impl Into<Value>,
    ) -> Option<StateHandle> {
        let handle = self.host.get().cell(name, initial.into());
        self.ledger.borrow_mut().register(name, priority, handle)
    }

    /// The handle promoted under `name` in this pass, if any.
    pub fn exposed_state(&self, name: &str) -> Option<StateHandle> {
        self.ledger.borrow().exposed(name).cloned()
    }

    /// The highest-priority candidate registered so far.
    pub fn active_state(&self) -> Option<StateHandle> {
        self.ledger.borrow().active().map(|c| c.handle.clone())
    }

    /// Class string of one scope as it stands now.
    pub fn classes(&self, scope: &str) -> String {
        self.layers.borrow().classes_for(scope)
    }

    /// Ends the pass and hands back its tables.
    pub fn finish(self) -> Resolution {
        Resolution {
            layers: self.layers.into_inner(),
            payload: self.payload.into_inner(),
            ledger: self.ledger.into_inner(),
        }
    }
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("contract", &self.contract)
            .field("config", &self.config)
            .field("layers", &self.layers)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

/// The result of a finished pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    layers: LayerSet,
    payload: Payload,
    ledger: StateLedger,
}

impl Resolution {
    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn ledger(&self) -> &StateLedger {
        &self.ledger
    }

    /// Class string of one scope.
    pub fn classes(&self, scope: &str) -> String {
        self.layers.classes_for(scope)
    }

    /// One class string spanning every scope.
    pub fn all_classes(&self) -> String {
        self.layers.classes()
    }

    pub fn exposed_state(&self, name: &str) -> Option<&StateHandle> {
        self.ledger.exposed(name)
    }

    pub fn active_state(&self) -> Option<&StateHandle> {
        self.ledger.active().map(|c| &c.handle)
    }

    pub fn into_parts(self) -> (LayerSet, Payload, StateLedger) {
        (self.layers, self.payload, self.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Callback;

    #[test]
    fn test_layer_defaults_then_overrides() {
        let contract = Contract::new().flag("lg");
        let pass = Resolver::stateless(&contract);
        let size = pass.layer("size");
        size.set("px-4 py-2");
        size.set_if(pass.on("sm"), "px-3 py-1.5");
        size.set_if(pass.on("lg"), "px-6 py-3");
        assert_eq!(size.get().as_deref(), Some("px-6 py-3"));
        assert_eq!(pass.classes("root"), "px-6 py-3");
    }

    #[test]
    fn test_layer_uses_configured_default_scope() {
        let contract = Contract::new();
        let pass = Resolver::stateless(&contract)
            .with_config(ResolverConfig::new().with_default_scope("card"));
        pass.layer("base").set("rounded-md");
        assert_eq!(pass.classes("card"), "rounded-md");
        assert_eq!(pass.classes("root"), "");
    }

    #[test]
    fn test_declaration_order_not_write_order() {
        let contract = Contract::new();
        let pass = Resolver::stateless(&contract);
        let a = pass.layer("a");
        let b = pass.layer("b");
        b.set("second");
        a.set("first");
        assert_eq!(pass.classes("root"), "first second");
    }

    #[test]
    fn test_scoped_layers() {
        let contract = Contract::new();
        let pass = Resolver::stateless(&contract);
        pass.layer_in("thumb", "size").set("h-4 w-4");
        pass.layer_in("button", "size").set("h-4 w-8");
        let out = pass.finish();
        assert_eq!(out.classes("thumb"), "h-4 w-4");
        assert_eq!(out.classes("button"), "h-4 w-8");
        assert_eq!(out.all_classes(), "h-4 w-4 h-4 w-8");
    }

    #[test]
    fn test_data_truthy_policy() {
        let contract = Contract::new()
            .set("children", "Go")
            .set("disabled", false)
            .set("tabIndex", 0);
        let pass = Resolver::stateless(&contract);
        assert!(pass.data("children"));
        assert!(!pass.data("disabled"));
        assert!(!pass.data("tabIndex"));
        assert!(!pass.data("missing"));
        let out = pass.finish();
        assert_eq!(out.payload().len(), 1);
        assert!(!out.payload().contains("disabled"));
    }

    #[test]
    fn test_data_defined_policy() {
        let contract = Contract::new().set("checked", false);
        let pass = Resolver::stateless(&contract)
            .with_config(ResolverConfig::new().with_data_presence(DataPresencePolicy::Defined));
        assert!(pass.data("checked"));
        assert!(!pass.data("missing"));
        assert_eq!(pass.data_value("checked"), Some(Value::Bool(false)));
    }

    #[test]
    fn test_data_from_renames() {
        let contract = Contract::new().set("ariaLabel", "Close");
        let pass = Resolver::stateless(&contract);
        assert!(pass.data_from("aria-label", "ariaLabel"));
        let out = pass.finish();
        assert_eq!(out.payload().text("aria-label"), Some("Close"));
        assert!(!out.payload().contains("ariaLabel"));
    }

    #[test]
    fn test_data_preserves_callback_identity() {
        let cb = Callback::new(|_| Value::Null);
        let contract = Contract::new().set("onClick", cb.clone());
        let pass = Resolver::stateless(&contract);
        pass.data("onClick");
        let out = pass.finish();
        let extracted = out.payload().get("onClick").and_then(Value::as_callback);
        assert!(extracted.is_some_and(|e| e.ptr_eq(&cb)));
    }

    #[test]
    fn test_state_priority_arbitration() {
        let cells = Cells::new();
        let contract = Contract::new();
        let pass = Resolver::new(&contract, &cells);

        assert!(pass.state("internal", 0, false).is_none());
        assert!(pass.state("checked", 1, false).is_some());
        assert!(pass.state("forced", 1, true).is_none());

        assert!(pass.exposed_state("checked").is_some());
        assert!(pass.exposed_state("internal").is_none());
        assert_eq!(
            pass.active_state().map(|h| h.name().to_string()),
            Some("checked".to_string())
        );
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_state_cells_survive_passes() {
        let cells = Cells::new();
        let contract = Contract::new();

        let first = Resolver::new(&contract, &cells);
        let handle = first.state("open", 1, false).expect("first registration promotes");
        handle.set(true);
        drop(first);

        let second = Resolver::new(&contract, &cells);
        let again = second.state("open", 1, false);
        assert!(again.is_some_and(|h| h.is_on()));
    }

    #[test]
    fn test_unknown_signals_are_ignored() {
        let contract = Contract::new().flag("sparkle").set("wobble", 3);
        let pass = Resolver::stateless(&contract);
        pass.layer("color").set("bg-white");
        pass.layer("color").set_if(pass.on("primary"), "bg-blue-600");
        let out = pass.finish();
        assert_eq!(out.classes("root"), "bg-white");
        assert!(out.payload().is_empty());
    }
}
