//! Component-local reactive state and priority arbitration.
//!
//! This module provides:
//!
//! - [`StateHandle`]: a shared, mutable state cell with get/set
//! - [`StateHost`]: the host-side store that creates cells once per name
//! - [`Cells`]: an in-memory [`StateHost`] owned by one component instance
//! - [`StateLedger`]: per-pass record of candidates and the exposed handles
//!
//! Cells outlive resolution passes; the ledger does not. A second pass asks
//! the host for the same names and gets the same cells back, values intact.

mod ledger;

pub use ledger::{pick_active, Candidate, StateLedger};

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;

use crate::value::Value;

/// A named reactive cell.
///
/// Clones share the underlying cell, so a handle exposed by one pass reads
/// and writes the same value as the handle a later pass receives.
#[derive(Clone)]
pub struct StateHandle {
    name: Arc<str>,
    cell: Arc<RwLock<Value>>,
}

impl StateHandle {
    /// Creates a detached cell holding `initial`.
    pub fn new(name: &str, initial: Value) -> Self {
        Self {
            name: Arc::from(name),
            cell: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> Value {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current value.
    pub fn set(&self, value: impl Into<Value>) {
        *self.cell.write().unwrap_or_else(PoisonError::into_inner) = value.into();
    }

    /// Replaces the current value with `f(current)`.
    pub fn update(&self, f: impl FnOnce(&Value) -> Value) {
        let mut guard = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        let next = f(&*guard);
        *guard = next;
    }

    /// Returns `true` if the current value is truthy.
    pub fn is_on(&self) -> bool {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_truthy()
    }

    /// Returns `true` if both handles point at the same cell.
    pub fn same_cell(&self, other: &StateHandle) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("name", &self.name)
            .field("value", &self.get())
            .finish()
    }
}

/// The host's registration mechanism for reactive state.
///
/// Implementations must return the same cell for the same name on every
/// call, creating it with `initial` only the first time. A cell is never
/// reset by a later registration.
pub trait StateHost {
    /// Returns the cell registered under `name`, creating it on first use.
    fn cell(&self, name: &str, initial: Value) -> StateHandle;
}

/// In-memory state store for one component instance.
///
/// Cloning a `Cells` shares the store.
#[derive(Debug, Clone, Default)]
pub struct Cells {
    cells: Arc<RwLock<IndexMap<String, StateHandle>>>,
}

impl Cells {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an existing cell without creating one.
    pub fn get(&self, name: &str) -> Option<StateHandle> {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of all created cells, in creation order.
    pub fn names(&self) -> Vec<String> {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateHost for Cells {
    fn cell(&self, name: &str, initial: Value) -> StateHandle {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
        cells
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(state = name, initial = %initial, "creating state cell");
                StateHandle::new(name, initial)
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_get_set() {
        let handle = StateHandle::new("checked", Value::Bool(false));
        assert!(!handle.is_on());
        handle.set(true);
        assert_eq!(handle.get(), Value::Bool(true));
        assert_eq!(handle.name(), "checked");
    }

    #[test]
    fn test_handle_update() {
        let handle = StateHandle::new("count", Value::Int(1));
        handle.update(|v| Value::Int(v.as_int().unwrap_or(0) + 1));
        assert_eq!(handle.get(), Value::Int(2));
    }

    #[test]
    fn test_clones_share_cell() {
        let a = StateHandle::new("open", Value::Bool(false));
        let b = a.clone();
        b.set(true);
        assert!(a.is_on());
        assert!(a.same_cell(&b));
    }

    #[test]
    fn test_cells_create_once() {
        let cells = Cells::new();
        let first = cells.cell("checked", Value::Bool(false));
        first.set(true);

        let second = cells.cell("checked", Value::Bool(false));
        assert!(first.same_cell(&second));
        assert_eq!(second.get(), Value::Bool(true));
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn test_cells_names_in_creation_order() {
        let cells = Cells::new();
        cells.cell("open", Value::Null);
        cells.cell("value", Value::Int(0));
        assert_eq!(cells.names(), vec!["open".to_string(), "value".to_string()]);
        assert!(cells.get("missing").is_none());
    }

    #[test]
    fn test_cells_clone_shares_store() {
        let cells = Cells::new();
        let shared = cells.clone();
        cells.cell("open", Value::Bool(true));
        assert!(shared.get("open").is_some());
    }
}
