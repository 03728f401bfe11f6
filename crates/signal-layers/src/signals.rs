//! Typed, closed signal sets.
//!
//! A component that knows its signal vocabulary up front can describe it as
//! a struct of `bool` fields and derive [`SignalSet`] with
//! `#[derive(Signals)]`. Reading a contract through the set validates it at
//! the boundary: recognized toggles land in typed fields, and anything else
//! is collected in [`Validated::unrecognized`] instead of being silently
//! probed later.
//!
//! # Example
//!
//! ```rust
//! use signal_layers::{Contract, SignalSet, Signals};
//!
//! #[derive(Debug, Default, Signals)]
//! #[signals(data = "children")]
//! struct Chip {
//!     primary: bool,
//!     hover_glow: bool,
//! }
//!
//! let contract = Contract::new()
//!     .flag("hoverGlow")
//!     .flag("sparkle")
//!     .set("children", "New");
//! let checked = Chip::from_contract(&contract);
//!
//! assert!(checked.signals.hover_glow);
//! assert!(!checked.signals.primary);
//! assert_eq!(checked.unrecognized, vec!["sparkle".to_string()]);
//! assert_eq!(Chip::HOVER_GLOW, "hoverGlow");
//! ```

use crate::contract::Contract;

/// A closed vocabulary of toggle signals.
pub trait SignalSet: Default {
    /// Contract keys interpreted as toggles, in declaration order.
    const NAMES: &'static [&'static str];

    /// Contract keys read as data; recognized but never toggles.
    const DATA: &'static [&'static str] = &[];

    /// Stores a toggle. Returns `false` if `name` is not one of [`NAMES`].
    ///
    /// [`NAMES`]: SignalSet::NAMES
    fn set_signal(&mut self, name: &str, on: bool) -> bool;

    /// Returns `true` if `name` is a toggle or data key of this set.
    fn recognizes(name: &str) -> bool {
        Self::NAMES.contains(&name) || Self::DATA.contains(&name)
    }

    /// Reads a contract into the set.
    ///
    /// Never fails: unknown keys are reported, not rejected.
    fn from_contract(contract: &Contract) -> Validated<Self> {
        let mut signals = Self::default();
        let mut unrecognized = Vec::new();

        for (name, value) in contract.iter() {
            if Self::DATA.contains(&name) {
                continue;
            }
            if !signals.set_signal(name, value.is_truthy()) {
                unrecognized.push(name.to_string());
            }
        }

        if !unrecognized.is_empty() {
            tracing::debug!(
                signal_set = std::any::type_name::<Self>(),
                ?unrecognized,
                "ignoring unrecognized signals"
            );
        }

        Validated {
            signals,
            unrecognized,
        }
    }
}

/// A contract read through a [`SignalSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validated<S> {
    /// The typed toggles.
    pub signals: S,
    /// Keys that are neither toggles nor data of the set, in contract order.
    pub unrecognized: Vec<String>,
}

impl<S> Validated<S> {
    /// Returns `true` if every key of the contract was recognized.
    pub fn is_clean(&self) -> bool {
        self.unrecognized.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Signals;

    #[derive(Debug, Default, PartialEq, Eq, Signals)]
    #[signals(data = "children, onClick")]
    struct Sample {
        primary: bool,
        lg: bool,
        #[signal(rename = "hover-glow")]
        glow: bool,
        #[signal(skip)]
        internal: bool,
    }

    #[test]
    fn test_names_and_data() {
        assert_eq!(Sample::NAMES, &["primary", "lg", "hover-glow"]);
        assert_eq!(Sample::DATA, &["children", "onClick"]);
        assert!(Sample::recognizes("onClick"));
        assert!(!Sample::recognizes("internal"));
    }

    #[test]
    fn test_from_contract_sets_fields() {
        let contract = Contract::new()
            .flag("primary")
            .set("lg", false)
            .flag("hover-glow")
            .set("children", "Hi");
        let checked = Sample::from_contract(&contract);
        assert!(checked.is_clean());
        assert_eq!(
            checked.signals,
            Sample {
                primary: true,
                lg: false,
                glow: true,
                internal: false,
            }
        );
    }

    #[test]
    fn test_unrecognized_follows_json_order() {
        let contract =
            Contract::from_json_str(r#"{"zoom": true, "lg": true, "accent": true}"#).unwrap();
        let checked = Sample::from_contract(&contract);
        assert_eq!(
            checked.unrecognized,
            vec!["zoom".to_string(), "accent".to_string()]
        );
    }

    #[test]
    fn test_unrecognized_bucket() {
        let contract = Contract::new().flag("internal").flag("sparkle").flag("lg");
        let checked = Sample::from_contract(&contract);
        assert!(checked.signals.lg);
        assert!(!checked.signals.internal);
        assert_eq!(
            checked.unrecognized,
            vec!["internal".to_string(), "sparkle".to_string()]
        );
    }

    #[test]
    fn test_truthiness_drives_toggles() {
        let contract = Contract::new().set("primary", "yes").set("lg", 0);
        let checked = Sample::from_contract(&contract);
        assert!(checked.signals.primary);
        assert!(!checked.signals.lg);
    }
}
