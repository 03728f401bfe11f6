//! Signal-driven class and payload resolution for UI components.
//!
//! A component receives a flat bag of named signals (its [`Contract`]) and
//! turns it into three things:
//!
//! - a class string per scope, built from named layers where the last write
//!   to a layer wins
//! - a payload of data signals copied through to the rendered element
//! - a ledger of state candidates, of which the highest-priority ones are
//!   exposed to the caller
//!
//! # Quick Start
//!
//! ```rust
//! use signal_layers::{Contract, Resolver};
//!
//! let contract = Contract::new().flag("primary").flag("lg");
//! let pass = Resolver::stateless(&contract);
//!
//! let color = pass.layer("color");
//! let size = pass.layer("size");
//! color.set("bg-gray-800 text-white");
//! size.set("px-4 py-2");
//! color.set_if(pass.on("primary"), "bg-blue-600 text-white");
//! size.set_if(pass.on("lg"), "px-6 py-3 text-lg");
//!
//! assert_eq!(
//!     pass.finish().classes("root"),
//!     "bg-blue-600 text-white px-6 py-3 text-lg"
//! );
//! ```
//!
//! # Modules
//!
//! - [`Resolver`]: one resolution pass (`layer`, `data`, `state`, `classes`)
//! - [`Layers`] / [`LayerSet`]: ordered last-write-wins tables
//! - [`StateHost`] / [`StateLedger`]: persistent cells and per-pass priority
//! - [`SignalSet`] / [`Signals`]: typed signal structs validated against a contract
//! - [`Recipe`]: components declared in YAML
//! - [`components`]: a button and a switch built on the above

extern crate self as signal_layers;

mod config;
mod contract;
mod layers;
mod recipe;
mod resolver;
mod signals;
mod state;
mod value;

pub mod components;

pub use config::{DataPresencePolicy, ResolverConfig};
pub use contract::{Contract, ContractError};
pub use layers::{classes, LayerSet, Layers, DEFAULT_SCOPE};
pub use recipe::{DataDecl, LayerRef, Recipe, RecipeError, Rule, StateDecl};
pub use resolver::{LayerSlot, Payload, Resolution, Resolver};
pub use signals::{SignalSet, Validated};
pub use state::{pick_active, Candidate, Cells, StateHandle, StateHost, StateLedger};
pub use value::{Callback, Value};

pub use signal_layers_macros::Signals;
