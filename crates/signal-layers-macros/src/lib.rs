//! Proc macros for signal-layers.
//!
//! # Macros
//!
//! - [`Signals`] - Derive `SignalSet` for a struct of `bool` toggle fields
//!
//! # Example
//!
//! ```rust,ignore
//! use signal_layers::{SignalSet, Signals};
//!
//! #[derive(Default, Signals)]
//! #[signals(data = "children, onClick")]
//! struct ButtonSignals {
//!     primary: bool,
//!     hover_glow: bool,            // read from contract key "hoverGlow"
//!     #[signal(rename = "aria-busy")]
//!     busy: bool,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod signals;

/// Derives `SignalSet` for a struct whose toggle fields are `bool`.
///
/// Each field maps to the contract key given by its name in lowerCamelCase
/// (`hover_glow` reads `hoverGlow`). The derive also emits one associated
/// `&'static str` constant per signal (`HOVER_GLOW`), so call sites can name
/// keys without string literals.
///
/// # Field attributes
///
/// - `#[signal(rename = "key")]` - read a different contract key
/// - `#[signal(skip)]` - not a signal; left at its default
///
/// # Container attributes
///
/// - `#[signals(data = "a, b")]` - keys the component reads as data. They are
///   recognized (never reported as unknown) but do not set any toggle.
///
/// The struct must also implement `Default`.
#[proc_macro_derive(Signals, attributes(signal, signals))]
pub fn signals_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    signals::derive::signals_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
