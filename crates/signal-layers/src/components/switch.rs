use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::config::{DataPresencePolicy, ResolverConfig};
use crate::contract::Contract;
use crate::resolver::{Payload, Resolver};
use crate::signals::SignalSet;
use crate::state::{Cells, StateHost};
use crate::value::Value;
use crate::Signals;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

const CHECKED: &str = "checked";

/// Toggle vocabulary of [`Switch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Signals)]
#[signals(
    data = "id, label, name, value, checked, defaultChecked, required, readOnly, \
            aria-label, aria-labelledby, aria-describedby, aria-invalid, aria-checked"
)]
pub struct SwitchSignals {
    pub xs: bool,
    pub sm: bool,
    pub md: bool,
    pub lg: bool,
    pub square: bool,
    pub pill: bool,
    pub label_left: bool,
    pub label_right: bool,
    pub label_top: bool,
    pub label_bottom: bool,
    pub label_hidden: bool,
    pub disabled: bool,
}

#[derive(Clone, Copy)]
struct Size {
    track: &'static str,
    thumb: &'static str,
    offset: &'static str,
}

const XS: Size = Size {
    track: "h-3 w-6",
    thumb: "h-3 w-3",
    offset: "translate-x-3",
};
const SM: Size = Size {
    track: "h-4 w-8",
    thumb: "h-4 w-4",
    offset: "translate-x-4",
};
const MD: Size = Size {
    track: "h-5 w-10",
    thumb: "h-5 w-5",
    offset: "translate-x-5",
};
const LG: Size = Size {
    track: "h-6 w-12",
    thumb: "h-6 w-6",
    offset: "translate-x-6",
};

impl SwitchSignals {
    /// The last size signal that is on, or the small default.
    fn size(&self) -> Size {
        [(self.xs, XS), (self.sm, SM), (self.md, MD), (self.lg, LG)]
            .into_iter()
            .rev()
            .find_map(|(on, size)| on.then_some(size))
            .unwrap_or(SM)
    }
}

/// A resolved switch: one class string per element plus forwarded data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchView {
    /// Element id: the contract's `id`, or the instance's generated one.
    pub id: String,
    pub container: String,
    pub button: String,
    pub thumb: String,
    pub label: String,
    /// Label text, when the contract supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_text: Option<String>,
    /// Effective checked value: the contract's `checked` if given, else state.
    pub checked: bool,
    pub payload: Payload,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<String>,
}

/// A switch instance.
///
/// Owns the `checked` cell, so the toggled value survives between
/// [`render`](Switch::render) calls. A contract that carries `checked`
/// controls the switch and overrides the cell.
///
/// ```rust
/// use signal_layers::components::Switch;
/// use signal_layers::Contract;
///
/// let switch = Switch::new();
/// let contract = Contract::new().flag("lg").set("label", "Wi-Fi");
///
/// assert!(!switch.render(&contract).checked);
/// switch.toggle();
/// let view = switch.render(&contract);
/// assert!(view.checked);
/// assert!(view.thumb.contains("translate-x-6"));
/// ```
#[derive(Debug, Clone)]
pub struct Switch {
    id: String,
    cells: Cells,
}

impl Default for Switch {
    fn default() -> Self {
        Self::new()
    }
}

impl Switch {
    /// Creates an instance with a fresh id and its own state store.
    pub fn new() -> Self {
        Self::with_cells(Cells::new())
    }

    /// Creates an instance on top of an existing state store.
    pub fn with_cells(cells: Cells) -> Self {
        let id = format!("switch-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed));
        Self { id, cells }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    /// The internal checked value, ignoring any controlling contract.
    pub fn is_checked(&self) -> bool {
        self.cells.get(CHECKED).is_some_and(|h| h.is_on())
    }

    /// Flips the internal checked value and returns the new one.
    pub fn toggle(&self) -> bool {
        let handle = self.cells.cell(CHECKED, Value::Bool(false));
        handle.update(|current| Value::Bool(!current.is_truthy()));
        let on = handle.is_on();
        tracing::debug!(switch = %self.id, checked = on, "toggled");
        on
    }

    /// Resolves a contract against this instance's state.
    pub fn render(&self, contract: &Contract) -> SwitchView {
        let validated = SwitchSignals::from_contract(contract);
        let s = &validated.signals;
        let size = s.size();

        let config = ResolverConfig::new().with_data_presence(DataPresencePolicy::Defined);
        let pass = Resolver::new(contract, &self.cells).with_config(config);

        let container = |name: &str| pass.layer_in("container", name);
        let button = |name: &str| pass.layer_in("button", name);
        let thumb = |name: &str| pass.layer_in("thumb", name);
        let label = |name: &str| pass.layer_in("label", name);

        container("base").set("relative");
        container("size").set(size.track);
        container("color").set("bg-transparent");
        container("layout").set("inline-flex items-center gap-2");

        button("base").set("relative transition-colors duration-500 cursor-pointer");
        button("size").set(size.track);
        button("color").set("bg-gray-200");
        button("shape").set("rounded-full");
        button("layout").set("inline-flex items-center");
        button("interactive");

        thumb("base").set("absolute transition-transform duration-500");
        thumb("color").set("bg-white");
        thumb("shape").set("rounded-full");
        thumb("size").set(size.thumb);
        thumb("layout").set("inline-block");
        thumb("position").set("translate-x-0");
        thumb("interactive");

        label("base").set("absolute cursor-pointer whitespace-nowrap");
        label("color").set("text-gray-700");
        label("size").set("text-sm font-light");
        label("layout").set("left-12");

        if s.square {
            button("shape").set("rounded-md");
            thumb("shape").set("rounded-md");
        }
        if s.pill {
            button("shape").set("rounded-full");
            thumb("shape").set("rounded-full");
        }

        label("layout").set_if(s.label_left, "right-12 left-auto");
        label("layout").set_if(s.label_right, "left-12");
        label("layout").set_if(s.label_top, "bottom-8 left-0 right-0");
        label("layout").set_if(s.label_bottom, "top-8 left-0 right-0");
        label("base").set_if(s.label_hidden, "absolute opacity-0 pointer-events-none");

        if s.disabled {
            button("interactive").set("cursor-not-allowed opacity-40");
            thumb("interactive").set("opacity-40");
        }

        for name in SwitchSignals::DATA {
            pass.data(name);
        }
        pass.data("disabled");

        let state = pass.state(CHECKED, 1, false);
        // An explicit null leaves the switch uncontrolled.
        let on = match pass.data_value(CHECKED) {
            Some(value) if !value.is_null() => value.is_truthy(),
            _ => state.is_some_and(|h| h.is_on()),
        };
        if on {
            thumb("position").set(size.offset);
            button("color").set("bg-blue-600");
        }

        let id = pass
            .text("id")
            .filter(|id| !id.is_empty())
            .map_or_else(|| self.id.clone(), str::to_string);

        let out = pass.finish();
        SwitchView {
            id,
            container: out.classes("container"),
            button: out.classes("button"),
            thumb: out.classes("thumb"),
            label: out.classes("label"),
            label_text: out.payload().text("label").map(str::to_string),
            checked: on,
            payload: out.payload().clone(),
            unrecognized: validated.unrecognized,
        }
    }
}
