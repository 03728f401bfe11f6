use serde::Serialize;

use crate::contract::Contract;
use crate::resolver::{Payload, Resolver};
use crate::signals::SignalSet;
use crate::Signals;

/// Toggle vocabulary of [`button`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Signals)]
#[signals(
    data = "children, disabled, onClick, type, aria-label, aria-haspopup, aria-expanded, className, class"
)]
pub struct ButtonSignals {
    pub cta: bool,
    pub neumorphism: bool,
    pub ghost: bool,

    pub primary: bool,
    pub red: bool,
    pub green: bool,
    pub blue: bool,

    pub xs: bool,
    pub sm: bool,
    pub md: bool,
    pub lg: bool,
    pub xl: bool,

    pub square: bool,
    pub rounded: bool,
    pub pill: bool,
    pub circle: bool,

    pub block: bool,
    pub inline: bool,
    pub center: bool,

    pub inner_shadow: bool,
    pub no_shadow: bool,
    pub border: bool,

    pub hover_enlarge: bool,
    pub hover_shrink: bool,
    pub hover_lift: bool,
    pub hover_fade: bool,
    pub hover_border: bool,
    pub hover_none: bool,

    pub active_shrink: bool,
    pub active_ripple: bool,
    pub active_explode: bool,
    pub active_slide: bool,
    pub active_none: bool,
}

/// A resolved button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonView {
    /// Class string of the `<button>` element.
    pub class: String,
    /// Forwarded attributes and children.
    pub payload: Payload,
    /// Contract keys the button does not understand.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<String>,
}

/// Resolves a button contract.
///
/// ```rust
/// use signal_layers::components::button;
/// use signal_layers::Contract;
///
/// let view = button(&Contract::new().flag("red").flag("pill").set("children", "Delete"));
/// assert!(view.class.contains("bg-red-600 text-white"));
/// assert!(view.class.contains("rounded-full"));
/// assert_eq!(view.payload.text("children"), Some("Delete"));
/// ```
pub fn button(contract: &Contract) -> ButtonView {
    let validated = ButtonSignals::from_contract(contract);
    let s = &validated.signals;
    let pass = Resolver::stateless(contract);

    let size = pass.layer("size");
    let border = pass.layer("border");
    let shape = pass.layer("shape");
    let color = pass.layer("color");
    let shadow = pass.layer("shadow");
    let text = pass.layer("text");
    let hover = pass.layer("hover");
    let active = pass.layer("active");
    let layout = pass.layer("layout");
    let animation = pass.layer("animation");
    let escape = pass.layer("escape");

    size.set("px-4 py-2");
    border.set("border-0");
    shape.set("rounded-xs");
    color.set("bg-gray-800 text-white");
    shadow.set("shadow-xs shadow-black/50");
    text.set("text-xs font-light font-sans");
    hover.set("hover:scale-105 hover:shadow-md");
    active.set("active:scale-90 active:shadow-md");
    layout.set("flex items-center justify-center");
    animation.set("transition-all duration-300 cursor-pointer");

    // Composite looks first, so single-purpose signals can refine them.
    if s.cta {
        color.set("bg-blue-600/95 text-white");
        shadow.set("shadow-xs shadow-blue-500/40");
    }
    if s.neumorphism {
        shape.set("rounded-md");
        shadow.set("shadow-inner");
        color.set("bg-linear-to-r from-gray-300 to-gray-200 text-gray-800");
        hover.set("hover:scale-105 hover:bg-white/50 hover:shadow-inner hover:shadow-gray-500/30");
        active.set("active:scale-95 active:bg-white/50 active:shadow-inner active:shadow-gray-500/30");
        animation.set("transition-all duration-700 cursor-pointer");
    }
    if s.ghost {
        shape.set("rounded-full");
        shadow.set("shadow-none");
        color.set("bg-transparent text-gray-800");
        hover.set("hover:scale-110 hover:bg-gray-100/50 hover:text-gray-900");
        active.set("active:scale-95 active:bg-gray-100/75 active:text-gray-900");
        animation.set("transition-all duration-500 cursor-pointer");
    }

    color.set_if(s.primary, "bg-blue-600 text-white");
    color.set_if(s.red, "bg-red-600 text-white");
    color.set_if(s.green, "bg-green-500 text-white");
    color.set_if(s.blue, "bg-blue-500/90 text-neutral-100");

    size.set_if(s.xs, "px-2 py-1 text-xs");
    size.set_if(s.sm, "px-3 py-1.5 text-sm");
    size.set_if(s.md, "px-4 py-2 text-base");
    size.set_if(s.lg, "px-6 py-3 text-lg");
    size.set_if(s.xl, "px-8 py-4 text-xl");

    shape.set_if(s.square, "rounded-none");
    shape.set_if(s.rounded, "rounded-lg");
    shape.set_if(s.pill, "rounded-full");
    shape.set_if(s.circle, "rounded-full aspect-square p-0");

    layout.set_if(s.block, "w-full");
    layout.set_if(s.inline, "inline-flex");
    layout.set_if(s.center, "mx-auto");

    shadow.set_if(s.inner_shadow, "shadow-inner");
    shadow.set_if(s.no_shadow, "shadow-none");
    border.set_if(s.border, "border border-gray-800");

    hover.set_if(s.hover_enlarge, "hover:scale-105");
    hover.set_if(s.hover_shrink, "hover:scale-95");
    hover.set_if(s.hover_lift, "hover:-translate-y-0.5");
    hover.set_if(s.hover_fade, "hover:opacity-40");
    hover.set_if(s.hover_border, "hover:border hover:border-black");
    hover.set_if(s.hover_none, "hover:scale-100 hover:opacity-100");

    active.set_if(s.active_shrink, "active:scale-95 transition-transform");
    active.set_if(s.active_ripple, "active:ring-4 active:ring-black active:scale-90");
    active.set_if(s.active_explode, "active:scale-110 active:ring-8 active:ring-black");
    active.set_if(s.active_slide, "active:translate-x-0.5");
    active.set_if(s.active_none, "active:scale-100 active:opacity-100");

    for key in ["className", "class"] {
        if let Some(extra) = pass.contract().get(key).filter(|v| v.is_truthy()) {
            escape.set(extra.to_string());
        }
    }

    for name in [
        "children",
        "disabled",
        "onClick",
        "type",
        "aria-label",
        "aria-haspopup",
        "aria-expanded",
    ] {
        pass.data(name);
    }

    let out = pass.finish();
    ButtonView {
        class: out.classes(crate::DEFAULT_SCOPE),
        payload: out.payload().clone(),
        unrecognized: validated.unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Callback, Value};

    const DEFAULT_CLASS: &str = "px-4 py-2 border-0 rounded-xs bg-gray-800 text-white \
        shadow-xs shadow-black/50 text-xs font-light font-sans \
        hover:scale-105 hover:shadow-md active:scale-90 active:shadow-md \
        flex items-center justify-center transition-all duration-300 cursor-pointer";

    #[test]
    fn test_defaults() {
        let view = button(&Contract::new());
        assert_eq!(view.class, DEFAULT_CLASS);
        assert!(view.payload.is_empty());
        assert!(view.unrecognized.is_empty());
    }

    #[test]
    fn test_intent_overrides_composite() {
        let view = button(&Contract::new().flag("cta").flag("red"));
        assert!(view.class.contains("bg-red-600 text-white"));
        assert!(!view.class.contains("bg-blue-600/95"));
        assert!(view.class.contains("shadow-blue-500/40"));
    }

    #[test]
    fn test_primary_intent() {
        let view = button(&Contract::new().flag("primary"));
        assert!(view.class.contains("bg-blue-600 text-white"));
        assert!(!view.class.contains("bg-gray-800"));
    }

    #[test]
    fn test_last_size_wins() {
        let view = button(&Contract::new().flag("xl").flag("xs"));
        assert!(view.class.starts_with("px-8 py-4 text-xl "));
    }

    #[test]
    fn test_escape_appends_last() {
        let view = button(&Contract::new().set("className", "mt-4"));
        assert!(view.class.ends_with(" mt-4"));
        let view = button(&Contract::new().set("className", "mt-4").set("class", "mb-2"));
        assert!(view.class.ends_with(" mb-2"));
        assert!(!view.class.contains("mt-4"));
    }

    #[test]
    fn test_escape_takes_any_truthy_value() {
        let view = button(&Contract::new().set("className", 7));
        assert!(view.class.ends_with(" 7"));

        let view = button(&Contract::new().set("className", "").set("class", false));
        assert_eq!(view.class, DEFAULT_CLASS);
    }

    #[test]
    fn test_payload_forwarding() {
        let click = Callback::new(|_| Value::Null);
        let view = button(
            &Contract::new()
                .set("children", "Save")
                .set("onClick", click.clone())
                .set("disabled", false)
                .set("aria-label", "save document"),
        );
        assert_eq!(view.payload.text("children"), Some("Save"));
        assert_eq!(view.payload.get("onClick"), Some(&Value::Callback(click)));
        assert!(!view.payload.contains("disabled"));
        assert_eq!(view.payload.text("aria-label"), Some("save document"));
    }

    #[test]
    fn test_unknown_signals_reported() {
        let view = button(&Contract::new().flag("sparkle").flag("lg"));
        assert_eq!(view.unrecognized, vec!["sparkle".to_string()]);
        assert!(view.class.contains("px-6 py-3 text-lg"));
    }

    #[test]
    fn test_constants() {
        assert_eq!(ButtonSignals::HOVER_LIFT, "hoverLift");
        assert_eq!(ButtonSignals::INNER_SHADOW, "innerShadow");
        assert!(ButtonSignals::recognizes("aria-expanded"));
    }
}
