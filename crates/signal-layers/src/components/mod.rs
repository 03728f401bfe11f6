//! Reference components built on [`Resolver`](crate::Resolver).
//!
//! - [`button`]: a stateless button with intent, size, shape and motion
//!   signals
//! - [`Switch`]: a toggle with a persistent `checked` cell and four scopes

mod button;
mod switch;

pub use button::{button, ButtonSignals, ButtonView};
pub use switch::{Switch, SwitchSignals, SwitchView};
