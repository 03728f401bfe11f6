//! `#[derive(Signals)]` implementation.

pub mod attrs;
pub mod derive;
