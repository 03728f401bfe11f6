//! Attribute parsing for `#[signal(...)]` and `#[signals(...)]`.

use syn::{Attribute, LitStr, Result};

/// Parsed `#[signal(...)]` options of one field.
#[derive(Default)]
pub struct SignalAttrs {
    pub rename: Option<String>,
    pub skip: bool,
}

/// Parsed `#[signals(...)]` options of the struct.
#[derive(Default)]
pub struct ContainerAttrs {
    pub data: Vec<String>,
}

pub fn parse_signal_attrs(attrs: &[Attribute]) -> Result<SignalAttrs> {
    let mut out = SignalAttrs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("signal")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                out.rename = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported signal attribute, expected `rename` or `skip`"))
            }
        })?;
    }

    Ok(out)
}

pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttrs> {
    let mut out = ContainerAttrs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("signals")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("data") {
                let lit: LitStr = meta.value()?.parse()?;
                out.data.extend(
                    lit.value()
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
                Ok(())
            } else {
                Err(meta.error("unsupported signals attribute, expected `data`"))
            }
        })?;
    }

    Ok(out)
}
