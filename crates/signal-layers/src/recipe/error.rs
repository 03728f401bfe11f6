//! Recipe loading and validation errors.

use std::path::PathBuf;

/// Error returned when a recipe cannot be loaded or fails validation.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// The recipe file could not be read.
    #[error("failed to read recipe '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The YAML document is malformed or has the wrong shape.
    #[error("invalid recipe YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// A layer reference is not of the form `name` or `scope.name`.
    #[error("invalid layer reference '{0}': expected 'name' or 'scope.name'")]
    InvalidLayerRef(String),
    /// A layer was declared twice.
    #[error("layer '{layer}' is declared more than once")]
    DuplicateLayer { layer: String },
    /// Defaults or a rule write a layer that was never declared.
    #[error("{context} writes undeclared layer '{layer}'")]
    UndeclaredLayer { context: String, layer: String },
    /// A rule has neither `when` nor `when_state`.
    #[error("rule {rule} has no condition; use `defaults` for unconditional values")]
    EmptyCondition { rule: usize },
    /// A rule depends on a state that no `state` entry registers.
    #[error("rule {rule} depends on unregistered state '{state}'")]
    UnknownState { rule: usize, state: String },
    /// A rule depends on a state that is registered but never exposed,
    /// because its priority is 0 or does not exceed an earlier state's.
    #[error(
        "rule {rule} depends on state '{state}', which is never exposed; \
         give it a priority above every earlier state"
    )]
    UnexposedState { rule: usize, state: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_layer_display() {
        let err = RecipeError::UndeclaredLayer {
            context: "rule 2".to_string(),
            layer: "thumb.glow".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("rule 2"));
        assert!(msg.contains("thumb.glow"));
    }

    #[test]
    fn test_empty_condition_display() {
        let err = RecipeError::EmptyCondition { rule: 0 };
        assert!(err.to_string().contains("rule 0"));
    }

    #[test]
    fn test_unexposed_state_display() {
        let err = RecipeError::UnexposedState {
            rule: 1,
            state: "open".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("rule 1"));
        assert!(msg.contains("'open'"));
        assert!(msg.contains("never exposed"));
    }

    #[test]
    fn test_io_display_names_path() {
        let err = RecipeError::Io {
            path: PathBuf::from("recipes/button.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("recipes/button.yaml"));
    }
}
