//! Command-line front end for signal-layers recipes.
//!
//! ```text
//! signal-layers resolve button.yaml -s primary -s lg -s children=Save
//! signal-layers resolve switch.yaml --contract '{"checked": false}' --json
//! signal-layers check button.yaml
//! signal-layers describe switch.yaml
//! ```
//!
//! Every subcommand returns its output as a string so it can be tested
//! without spawning the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use indexmap::IndexMap;
use serde::Serialize;
use signal_layers::{Cells, Contract, DataPresencePolicy, Payload, Recipe, Resolution, Value};

#[derive(Debug, Parser)]
#[command(name = "signal-layers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve signal-layers recipes into class strings", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a recipe against a contract and print the classes
    Resolve(ResolveArgs),

    /// Validate a recipe file
    Check {
        /// Recipe file (YAML)
        recipe: PathBuf,
    },

    /// List a recipe's layers, signals, data and state
    Describe {
        /// Recipe file (YAML)
        recipe: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Recipe file (YAML)
    pub recipe: PathBuf,

    /// Signal to set, as NAME or NAME=VALUE (repeatable)
    #[arg(short = 's', long = "signal", value_name = "NAME[=VALUE]")]
    pub signals: Vec<String>,

    /// Contract as a JSON object; --signal values are applied on top
    #[arg(long, value_name = "JSON")]
    pub contract: Option<String>,

    /// Print only this scope
    #[arg(long)]
    pub scope: Option<String>,

    /// Data presence policy (truthy or defined), overriding the recipe's
    #[arg(long)]
    pub policy: Option<DataPresencePolicy>,

    /// Print a JSON report instead of class strings
    #[arg(long)]
    pub json: bool,
}

/// Runs a parsed command line and returns what should be printed.
pub fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        Commands::Resolve(args) => cmd_resolve(args),
        Commands::Check { recipe } => cmd_check(recipe),
        Commands::Describe { recipe } => cmd_describe(recipe),
    }
}

fn load(path: &Path) -> Result<Recipe> {
    Recipe::from_path(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Builds the contract from `--contract` and `--signal` arguments.
pub fn build_contract(json: Option<&str>, signals: &[String]) -> Result<Contract> {
    let base = match json {
        Some(text) => Contract::from_json_str(text).context("invalid --contract")?,
        None => Contract::new(),
    };
    let overrides = Contract::from_assignments(signals).context("invalid --signal")?;
    Ok(base.merged(&overrides))
}

#[derive(Debug, Serialize)]
struct ActiveState<'a> {
    name: &'a str,
    priority: u32,
    value: Value,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    recipe: &'a str,
    classes: IndexMap<&'a str, String>,
    payload: &'a Payload,
    state: IndexMap<&'a str, Value>,
    active_state: Option<ActiveState<'a>>,
}

impl<'a> Report<'a> {
    fn new(recipe: &'a Recipe, out: &'a Resolution, scope: Option<&'a str>) -> Self {
        let classes = scope_classes(out, scope);
        let state = out
            .ledger()
            .exposed_handles()
            .map(|(name, handle)| (name, handle.get()))
            .collect();
        let active_state = out.ledger().active().map(|c| ActiveState {
            name: &c.name,
            priority: c.priority,
            value: c.handle.get(),
        });
        Self {
            recipe: recipe.name(),
            classes,
            payload: out.payload(),
            state,
            active_state,
        }
    }
}

fn scope_classes<'a>(out: &'a Resolution, scope: Option<&'a str>) -> IndexMap<&'a str, String> {
    match scope {
        Some(scope) => IndexMap::from([(scope, out.classes(scope))]),
        None => out
            .layers()
            .scope_names()
            .map(|name| (name, out.classes(name)))
            .collect(),
    }
}

fn cmd_resolve(args: &ResolveArgs) -> Result<String> {
    let recipe = load(&args.recipe)?;
    let contract = build_contract(args.contract.as_deref(), &args.signals)?;

    let mut config = recipe.config().clone();
    if let Some(policy) = args.policy {
        config = config.with_data_presence(policy);
    }

    if let Some(scope) = &args.scope {
        if !recipe.scopes().iter().any(|s| s == scope) {
            anyhow::bail!(
                "recipe '{}' has no scope '{}' (scopes: {})",
                recipe.name(),
                scope,
                recipe.scopes().join(", ")
            );
        }
    }

    let cells = Cells::new();
    let out = recipe.resolve_with(&contract, &cells, config);
    tracing::debug!(
        recipe = recipe.name(),
        signals = contract.len(),
        payload = out.payload().len(),
        "resolved"
    );

    if args.json {
        let report = Report::new(&recipe, &out, args.scope.as_deref());
        return serde_json::to_string_pretty(&report).context("failed to serialize report");
    }

    let classes = scope_classes(&out, args.scope.as_deref());
    if classes.len() == 1 {
        return Ok(classes.into_values().next().unwrap_or_default());
    }
    let width = classes.keys().map(|k| k.len()).max().unwrap_or(0);
    let lines: Vec<String> = classes
        .iter()
        .map(|(scope, classes)| {
            format!(
                "{}  {}",
                style(format!("{:<width$}", scope, width = width)).cyan(),
                classes
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

fn cmd_check(path: &Path) -> Result<String> {
    let recipe = load(path)?;
    Ok(format!(
        "{} {}: {} layers, {} rules, {} data, {} state",
        style("ok").green().bold(),
        recipe.name(),
        recipe.layers().len(),
        recipe.rules().len(),
        recipe.data_decls().len(),
        recipe.state_decls().len()
    ))
}

fn cmd_describe(path: &Path) -> Result<String> {
    let recipe = load(path)?;
    let heading = |label: &str| style(format!("{:<8}", label)).bold().to_string();
    let or_none = |items: Vec<String>| {
        if items.is_empty() {
            style("(none)").dim().to_string()
        } else {
            items.join(", ")
        }
    };

    let data = recipe
        .data_decls()
        .iter()
        .map(|d| {
            let mut entry = if d.key == d.name {
                d.name.clone()
            } else {
                format!("{} <- {}", d.name, d.key)
            };
            if let Some(policy) = d.policy {
                entry.push_str(&format!(" ({})", policy));
            }
            entry
        })
        .collect();
    let state = recipe
        .state_decls()
        .iter()
        .map(|s| {
            let initial = serde_json::to_string(&s.initial).unwrap_or_default();
            format!("{} (priority {}, initial {})", s.name, s.priority, initial)
        })
        .collect();

    let lines = [
        style(recipe.name()).bold().underlined().to_string(),
        format!("{} {}", heading("scopes"), recipe.scopes().join(", ")),
        format!("{} {}", heading("layers"), or_none(recipe.layers().to_vec())),
        format!(
            "{} {}",
            heading("signals"),
            or_none(recipe.signal_names().into_iter().map(str::to_string).collect())
        ),
        format!("{} {}", heading("data"), or_none(data)),
        format!("{} {}", heading("state"), or_none(state)),
        format!("{} {}", heading("policy"), recipe.config().data_presence),
    ];
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve_args() {
        let cli = Cli::try_parse_from([
            "signal-layers",
            "resolve",
            "button.yaml",
            "-s",
            "primary",
            "--signal",
            "children=Save",
            "--policy",
            "defined",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.recipe, PathBuf::from("button.yaml"));
                assert_eq!(args.signals, vec!["primary", "children=Save"]);
                assert_eq!(args.policy, Some(DataPresencePolicy::Defined));
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = Cli::try_parse_from([
            "signal-layers",
            "resolve",
            "button.yaml",
            "--policy",
            "sometimes",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["signal-layers", "check", "x.yaml", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_build_contract_overrides_json() {
        let contract = build_contract(
            Some(r#"{"primary": true, "children": "Old"}"#),
            &["children=New".to_string(), "lg".to_string()],
        )
        .unwrap();
        assert!(contract.is_on("primary"));
        assert!(contract.is_on("lg"));
        assert_eq!(contract.text("children"), Some("New"));
    }

    #[test]
    fn test_build_contract_errors() {
        assert!(build_contract(Some("[1, 2]"), &[]).is_err());
        assert!(build_contract(None, &["=x".to_string()]).is_err());
    }
}
