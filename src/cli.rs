use std::path::{Path, PathBuf};

mod frameworks;
mod resolve;
mod rule;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use compliance_rules::{Config, load_definitions, model::Component};
use frameworks::Frameworks;
use resolve::Resolve;
use rule::RuleLookup;
use serde::Serialize;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the configuration file
    #[arg(short, long, default_value = "crules.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(&self.config);
        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List the frameworks declared by the component definitions
    Frameworks(Frameworks),

    /// Resolve the rules that apply to each component under a framework
    ///
    /// Each rule is shown with its parameter, its checks and the controls
    /// that reference it.
    Resolve(Resolve),

    /// Look up a single rule, optionally through a framework
    ///
    /// Distinguishes a rule that does not exist from one that the framework
    /// filters out.
    Rule(RuleLookup),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Frameworks(command) => command.run(config)?,
            Self::Resolve(command) => command.run(config)?,
            Self::Rule(command) => command.run(config)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON document
    Json,
}

fn load_config(path: &Path) -> Config {
    Config::load(path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Loads every component from the definition file or directory at `input`.
fn load_components(input: &Path) -> anyhow::Result<Vec<Component>> {
    let definitions = load_definitions(input).with_context(|| {
        format!(
            "failed to load component definitions from {}",
            input.display()
        )
    })?;

    Ok(definitions
        .into_iter()
        .flat_map(|definition| definition.components)
        .collect())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The component definition shared with the integration tests.
    pub(super) fn fixture() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/component-definition.json")
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();

        assert_eq!(load_config(&tmp.path().join("crules.toml")), Config::default());
    }

    #[test]
    fn load_components_flattens_definitions() {
        let titles: Vec<_> = load_components(&fixture())
            .unwrap()
            .into_iter()
            .map(|component| component.title)
            .collect();

        assert_eq!(titles, ["Kubernetes", "Validator"]);
    }

    #[test]
    fn load_components_reports_the_input() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.json");

        let error = load_components(&missing).unwrap_err();

        assert!(error.to_string().contains("missing.json"));
    }
}
