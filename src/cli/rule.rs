use std::{path::PathBuf, process};

use clap::Parser;
use compliance_rules::{
    Config, MemoryStore, RequirementsStore, RuleSet, SettingsError, Store, StoreError,
    list_by_framework,
};
use tracing::instrument;

use super::{OutputFormat, load_components, print_json, resolve::ResolvedRule, terminal::Colorize};

/// Exit status when the rule does not exist.
const EXIT_NOT_FOUND: i32 = 1;
/// Exit status when the rule exists but the framework excludes it.
const EXIT_FILTERED_OUT: i32 = 2;

#[derive(Debug, Parser)]
pub struct RuleLookup {
    /// A component-definition file, or a directory of them
    input: PathBuf,

    /// The rule ID to look up (or check ID, with --check)
    id: String,

    /// Look the rule up through this framework's requirements
    #[arg(short, long)]
    framework: Option<String>,

    /// Treat the ID as a check ID
    #[arg(long)]
    check: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl RuleLookup {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let resolved = match self.resolve()? {
            Ok(resolved) => resolved,
            Err(e) => match exit_status(&e) {
                Some(EXIT_FILTERED_OUT) => {
                    eprintln!("{}", e.to_string().warning());
                    process::exit(EXIT_FILTERED_OUT);
                }
                Some(status) => {
                    eprintln!("{}", e.to_string().error());
                    process::exit(status);
                }
                None => return Err(e.into()),
            },
        };

        match self.output {
            OutputFormat::Json => print_json(&resolved, config.pretty_json)?,
            OutputFormat::Table => resolved.print(0),
        }
        Ok(())
    }

    /// Looks the rule up, through the framework view if one was given.
    ///
    /// The outer error covers loading and unknown frameworks; the inner one
    /// is the lookup result itself.
    fn resolve(&self) -> anyhow::Result<Result<ResolvedRule, StoreError>> {
        let components = load_components(&self.input)?;
        let store = MemoryStore::from_components(&components)?;

        let Some(framework) = &self.framework else {
            return Ok(self.lookup(&store).map(|rule_set| ResolvedRule::new(rule_set, None)));
        };

        let mut by_framework = list_by_framework(
            components
                .iter()
                .flat_map(|component| &component.control_implementations),
        );
        let requirements = by_framework
            .remove(framework)
            .ok_or_else(|| SettingsError::UnknownFramework(framework.clone()))?;
        let view = RequirementsStore::new(&store, &requirements);

        Ok(self
            .lookup(&view)
            .map(|rule_set| ResolvedRule::new(rule_set, Some(&requirements))))
    }

    fn lookup(&self, store: &dyn Store) -> Result<RuleSet, StoreError> {
        if self.check {
            store.get_by_check_id(&self.id)
        } else {
            store.get_by_rule_id(&self.id)
        }
    }
}

/// The exit status for a lookup that failed because the rule is missing or
/// excluded. Any other failure is an ordinary error.
const fn exit_status(error: &StoreError) -> Option<i32> {
    if error.is_filtered_out() {
        Some(EXIT_FILTERED_OUT)
    } else if error.is_not_found() {
        Some(EXIT_NOT_FOUND)
    } else {
        None
    }
}
