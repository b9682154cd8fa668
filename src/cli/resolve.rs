use std::{collections::HashSet, path::PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use compliance_rules::{
    Config, EmptyComponentPolicy, MemoryStore, RequirementMap, RequirementsStore, RuleSet,
    SettingsError, Store, list_by_framework, model::Component,
};
use serde::Serialize;
use tracing::instrument;

use super::{OutputFormat, load_components, print_json, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct Resolve {
    /// A component-definition file, or a directory of them
    input: PathBuf,

    /// The framework to resolve; defaults to `default_framework` from the
    /// config
    #[arg(short, long)]
    framework: Option<String>,

    /// Resolve only the component with this title
    #[arg(long)]
    component: Option<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    generated: DateTime<Utc>,
    framework: &'a str,
    components: Vec<ResolvedComponent>,
}

#[derive(Debug, Serialize)]
struct ResolvedComponent {
    title: String,
    rules: Vec<ResolvedRule>,
}

/// A resolved rule set and the controls that reference its rule.
#[derive(Debug, Serialize)]
pub struct ResolvedRule {
    #[serde(flatten)]
    rule_set: RuleSet,
    controls: Vec<String>,
}

impl ResolvedRule {
    pub fn new(rule_set: RuleSet, requirements: Option<&RequirementMap>) -> Self {
        let controls = requirements
            .map(|requirements| {
                requirements
                    .controls_for_rule(rule_set.rule().id())
                    .into_iter()
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self { rule_set, controls }
    }

    /// Prints the rule as an indented block.
    pub fn print(&self, indent: usize) {
        let pad = " ".repeat(indent);
        let rule = self.rule_set.rule();

        println!("{pad}{}  {}", rule.id().id(), rule.description());
        if !self.controls.is_empty() {
            println!("{pad}  {} {}", "controls:".dim(), self.controls.join(", "));
        }
        if let Some(parameter) = rule.parameter() {
            let value = parameter
                .value()
                .map_or_else(|| "(unset)".dim(), str::to_owned);
            println!(
                "{pad}  {} {} = {value}  {}",
                "parameter:".dim(),
                parameter.id(),
                parameter.description().dim()
            );
        }
        for check in self.rule_set.checks() {
            println!(
                "{pad}  {} {}  {}",
                "check:".dim(),
                check.id(),
                check.description().dim()
            );
        }
    }
}

impl Resolve {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let framework = self.framework(config)?;
        let components = load_components(&self.input)?;

        let report = Report {
            generated: Utc::now(),
            framework,
            components: self.resolve(config, framework, &components)?,
        };

        match self.output {
            OutputFormat::Json => print_json(&report, config.pretty_json)?,
            OutputFormat::Table => output_table(&report),
        }
        Ok(())
    }

    fn framework<'a>(&'a self, config: &'a Config) -> anyhow::Result<&'a str> {
        self.framework
            .as_deref()
            .or_else(|| config.default_framework())
            .context("no framework given: pass --framework or set default_framework in the config")
    }

    /// Resolves each selected component, in input order, applying the
    /// config's empty-component policy.
    fn resolve(
        &self,
        config: &Config,
        framework: &str,
        components: &[Component],
    ) -> anyhow::Result<Vec<ResolvedComponent>> {
        let store = MemoryStore::from_components(components)?;
        let by_framework = list_by_framework(
            components
                .iter()
                .flat_map(|component| &component.control_implementations),
        );
        let requirements = by_framework
            .get(framework)
            .ok_or_else(|| SettingsError::UnknownFramework(framework.to_string()))?;
        let view = RequirementsStore::new(&store, requirements);

        let mut titles: Vec<&str> = Vec::new();
        let mut seen = HashSet::new();
        for component in components {
            let title = component.title.as_str();
            if self.component.as_deref().is_none_or(|wanted| wanted == title) && seen.insert(title) {
                titles.push(title);
            }
        }
        if let Some(wanted) = self.component.as_deref().filter(|_| titles.is_empty()) {
            anyhow::bail!("component {wanted} not found");
        }

        let mut resolved = Vec::with_capacity(titles.len());
        for title in titles {
            match view.find_by_component(title) {
                Ok(rule_sets) => resolved.push(ResolvedComponent {
                    title: title.to_string(),
                    rules: rule_sets
                        .into_iter()
                        .map(|rule_set| ResolvedRule::new(rule_set, Some(requirements)))
                        .collect(),
                }),
                Err(e) if e.is_not_found() || e.is_filtered_out() => {
                    match config.on_empty_component {
                        EmptyComponentPolicy::Skip => {
                            tracing::info!("Skipping component {title}: {e}");
                        }
                        EmptyComponentPolicy::Fail => {
                            return Err(e).with_context(|| {
                                format!("component {title} resolved no rules for {framework}")
                            });
                        }
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(resolved)
    }
}

fn output_table(report: &Report<'_>) {
    println!(
        "{} {}  {}",
        "Framework:".dim(),
        report.framework.heading(),
        report.generated.to_rfc3339().dim()
    );

    if report.components.is_empty() {
        println!("{}", "No rules apply to any component.".warning());
        return;
    }

    for component in &report.components {
        println!();
        println!(
            "{} {}",
            component.title.heading(),
            format!("({} rules)", component.rules.len()).dim()
        );
        for rule in &component.rules {
            rule.print(2);
        }
    }
}
