use std::{collections::BTreeSet, path::PathBuf};

use clap::Parser;
use compliance_rules::{Config, list_by_framework, model::Component};
use serde::Serialize;
use tracing::instrument;

use super::{OutputFormat, load_components, print_json, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct Frameworks {
    /// A component-definition file, or a directory of them
    input: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct FrameworkSummary {
    name: String,
    controls: usize,
    rules: usize,
}

impl Frameworks {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let components = load_components(&self.input)?;
        let summaries = summarize(&components);

        match self.output {
            OutputFormat::Json => print_json(&summaries, config.pretty_json)?,
            OutputFormat::Table => output_table(&summaries),
        }
        Ok(())
    }
}

/// Counts the controls and distinct mapped rules of each framework, sorted by
/// framework name.
fn summarize(components: &[Component]) -> Vec<FrameworkSummary> {
    let by_framework = list_by_framework(
        components
            .iter()
            .flat_map(|component| &component.control_implementations),
    );

    let mut summaries: Vec<FrameworkSummary> = by_framework
        .iter()
        .map(|(name, requirements)| {
            let rules: BTreeSet<&str> = requirements
                .iter()
                .flat_map(|(_, settings)| settings.mapped_rules())
                .collect();
            FrameworkSummary {
                name: name.clone(),
                controls: requirements.len(),
                rules: rules.len(),
            }
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

fn output_table(summaries: &[FrameworkSummary]) {
    if summaries.is_empty() {
        println!("{}", "No frameworks found.".warning());
        return;
    }

    let width = summaries
        .iter()
        .map(|summary| summary.name.len())
        .max()
        .unwrap_or_default()
        .max("FRAMEWORK".len());

    println!(
        "{}",
        format!("{:<width$}  {:>8}  {:>5}", "FRAMEWORK", "CONTROLS", "RULES").dim()
    );
    for summary in summaries {
        println!(
            "{}  {:>8}  {:>5}",
            format!("{:<width$}", summary.name).id(),
            summary.controls,
            summary.rules
        );
    }
}
