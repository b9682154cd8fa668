//! Rule selection and parameter overrides.
//!
//! A [`Settings`] value says which rules are in scope and which parameter
//! values replace the rules' defaults. Settings exist at two levels: the whole
//! control implementation, and a single requirement (control) within it. A
//! requirement's settings start from a copy of the implementation-level
//! overrides and apply its own on top.

use std::collections::{HashMap, HashSet};

use nonempty::NonEmpty;
use thiserror::Error;

use crate::{
    domain::RuleSet,
    model::{ImplementedRequirement, SetParameter},
    store::{self, Store},
};

/// Errors raised when querying settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No control in the implementation maps the rule.
    #[error("no controls reference rule {0}")]
    NoControls(String),
    /// The control is not part of the implementation.
    #[error("unknown control {0}")]
    UnknownControl(String),
    /// No control implementation belongs to the framework.
    #[error("framework {0} is not in control implementations")]
    UnknownFramework(String),
}

/// Tunes rule sets for a scope.
pub trait ApplySettings {
    /// Whether the rule is mapped in this scope.
    fn contains_rule(&self, rule_id: &str) -> bool;

    /// Returns the rule set with the scope's parameter value applied.
    ///
    /// If the rule has no parameter, or the scope has no value for it, the
    /// rule set is returned unchanged. Otherwise the parameter is copied and
    /// the copy carries the new value.
    #[must_use]
    fn apply_parameter_settings(&self, rule_set: RuleSet) -> RuleSet;
}

/// The mapped rules and parameter overrides for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    mapped_rules: HashSet<String>,
    selected_parameters: HashMap<String, String>,
}

impl Settings {
    /// Creates settings from a set of rule IDs and parameter overrides.
    pub fn new<R, P, K, V>(mapped_rules: R, selected_parameters: P) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mapped_rules: mapped_rules.into_iter().map(Into::into).collect(),
            selected_parameters: selected_parameters
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Builds the settings of one requirement.
    ///
    /// The implementation-level overrides are copied first so that the
    /// requirement's own values win on collision.
    pub(crate) fn from_requirement(
        implementation_overrides: &HashMap<String, String>,
        requirement: &ImplementedRequirement,
    ) -> Self {
        let mut selected_parameters = implementation_overrides.clone();
        collect_overrides(&requirement.set_parameters, &mut selected_parameters);

        Self {
            mapped_rules: requirement.mapped_rules().map(str::to_owned).collect(),
            selected_parameters,
        }
    }

    /// Folds `other` into these settings.
    ///
    /// Mapped rules are unioned; `other`'s overrides win on collision.
    pub(crate) fn merge(&mut self, other: Self) {
        self.mapped_rules.extend(other.mapped_rules);
        self.add_overrides(other.selected_parameters);
    }

    pub(crate) fn add_rules<'a>(&mut self, rules: impl IntoIterator<Item = &'a str>) {
        self.mapped_rules.extend(rules.into_iter().map(str::to_owned));
    }

    pub(crate) fn add_overrides(&mut self, overrides: HashMap<String, String>) {
        self.selected_parameters.extend(overrides);
    }

    /// The mapped rule IDs, in no particular order.
    pub fn mapped_rules(&self) -> impl Iterator<Item = &str> {
        self.mapped_rules.iter().map(String::as_str)
    }

    /// The parameter overrides keyed by parameter ID.
    #[must_use]
    pub const fn selected_parameters(&self) -> &HashMap<String, String> {
        &self.selected_parameters
    }

    /// The override for a parameter, if one is set.
    #[must_use]
    pub fn selected_value(&self, parameter_id: &str) -> Option<&str> {
        self.selected_parameters.get(parameter_id).map(String::as_str)
    }
}

impl ApplySettings for Settings {
    fn contains_rule(&self, rule_id: &str) -> bool {
        self.mapped_rules.contains(rule_id)
    }

    fn apply_parameter_settings(&self, rule_set: RuleSet) -> RuleSet {
        let value = rule_set
            .rule()
            .parameter()
            .and_then(|parameter| self.selected_value(parameter.id()));

        match value {
            Some(value) => rule_set.with_parameter_value(value),
            None => rule_set,
        }
    }
}

/// Records the single-valued parameter assignments in `overrides`.
///
/// Later assignments win. Assignments with any other number of values cannot
/// select a rule parameter and are skipped.
pub(crate) fn collect_overrides(
    parameters: &[SetParameter],
    overrides: &mut HashMap<String, String>,
) {
    for parameter in parameters {
        if let Some(value) = parameter.scalar_value() {
            overrides.insert(parameter.param_id.clone(), value.to_string());
        } else {
            tracing::debug!(
                parameter = %parameter.param_id,
                values = parameter.values.len(),
                "ignoring parameter override without exactly one value"
            );
        }
    }
}

/// Returns the rule sets of a component that are in scope for `settings`,
/// with the scope's parameter values applied.
///
/// # Errors
///
/// Propagates the store's error if the component cannot be found, and returns
/// [`store::Error::NoRulesFound`] if none of its rules are in scope.
pub fn apply_to_component<S, A>(
    store: &S,
    component_id: &str,
    settings: &A,
) -> Result<NonEmpty<RuleSet>, store::Error>
where
    S: Store + ?Sized,
    A: ApplySettings + ?Sized,
{
    let resolved: Vec<RuleSet> = store
        .find_by_component(component_id)?
        .into_iter()
        .filter(|rule_set| settings.contains_rule(rule_set.rule().id()))
        .map(|rule_set| settings.apply_parameter_settings(rule_set))
        .collect();

    NonEmpty::from_vec(resolved)
        .ok_or_else(|| store::Error::NoRulesFound(component_id.to_string()))
}
