//! Rules, the parameters that tune them and the checks that verify them.
//!
//! All of these are values: once built they are only ever read or copied.
//! Applying an override to a parameter produces a new [`RuleSet`] and leaves
//! the original untouched.

use serde::Serialize;

/// A tunable input to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub(crate) id: String,
    pub(crate) description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) value: Option<String>,
}

impl Parameter {
    /// Creates a parameter with no selected value.
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            value: None,
        }
    }

    /// Returns a copy of this parameter with `value` selected.
    #[must_use]
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..self.clone()
        }
    }

    /// The parameter identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The parameter description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The selected value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A named compliance requirement, optionally parameterized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub(crate) id: String,
    pub(crate) description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) parameter: Option<Parameter>,
}

impl Rule {
    /// Creates a rule without a parameter.
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            parameter: None,
        }
    }

    /// Returns this rule with the given parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<Option<Parameter>>) -> Self {
        self.parameter = parameter.into();
        self
    }

    /// The rule identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The rule description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The rule's parameter, if it has one.
    #[must_use]
    pub const fn parameter(&self) -> Option<&Parameter> {
        self.parameter.as_ref()
    }
}

/// A verifiable test implementing a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub(crate) id: String,
    pub(crate) description: String,
}

impl Check {
    /// Creates a check.
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }

    /// The check identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The check description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A rule bundled with its checks.
///
/// This is the unit returned by every store lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    pub(crate) rule: Rule,
    pub(crate) checks: Vec<Check>,
}

impl RuleSet {
    /// Creates a rule set.
    #[must_use]
    pub const fn new(rule: Rule, checks: Vec<Check>) -> Self {
        Self { rule, checks }
    }

    /// The rule.
    #[must_use]
    pub const fn rule(&self) -> &Rule {
        &self.rule
    }

    /// The checks, in registration order.
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Returns this rule set with the parameter value replaced by `value`.
    ///
    /// The parameter is copied before it is changed. A rule set without a
    /// parameter is returned as is.
    #[must_use]
    pub fn with_parameter_value(mut self, value: &str) -> Self {
        if let Some(parameter) = self.rule.parameter.take() {
            self.rule.parameter = Some(parameter.with_value(value));
        }
        self
    }

    /// Adds a check, replacing any existing check with the same ID in place.
    pub(crate) fn upsert_check(&mut self, check: Check) {
        match self.checks.iter_mut().find(|existing| existing.id == check.id) {
            Some(existing) => *existing = check,
            None => self.checks.push(check),
        }
    }

    /// Removes the check with the given ID, if present.
    pub(crate) fn remove_check(&mut self, check_id: &str) {
        self.checks.retain(|existing| existing.id != check_id);
    }
}
