//! Settings for a whole control implementation.

use std::collections::HashMap;

use tracing::instrument;

use crate::{
    domain::{
        RuleSet,
        framework::classify_framework,
        settings::{ApplySettings, Error, Settings, collect_overrides},
    },
    model::ControlImplementation,
};

/// Settings for rule sets defined at the control-implementation level, with
/// the settings of each implemented requirement underneath.
///
/// Built once from one or more declarations and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplementationSettings {
    /// Every mapped rule, plus the implementation-level overrides.
    implementation: Settings,
    /// Settings per control ID.
    requirements: HashMap<String, Settings>,
}

impl ImplementationSettings {
    /// Builds the settings of a single control implementation.
    #[must_use]
    pub fn new(control_implementation: &ControlImplementation) -> Self {
        let mut settings = Self::default();
        settings.merge(control_implementation);
        settings
    }

    /// Builds the settings for `framework` from every declaration that
    /// belongs to it.
    ///
    /// Declarations are merged in order: mapped rules are unioned, and later
    /// parameter overrides win at both levels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFramework`] if no declaration belongs to
    /// `framework`.
    #[instrument(level = "debug", skip(control_implementations))]
    pub fn for_framework<'a, I>(framework: &str, control_implementations: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a ControlImplementation>,
    {
        let mut settings: Option<Self> = None;

        for control_implementation in control_implementations {
            if classify_framework(control_implementation).as_deref() != Some(framework) {
                continue;
            }
            settings
                .get_or_insert_with(Self::default)
                .merge(control_implementation);
        }

        settings.ok_or_else(|| Error::UnknownFramework(framework.to_string()))
    }

    fn merge(&mut self, control_implementation: &ControlImplementation) {
        let mut overrides = HashMap::new();
        collect_overrides(&control_implementation.set_parameters, &mut overrides);

        for requirement in &control_implementation.implemented_requirements {
            let settings = Settings::from_requirement(&overrides, requirement);
            self.implementation.add_rules(settings.mapped_rules());

            match self.requirements.get_mut(&requirement.control_id) {
                Some(existing) => existing.merge(settings),
                None => {
                    self.requirements
                        .insert(requirement.control_id.clone(), settings);
                }
            }
        }

        self.implementation.add_overrides(overrides);
    }

    /// The implementation-wide settings: every mapped rule, with the
    /// implementation-level parameter overrides.
    #[must_use]
    pub const fn all_settings(&self) -> &Settings {
        &self.implementation
    }

    /// The IDs of the controls that map `rule_id`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoControls`] if no control maps the rule.
    pub fn applicable_controls(&self, rule_id: &str) -> Result<Vec<&str>, Error> {
        let mut controls: Vec<&str> = self
            .requirements
            .iter()
            .filter(|(_, settings)| settings.contains_rule(rule_id))
            .map(|(control_id, _)| control_id.as_str())
            .collect();

        if controls.is_empty() {
            return Err(Error::NoControls(rule_id.to_string()));
        }
        controls.sort_unstable();
        Ok(controls)
    }

    /// The settings of a single control.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownControl`] if the control is not part of the
    /// implementation.
    pub fn by_control_id(&self, control_id: &str) -> Result<&Settings, Error> {
        self.requirements
            .get(control_id)
            .ok_or_else(|| Error::UnknownControl(control_id.to_string()))
    }

    /// Every control ID in the implementation, sorted.
    #[must_use]
    pub fn all_controls(&self) -> Vec<&str> {
        let mut controls: Vec<&str> = self.requirements.keys().map(String::as_str).collect();
        controls.sort_unstable();
        controls
    }
}

impl ApplySettings for ImplementationSettings {
    fn contains_rule(&self, rule_id: &str) -> bool {
        self.implementation.contains_rule(rule_id)
    }

    fn apply_parameter_settings(&self, rule_set: RuleSet) -> RuleSet {
        self.implementation.apply_parameter_settings(rule_set)
    }
}
