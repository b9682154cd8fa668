//! Requirements grouped by framework.
//!
//! [`list_by_framework`] flattens the control implementations of any number
//! of components into one [`RequirementMap`] per framework. The same control
//! declared by several components under one framework ends up as a single
//! entry whose rules are the union of every declaration.

use std::collections::{HashMap, hash_map};

use tracing::instrument;

use crate::{
    domain::{
        framework::classify_framework,
        settings::{Settings, collect_overrides},
    },
    model::ControlImplementation,
};

/// Requirement settings keyed by control ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementMap(HashMap<String, Settings>);

impl RequirementMap {
    /// The settings of a control.
    #[must_use]
    pub fn get(&self, control_id: &str) -> Option<&Settings> {
        self.0.get(control_id)
    }

    /// The number of controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no controls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the controls in no particular order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Settings> {
        self.0.iter()
    }

    /// The controls that map `rule_id`, sorted. Empty if there are none.
    #[must_use]
    pub fn controls_for_rule(&self, rule_id: &str) -> Vec<&str> {
        use crate::domain::ApplySettings;

        let mut controls: Vec<&str> = self
            .0
            .iter()
            .filter(|(_, settings)| settings.contains_rule(rule_id))
            .map(|(control_id, _)| control_id.as_str())
            .collect();
        controls.sort_unstable();
        controls
    }

    /// Collapses every control into one set of settings.
    ///
    /// Controls are folded in control-ID order, so when two controls override
    /// the same parameter, the control that sorts last wins.
    #[must_use]
    pub fn flatten(&self) -> Settings {
        let mut control_ids: Vec<&String> = self.0.keys().collect();
        control_ids.sort_unstable();

        let mut flattened = Settings::default();
        for control_id in control_ids {
            flattened.merge(self.0[control_id].clone());
        }
        flattened
    }

    fn upsert(&mut self, control_id: &str, settings: Settings) {
        match self.0.get_mut(control_id) {
            Some(existing) => existing.merge(settings),
            None => {
                self.0.insert(control_id.to_string(), settings);
            }
        }
    }
}

impl FromIterator<(String, Settings)> for RequirementMap {
    fn from_iter<T: IntoIterator<Item = (String, Settings)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RequirementMap {
    type Item = (&'a String, &'a Settings);
    type IntoIter = hash_map::Iter<'a, String, Settings>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Groups the requirements of every control implementation by framework.
///
/// Declarations whose framework cannot be determined are skipped.
#[instrument(level = "debug", skip_all)]
pub fn list_by_framework<'a, I>(control_implementations: I) -> HashMap<String, RequirementMap>
where
    I: IntoIterator<Item = &'a ControlImplementation>,
{
    let mut by_framework: HashMap<String, RequirementMap> = HashMap::new();

    for control_implementation in control_implementations {
        let Some(framework) = classify_framework(control_implementation) else {
            tracing::debug!(
                source = %control_implementation.source,
                "skipping control implementation without a framework"
            );
            continue;
        };

        let mut overrides = HashMap::new();
        collect_overrides(&control_implementation.set_parameters, &mut overrides);

        let requirements = by_framework.entry(framework).or_default();
        for requirement in &control_implementation.implemented_requirements {
            requirements.upsert(
                &requirement.control_id,
                Settings::from_requirement(&overrides, requirement),
            );
        }
    }

    by_framework
}
