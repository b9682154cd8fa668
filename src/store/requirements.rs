//! A framework view over another store.

use nonempty::NonEmpty;

use crate::{
    domain::{ApplySettings, RequirementMap, RuleSet, Settings, apply_to_component},
    store::{Error, Store},
};

/// Narrows a base store to the rules mapped by a set of requirements and
/// applies their parameter overrides.
///
/// The base store is only read. Any number of views can share one base by
/// wrapping a reference to it.
#[derive(Debug, Clone)]
pub struct RequirementsStore<S> {
    base: S,
    settings: Settings,
}

impl<S: Store> RequirementsStore<S> {
    /// Creates a view of `base` through every control in `requirements`.
    ///
    /// When two controls override the same parameter, the control whose ID
    /// sorts last wins.
    #[must_use]
    pub fn new(base: S, requirements: &RequirementMap) -> Self {
        Self::with_settings(base, requirements.flatten())
    }

    /// Creates a view of `base` through an explicit set of settings.
    #[must_use]
    pub const fn with_settings(base: S, settings: Settings) -> Self {
        Self { base, settings }
    }

    /// The settings this view applies.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl<S: Store> Store for RequirementsStore<S> {
    fn get_by_rule_id(&self, rule_id: &str) -> Result<RuleSet, Error> {
        let rule_set = self.base.get_by_rule_id(rule_id)?;
        if !self.settings.contains_rule(rule_set.rule().id()) {
            return Err(Error::RuleFilteredOut(rule_id.to_string()));
        }
        Ok(self.settings.apply_parameter_settings(rule_set))
    }

    fn get_by_check_id(&self, check_id: &str) -> Result<RuleSet, Error> {
        let rule_set = self.base.get_by_check_id(check_id)?;
        if !self.settings.contains_rule(rule_set.rule().id()) {
            return Err(Error::CheckFilteredOut(check_id.to_string()));
        }
        Ok(self.settings.apply_parameter_settings(rule_set))
    }

    fn find_by_component(&self, component_id: &str) -> Result<NonEmpty<RuleSet>, Error> {
        apply_to_component(&self.base, component_id, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::{Check, Parameter, Rule};

    /// A store serving fixed rule sets, all owned by one component.
    struct FixedStore {
        rule_sets: HashMap<String, RuleSet>,
    }

    impl FixedStore {
        fn new() -> Self {
            let rule_sets = [
                test_rule("testRule1", None),
                test_rule("testRule2", None),
                test_rule("testRule3", Some("param3")),
            ]
            .into_iter()
            .map(|rule_set| (rule_set.rule().id().to_string(), rule_set))
            .collect();
            Self { rule_sets }
        }
    }

    impl Store for FixedStore {
        fn get_by_rule_id(&self, rule_id: &str) -> Result<RuleSet, Error> {
            self.rule_sets
                .get(rule_id)
                .cloned()
                .ok_or_else(|| Error::RuleNotFound(rule_id.to_string()))
        }

        fn get_by_check_id(&self, check_id: &str) -> Result<RuleSet, Error> {
            self.rule_sets
                .values()
                .find(|rule_set| rule_set.checks().iter().any(|check| check.id() == check_id))
                .cloned()
                .ok_or_else(|| Error::CheckNotFound(check_id.to_string()))
        }

        fn find_by_component(&self, component_id: &str) -> Result<NonEmpty<RuleSet>, Error> {
            if component_id != "component" {
                return Err(Error::ComponentNotFound(component_id.to_string()));
            }
            let mut rule_sets: Vec<RuleSet> = self.rule_sets.values().cloned().collect();
            rule_sets.sort_by(|a, b| a.rule().id().cmp(b.rule().id()));
            NonEmpty::from_vec(rule_sets)
                .ok_or_else(|| Error::ComponentNotFound(component_id.to_string()))
        }
    }

    fn test_rule(id: &str, parameter: Option<&str>) -> RuleSet {
        RuleSet::new(
            Rule::new(id, "Test Rule")
                .with_parameter(parameter.map(|p| Parameter::new(p, "Test Parameter"))),
            vec![Check::new(format!("{id}Check"), "Test Check")],
        )
    }

    fn requirements() -> RequirementMap {
        [
            ("ex-1".to_string(), Settings::new(["testRule1"], [("param3", "ignored")])),
            ("ex-2".to_string(), Settings::new(["testRule3"], [("param3", "override")])),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn get_by_rule_id_filters_and_applies_overrides() {
        let base = FixedStore::new();
        let store = RequirementsStore::new(&base, &requirements());

        assert_eq!(
            store.get_by_rule_id("testRule2").unwrap_err(),
            Error::RuleFilteredOut("testRule2".to_string())
        );
        assert_eq!(
            store.get_by_rule_id("missing").unwrap_err(),
            Error::RuleNotFound("missing".to_string())
        );

        let resolved = store.get_by_rule_id("testRule3").unwrap();
        assert_eq!(resolved.rule().parameter().unwrap().value(), Some("override"));

        // the base store still serves the unmodified rule
        let original = base.get_by_rule_id("testRule3").unwrap();
        assert_eq!(original.rule().parameter().unwrap().value(), None);
    }

    #[test]
    fn get_by_check_id_filters() {
        let base = FixedStore::new();
        let store = RequirementsStore::new(&base, &requirements());

        assert_eq!(store.get_by_check_id("testRule1Check").unwrap(), test_rule("testRule1", None));
        assert_eq!(
            store.get_by_check_id("testRule2Check").unwrap_err(),
            Error::CheckFilteredOut("testRule2Check".to_string())
        );
        assert!(store.get_by_check_id("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn find_by_component_keeps_mapped_rules() {
        let store = RequirementsStore::new(FixedStore::new(), &requirements());

        let resolved = store.find_by_component("component").unwrap();

        let ids: Vec<_> = resolved.iter().map(|rule_set| rule_set.rule().id()).collect();
        assert_eq!(ids, ["testRule1", "testRule3"]);
        assert_eq!(
            resolved.last().rule().parameter().unwrap().value(),
            Some("override")
        );
        assert!(store.find_by_component("other").unwrap_err().is_not_found());
    }

    #[test]
    fn find_by_component_without_mapped_rules_fails() {
        let store = RequirementsStore::with_settings(
            FixedStore::new(),
            Settings::new(["unrelated"], [("param3", "x")]),
        );

        assert_eq!(
            store.find_by_component("component").unwrap_err(),
            Error::NoRulesFound("component".to_string())
        );
    }

    #[test]
    fn repeated_resolution_is_identical() {
        let base = FixedStore::new();
        let store = RequirementsStore::new(&base, &requirements());

        let first = store.find_by_component("component").unwrap();
        let second = store.find_by_component("component").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn views_can_be_stacked() {
        let base = FixedStore::new();
        let outer = RequirementsStore::with_settings(
            RequirementsStore::new(&base, &requirements()),
            Settings::new(["testRule1"], [("param3", "unused")]),
        );

        let ids: Vec<_> = outer
            .find_by_component("component")
            .unwrap()
            .into_iter()
            .map(|rule_set| rule_set.rule().id().to_string())
            .collect();
        assert_eq!(ids, ["testRule1"]);
        assert!(outer.get_by_rule_id("testRule3").unwrap_err().is_filtered_out());
    }
}
