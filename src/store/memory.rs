//! An in-memory index of rule sets.
//!
//! The [`MemoryStore`] is built once from a batch of components and only read
//! afterwards. Rules are defined by the rule properties of non-validation
//! components; checks are registered by any component, typically a
//! validator.

use std::collections::{BTreeSet, HashMap};

use nonempty::NonEmpty;
use tracing::instrument;

use crate::{
    domain::{Check, Parameter, Rule, RuleSet},
    model::{
        Component, ComponentType, Property, PropertyName,
        property::{find_all_properties, find_property, group_by_remarks},
    },
    store::{Error, Store},
};

/// Rule sets indexed by rule ID, check ID and component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    /// Rule sets keyed by rule ID.
    nodes: HashMap<String, RuleSet>,

    /// Owning rule ID keyed by check ID.
    by_check: HashMap<String, String>,

    /// Associated rule IDs keyed by component title.
    /// Ordered so component lookups are deterministic.
    rules_by_component: HashMap<String, BTreeSet<String>>,
}

/// One rule declaration read from a group of component properties.
struct Association {
    rule: Rule,
    checks: Vec<Check>,
}

impl MemoryStore {
    /// Indexes the rule declarations of every component.
    ///
    /// A rule declared by several components is indexed once: the last
    /// definition wins, and checks accumulate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] if `components` is empty.
    #[instrument(level = "debug", skip_all)]
    pub fn from_components<'a, I>(components: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a Component>,
    {
        let mut store = Self::default();
        let mut indexed = 0_usize;

        for component in components {
            store.index_component(component);
            indexed += 1;
        }

        if indexed == 0 {
            return Err(Error::EmptyInput);
        }

        tracing::debug!(
            components = indexed,
            rules = store.nodes.len(),
            checks = store.by_check.len(),
            "built rule index"
        );
        Ok(store)
    }

    #[instrument(level = "debug", skip_all, fields(component = %component.title))]
    fn index_component(&mut self, component: &Component) {
        let defines_rules = component.component_type != ComponentType::Validation;
        let mut rule_ids = BTreeSet::new();

        for Association { rule, checks } in associations(&component.props) {
            let rule_id = rule.id.clone();

            // a check belongs to exactly one rule
            for check in &checks {
                let previous = self.by_check.insert(check.id.clone(), rule_id.clone());
                if let Some(previous) = previous.filter(|previous| *previous != rule_id) {
                    tracing::debug!(
                        check = %check.id,
                        from = %previous,
                        to = %rule_id,
                        "moving check to another rule"
                    );
                    if let Some(old) = self.nodes.get_mut(&previous) {
                        old.remove_check(&check.id);
                    }
                }
            }

            let placeholder = Rule::new(rule_id.as_str(), "");
            let rule_set = self
                .nodes
                .entry(rule_id.clone())
                .or_insert_with(|| RuleSet::new(placeholder.clone(), Vec::new()));

            if defines_rules {
                if rule_set.rule != placeholder && rule_set.rule != rule {
                    tracing::debug!(rule = %rule_id, "replacing earlier rule definition");
                }
                rule_set.rule = rule;
            }

            for check in checks {
                rule_set.upsert_check(check);
            }

            rule_ids.insert(rule_id);
        }

        if rule_ids.is_empty() {
            tracing::debug!("component declares no rules");
            return;
        }

        self.rules_by_component
            .entry(component.title.clone())
            .or_default()
            .extend(rule_ids);
    }

    /// The number of indexed rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no rules are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Store for MemoryStore {
    fn get_by_rule_id(&self, rule_id: &str) -> Result<RuleSet, Error> {
        self.nodes
            .get(rule_id)
            .cloned()
            .ok_or_else(|| Error::RuleNotFound(rule_id.to_string()))
    }

    fn get_by_check_id(&self, check_id: &str) -> Result<RuleSet, Error> {
        self.by_check
            .get(check_id)
            .and_then(|rule_id| self.nodes.get(rule_id))
            .cloned()
            .ok_or_else(|| Error::CheckNotFound(check_id.to_string()))
    }

    fn find_by_component(&self, component_id: &str) -> Result<NonEmpty<RuleSet>, Error> {
        let rule_sets: Vec<RuleSet> = self
            .rules_by_component
            .get(component_id)
            .map(|rule_ids| {
                rule_ids
                    .iter()
                    .filter_map(|rule_id| self.nodes.get(rule_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        NonEmpty::from_vec(rule_sets)
            .ok_or_else(|| Error::ComponentNotFound(component_id.to_string()))
    }
}

/// Reads the rule declarations from a component's properties.
///
/// Properties are grouped by their remarks; every group with a `Rule_Id` is
/// one declaration.
fn associations(props: &[Property]) -> Vec<Association> {
    group_by_remarks(props)
        .into_values()
        .filter_map(|group| association(&group))
        .collect()
}

fn association(group: &[&Property]) -> Option<Association> {
    let rule_id = value(PropertyName::RuleId, group)?;
    let description = value(PropertyName::RuleDescription, group).unwrap_or_default();

    let parameter = value(PropertyName::ParameterId, group).map(|parameter_id| {
        Parameter::new(
            parameter_id,
            value(PropertyName::ParameterDescription, group).unwrap_or_default(),
        )
    });

    // check descriptions pair with check IDs by position
    let check_descriptions: Vec<&str> =
        find_all_properties(PropertyName::CheckDescription, group.iter().copied())
            .map(|prop| prop.value.as_str())
            .collect();
    let checks = find_all_properties(PropertyName::CheckId, group.iter().copied())
        .enumerate()
        .map(|(index, prop)| {
            Check::new(
                prop.value.as_str(),
                check_descriptions.get(index).copied().unwrap_or_default(),
            )
        })
        .collect();

    Some(Association {
        rule: Rule::new(rule_id, description).with_parameter(parameter),
        checks,
    })
}

fn value<'a>(name: PropertyName, group: &[&'a Property]) -> Option<&'a str> {
    find_property(name, group.iter().copied()).map(|prop| prop.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: PropertyName, value: &str, remarks: &str) -> Property {
        Property::trestle(name, value).with_remarks(remarks)
    }

    fn component(title: &str, component_type: ComponentType, props: Vec<Property>) -> Component {
        Component {
            title: title.to_string(),
            component_type,
            props,
            ..Component::default()
        }
    }

    fn kubernetes() -> Component {
        component(
            "Kubernetes",
            ComponentType::Software,
            vec![
                prop(PropertyName::RuleId, "etcd_cert_file", "rule_set_00"),
                prop(
                    PropertyName::RuleDescription,
                    "Ensure that the --cert-file argument is set as appropriate",
                    "rule_set_00",
                ),
                prop(PropertyName::RuleId, "etcd_key_file", "rule_set_01"),
                prop(
                    PropertyName::RuleDescription,
                    "Ensure that the --key-file argument is set as appropriate",
                    "rule_set_01",
                ),
                prop(PropertyName::ParameterId, "file_name", "rule_set_01"),
                prop(
                    PropertyName::ParameterDescription,
                    "A parameter for a file name",
                    "rule_set_01",
                ),
            ],
        )
    }

    fn validator() -> Component {
        component(
            "Validator",
            ComponentType::Validation,
            vec![
                prop(PropertyName::RuleId, "etcd_cert_file", "rule_set_00"),
                prop(PropertyName::CheckId, "etcd_cert_file", "rule_set_00"),
                prop(
                    PropertyName::CheckDescription,
                    "Check that the --cert-file argument is set as appropriate",
                    "rule_set_00",
                ),
                prop(PropertyName::RuleId, "etcd_key_file", "rule_set_01"),
                prop(PropertyName::CheckId, "etcd_key_file", "rule_set_01"),
                prop(
                    PropertyName::CheckDescription,
                    "Check that the --key-file argument is set as appropriate",
                    "rule_set_01",
                ),
            ],
        )
    }

    fn expected_key_file() -> RuleSet {
        RuleSet::new(
            Rule::new(
                "etcd_key_file",
                "Ensure that the --key-file argument is set as appropriate",
            )
            .with_parameter(Parameter::new("file_name", "A parameter for a file name")),
            vec![Check::new(
                "etcd_key_file",
                "Check that the --key-file argument is set as appropriate",
            )],
        )
    }

    fn store() -> MemoryStore {
        MemoryStore::from_components(&[kubernetes(), validator()]).unwrap()
    }

    #[test]
    fn get_by_rule_id() {
        let store = store();

        assert_eq!(store.get_by_rule_id("etcd_key_file").unwrap(), expected_key_file());
        assert_eq!(
            store.get_by_rule_id("not_a_rule").unwrap_err(),
            Error::RuleNotFound("not_a_rule".to_string())
        );
    }

    #[test]
    fn get_by_check_id() {
        let store = store();

        assert_eq!(store.get_by_check_id("etcd_key_file").unwrap(), expected_key_file());
        assert_eq!(
            store.get_by_check_id("not_a_check").unwrap_err(),
            Error::CheckNotFound("not_a_check".to_string())
        );
    }

    #[test]
    fn find_by_component() {
        let store = store();

        for title in ["Kubernetes", "Validator"] {
            let rule_ids: Vec<_> = store
                .find_by_component(title)
                .unwrap()
                .iter()
                .map(|rule_set| rule_set.rule().id().to_string())
                .collect();
            assert_eq!(rule_ids, ["etcd_cert_file", "etcd_key_file"]);
        }

        assert!(store.find_by_component("Unknown").unwrap_err().is_not_found());
    }

    #[test]
    fn empty_input_fails() {
        let none: [Component; 0] = [];
        assert_eq!(
            MemoryStore::from_components(&none).unwrap_err(),
            Error::EmptyInput
        );
    }

    #[test]
    fn component_without_rules_is_not_recorded() {
        let empty = component("Empty", ComponentType::Software, Vec::new());
        let store = MemoryStore::from_components(&[kubernetes(), empty]).unwrap();

        assert_eq!(
            store.find_by_component("Empty").unwrap_err(),
            Error::ComponentNotFound("Empty".to_string())
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn checks_registered_before_rule_are_kept() {
        let store = MemoryStore::from_components(&[validator(), kubernetes()]).unwrap();

        assert_eq!(store.get_by_rule_id("etcd_key_file").unwrap(), expected_key_file());
    }

    #[test]
    fn check_without_rule_definition_has_placeholder_rule() {
        let store = MemoryStore::from_components(&[validator()]).unwrap();

        let rule_set = store.get_by_check_id("etcd_cert_file").unwrap();
        assert_eq!(rule_set.rule(), &Rule::new("etcd_cert_file", ""));
        assert_eq!(rule_set.checks().len(), 1);
    }

    #[test]
    fn later_rule_definition_wins() {
        let redefined = component(
            "Other",
            ComponentType::Service,
            vec![
                prop(PropertyName::RuleId, "etcd_cert_file", "rule_set_00"),
                prop(PropertyName::RuleDescription, "Redefined", "rule_set_00"),
            ],
        );

        let store = MemoryStore::from_components(&[kubernetes(), validator(), redefined]).unwrap();

        let rule_set = store.get_by_rule_id("etcd_cert_file").unwrap();
        assert_eq!(rule_set.rule().description(), "Redefined");
        assert_eq!(rule_set.checks().len(), 1);
    }

    #[test]
    fn check_moved_to_another_rule_leaves_the_first() {
        let first = component(
            "First",
            ComponentType::Validation,
            vec![
                prop(PropertyName::RuleId, "A", "rule_set_00"),
                prop(PropertyName::CheckId, "c", "rule_set_00"),
            ],
        );
        let second = component(
            "Second",
            ComponentType::Validation,
            vec![
                prop(PropertyName::RuleId, "B", "rule_set_00"),
                prop(PropertyName::CheckId, "c", "rule_set_00"),
            ],
        );

        let store = MemoryStore::from_components(&[first, second]).unwrap();

        assert_eq!(store.get_by_check_id("c").unwrap().rule().id(), "B");
        assert!(store.get_by_rule_id("A").unwrap().checks().is_empty());
        assert_eq!(
            store.get_by_rule_id("B").unwrap().checks(),
            [Check::new("c", "")]
        );
    }

    #[test]
    fn check_registered_twice_for_one_rule_is_kept() {
        let store = MemoryStore::from_components(&[validator(), validator()]).unwrap();

        assert_eq!(
            store.get_by_rule_id("etcd_key_file").unwrap().checks().len(),
            1
        );
    }

    #[test]
    fn groups_without_rule_id_are_ignored() {
        let loose = component(
            "Loose",
            ComponentType::Software,
            vec![
                prop(PropertyName::CheckId, "orphan_check", "rule_set_00"),
                Property::trestle(PropertyName::RuleId, "no_remarks"),
            ],
        );

        let store = MemoryStore::from_components(&[loose]).unwrap();

        assert!(store.is_empty());
        assert!(store.get_by_check_id("orphan_check").unwrap_err().is_not_found());
    }

    #[test]
    fn multiple_checks_pair_with_descriptions_by_position() {
        let validator = component(
            "Validator",
            ComponentType::Validation,
            vec![
                prop(PropertyName::RuleId, "r1", "rule_set_00"),
                prop(PropertyName::CheckId, "c1", "rule_set_00"),
                prop(PropertyName::CheckDescription, "first", "rule_set_00"),
                prop(PropertyName::CheckId, "c2", "rule_set_00"),
            ],
        );

        let store = MemoryStore::from_components(&[validator]).unwrap();

        let rule_set = store.get_by_check_id("c2").unwrap();
        assert_eq!(
            rule_set.checks(),
            [Check::new("c1", "first"), Check::new("c2", "")]
        );
    }
}
