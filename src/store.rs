//! Rule set lookups.
//!
//! [`Store`] is the single capability every lookup goes through. The
//! [`MemoryStore`] indexes component declarations; the [`RequirementsStore`]
//! narrows any other store to the rules of one framework.

use nonempty::NonEmpty;
use thiserror::Error;

use crate::domain::RuleSet;

mod memory;
pub use memory::MemoryStore;

mod requirements;
pub use requirements::RequirementsStore;

/// Errors raised by store lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No rule with this ID is indexed.
    #[error("rule {0:?}: associated rule object not found")]
    RuleNotFound(String),
    /// No check with this ID is indexed.
    #[error("failed to find rule for check {0:?}: associated rule object not found")]
    CheckNotFound(String),
    /// No rules are associated with this component.
    #[error("failed to find rules for component {0:?}")]
    ComponentNotFound(String),
    /// The rule exists but is not mapped in this view.
    #[error("rule {0} filtered out by requirements")]
    RuleFilteredOut(String),
    /// The check's rule exists but is not mapped in this view.
    #[error("rule for check {0} filtered out by requirements")]
    CheckFilteredOut(String),
    /// The component is known but none of its rules are in scope.
    #[error("no rules found with criteria for component {0}")]
    NoRulesFound(String),
    /// The index was built from no components.
    #[error("failed to create memory store from components: no components found")]
    EmptyInput,
}

impl Error {
    /// Whether the looked-up item does not exist at all.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RuleNotFound(_) | Self::CheckNotFound(_) | Self::ComponentNotFound(_)
        )
    }

    /// Whether the looked-up item exists but is excluded by a view.
    #[must_use]
    pub const fn is_filtered_out(&self) -> bool {
        matches!(
            self,
            Self::RuleFilteredOut(_) | Self::CheckFilteredOut(_) | Self::NoRulesFound(_)
        )
    }
}

/// Read access to indexed rule sets.
pub trait Store {
    /// The rule set of a rule.
    ///
    /// # Errors
    ///
    /// Fails if the rule is unknown or excluded by this store.
    fn get_by_rule_id(&self, rule_id: &str) -> Result<RuleSet, Error>;

    /// The rule set owning a check.
    ///
    /// # Errors
    ///
    /// Fails if the check is unknown or its rule is excluded by this store.
    fn get_by_check_id(&self, check_id: &str) -> Result<RuleSet, Error>;

    /// Every rule set associated with a component, ordered by rule ID.
    ///
    /// # Errors
    ///
    /// Fails if the component is unknown or none of its rules are in scope.
    fn find_by_component(&self, component_id: &str) -> Result<NonEmpty<RuleSet>, Error>;
}

impl<S: Store + ?Sized> Store for &S {
    fn get_by_rule_id(&self, rule_id: &str) -> Result<RuleSet, Error> {
        (**self).get_by_rule_id(rule_id)
    }

    fn get_by_check_id(&self, check_id: &str) -> Result<RuleSet, Error> {
        (**self).get_by_check_id(check_id)
    }

    fn find_by_component(&self, component_id: &str) -> Result<NonEmpty<RuleSet>, Error> {
        (**self).find_by_component(component_id)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Error::RuleNotFound("r".into()), true, false; "rule not found")]
    #[test_case(Error::CheckNotFound("c".into()), true, false; "check not found")]
    #[test_case(Error::ComponentNotFound("k".into()), true, false; "component not found")]
    #[test_case(Error::RuleFilteredOut("r".into()), false, true; "rule filtered")]
    #[test_case(Error::CheckFilteredOut("c".into()), false, true; "check filtered")]
    #[test_case(Error::NoRulesFound("k".into()), false, true; "no rules")]
    #[test_case(Error::EmptyInput, false, false; "empty input")]
    fn classification(error: Error, not_found: bool, filtered_out: bool) {
        assert_eq!(error.is_not_found(), not_found);
        assert_eq!(error.is_filtered_out(), filtered_out);
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::RuleNotFound("etcd_key_file".into()).to_string(),
            r#"rule "etcd_key_file": associated rule object not found"#
        );
        assert_eq!(
            Error::RuleFilteredOut("etcd_key_file".into()).to_string(),
            "rule etcd_key_file filtered out by requirements"
        );
    }
}
