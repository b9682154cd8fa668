//! Namespaced property bags.
//!
//! Rule data travels through component definitions as plain name/value
//! properties in the compliance-trestle namespace. Everything in the crate that
//! reads those properties goes through the accessors in this module rather
//! than scanning property lists by hand.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// The namespace carried by every property this crate interprets.
pub const TRESTLE_NAMESPACE: &str =
    "https://oscal-compass.github.io/compliance-trestle/schemas/oscal";

/// A name/value attribute attached to a document element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Property {
    /// The property name.
    pub name: String,
    /// The property value.
    pub value: String,
    /// Namespace qualifying the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,
    /// Optional classification of the property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Free text; used to group rule properties into sets (`rule_set_00`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Property {
    /// Creates a property in the trestle namespace.
    #[must_use]
    pub fn trestle(name: PropertyName, value: impl Into<String>) -> Self {
        Self {
            name: name.as_str().to_string(),
            value: value.into(),
            ns: Some(TRESTLE_NAMESPACE.to_string()),
            class: None,
            remarks: None,
        }
    }

    /// Returns this property with the given remarks.
    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Whether this property is the trestle property `name`.
    #[must_use]
    pub fn is(&self, name: PropertyName) -> bool {
        self.name == name.as_str() && self.ns.as_deref() == Some(TRESTLE_NAMESPACE)
    }
}

/// The trestle property names understood by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyName {
    /// Identifier of a rule.
    RuleId,
    /// Human-readable description of a rule.
    RuleDescription,
    /// Identifier of the rule's parameter.
    ParameterId,
    /// Description of the rule's parameter.
    ParameterDescription,
    /// Identifier of a check implementing a rule.
    CheckId,
    /// Description of a check.
    CheckDescription,
    /// Short name of the framework a control implementation belongs to.
    FrameworkShortName,
}

impl PropertyName {
    /// The wire name of the property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RuleId => "Rule_Id",
            Self::RuleDescription => "Rule_Description",
            Self::ParameterId => "Parameter_Id",
            Self::ParameterDescription => "Parameter_Description",
            Self::CheckId => "Check_Id",
            Self::CheckDescription => "Check_Description",
            Self::FrameworkShortName => "Framework_Short_Name",
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the first trestle property called `name`.
pub fn find_property<'a, I>(name: PropertyName, props: I) -> Option<&'a Property>
where
    I: IntoIterator<Item = &'a Property>,
{
    props.into_iter().find(|prop| prop.is(name))
}

/// Returns every trestle property called `name`, in document order.
pub fn find_all_properties<'a, I>(
    name: PropertyName,
    props: I,
) -> impl Iterator<Item = &'a Property>
where
    I: IntoIterator<Item = &'a Property>,
{
    props.into_iter().filter(move |prop| prop.is(name))
}

/// Groups properties by their remarks.
///
/// Properties without remarks belong to no group and are dropped. Groups are
/// keyed by the remarks text, so `rule_set_00` sorts before `rule_set_01`.
pub fn group_by_remarks<'a, I>(props: I) -> BTreeMap<&'a str, Vec<&'a Property>>
where
    I: IntoIterator<Item = &'a Property>,
{
    let mut groups: BTreeMap<&str, Vec<&Property>> = BTreeMap::new();
    for prop in props {
        if let Some(remarks) = prop.remarks.as_deref() {
            groups.entry(remarks).or_default().push(prop);
        }
    }
    groups
}
