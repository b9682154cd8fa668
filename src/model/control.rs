use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::property::{Property, PropertyName, find_all_properties};

/// A set of controls from one source, mapped to the rules that implement them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ControlImplementation {
    /// Unique identifier of the declaration.
    #[serde(default)]
    pub uuid: Uuid,
    /// Reference to the profile or catalog the controls come from.
    #[serde(default)]
    pub source: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Properties, including the optional framework short name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    /// Parameter values that apply to every requirement below.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_parameters: Vec<SetParameter>,
    /// The individual controls.
    #[serde(default)]
    pub implemented_requirements: Vec<ImplementedRequirement>,
}

/// A single control within a [`ControlImplementation`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImplementedRequirement {
    /// Unique identifier of the requirement.
    #[serde(default)]
    pub uuid: Uuid,
    /// The control this requirement implements.
    pub control_id: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Properties, including the mapped `Rule_Id`s.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    /// Parameter values for this control only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_parameters: Vec<SetParameter>,
}

impl ImplementedRequirement {
    /// Returns the IDs of the rules mapped to this control.
    pub fn mapped_rules(&self) -> impl Iterator<Item = &str> {
        find_all_properties(PropertyName::RuleId, &self.props).map(|prop| prop.value.as_str())
    }
}

/// A value assignment for a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SetParameter {
    /// The parameter being set.
    pub param_id: String,
    /// The assigned values.
    #[serde(default)]
    pub values: Vec<String>,
}

impl SetParameter {
    /// Creates a parameter assignment.
    pub fn new<I>(param_id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            param_id: param_id.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The assigned value, if there is exactly one.
    ///
    /// Rule parameters take a single value, so assignments with zero or
    /// several values cannot be used as overrides.
    #[must_use]
    pub fn scalar_value(&self) -> Option<&str> {
        match self.values.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }
}
