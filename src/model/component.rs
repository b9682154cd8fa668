use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{control::ControlImplementation, property::Property};

/// The root of a component-definition document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The wrapped definition.
    #[serde(rename = "component-definition")]
    pub component_definition: ComponentDefinition,
}

/// A collection of components and the controls they implement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentDefinition {
    /// Unique identifier of the definition.
    #[serde(default)]
    pub uuid: Uuid,
    /// Document metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// The defined components.
    #[serde(default)]
    pub components: Vec<Component>,
}

/// The subset of document metadata the resolver keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    #[serde(default)]
    pub title: String,
    /// Document version.
    #[serde(default)]
    pub version: String,
}

/// A system element to which rules are attached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Component {
    /// Unique identifier of the component.
    #[serde(default)]
    pub uuid: Uuid,
    /// What kind of component this is.
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// The component title, which doubles as its lookup key.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Properties, including the grouped rule and check declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    /// Control implementations declared by this component.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_implementations: Vec<ControlImplementation>,
}

/// The type tag of a [`Component`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    /// Software; defines rules.
    #[default]
    Software,
    /// A service.
    Service,
    /// Physical hardware.
    Hardware,
    /// A policy document.
    Policy,
    /// A process.
    Process,
    /// A validator; registers the checks that implement rules.
    Validation,
    /// The system as a whole.
    ThisSystem,
    /// A connection to an external system.
    Interconnection,
    /// Any other type.
    #[serde(other)]
    Other,
}
