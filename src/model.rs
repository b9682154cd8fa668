//! The document model consumed by the resolver.
//!
//! These types mirror the parts of an OSCAL component definition that carry
//! rule data. They are plain data: parsing, and any schema validation, happen
//! before the resolver sees them.

mod component;
pub use component::{Component, ComponentDefinition, ComponentType, Document, Metadata};

mod control;
pub use control::{ControlImplementation, ImplementedRequirement, SetParameter};

/// Typed access to namespaced properties.
pub mod property;
pub use property::{Property, PropertyName};
