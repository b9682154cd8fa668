//! Compliance rule resolution
//!
//! Component definitions map controls to rules, and rules to the checks that
//! verify them. This crate indexes those rules and resolves which of them
//! apply to a component under a given framework, with which parameter values.
//!
//! ```
//! use compliance_rules::{
//!     MemoryStore, RequirementsStore, Store, list_by_framework,
//!     model::{Component, ComponentType, ControlImplementation, ImplementedRequirement, Property, PropertyName},
//! };
//!
//! let component = Component {
//!     title: "Kubernetes".to_string(),
//!     component_type: ComponentType::Software,
//!     props: vec![
//!         Property::trestle(PropertyName::RuleId, "etcd_cert_file").with_remarks("rule_set_00"),
//!     ],
//!     control_implementations: vec![ControlImplementation {
//!         source: "profiles/cis/profile.json".to_string(),
//!         implemented_requirements: vec![ImplementedRequirement {
//!             control_id: "CIS-2.1".to_string(),
//!             props: vec![Property::trestle(PropertyName::RuleId, "etcd_cert_file")],
//!             ..ImplementedRequirement::default()
//!         }],
//!         ..ControlImplementation::default()
//!     }],
//!     ..Component::default()
//! };
//!
//! let store = MemoryStore::from_components([&component])?;
//! let frameworks = list_by_framework(&component.control_implementations);
//! let cis = RequirementsStore::new(&store, &frameworks["cis"]);
//!
//! let rules = cis.find_by_component("Kubernetes")?;
//! assert_eq!(rules.head.rule().id(), "etcd_cert_file");
//! # Ok::<(), compliance_rules::StoreError>(())
//! ```

pub mod domain;
pub use domain::{
    ApplySettings, Check, Config, EmptyComponentPolicy, ImplementationSettings, Parameter,
    RequirementMap, Rule, RuleSet, Settings, SettingsError, apply_to_component,
    classify_framework, list_by_framework,
};

pub mod model;

pub mod store;
pub use store::{Error as StoreError, MemoryStore, RequirementsStore, Store};

/// Filesystem loading of component definitions.
pub mod storage;
pub use storage::{LoadError, load_definition, load_definitions};
