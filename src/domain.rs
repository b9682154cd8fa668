//! Domain types for rule resolution.
//!
//! This module contains rules and their checks, the settings that select and
//! parameterize them, framework classification and configuration.

/// Rules, parameters, checks and rule sets.
pub mod rule;
pub use rule::{Check, Parameter, Rule, RuleSet};

/// Rule selection and parameter overrides.
pub mod settings;
pub use settings::{ApplySettings, Error as SettingsError, Settings, apply_to_component};

/// Settings for a whole control implementation.
pub mod implementation;
pub use implementation::ImplementationSettings;

/// Framework classification of control implementations.
pub mod framework;
pub use framework::classify_framework;

/// Requirements grouped by framework.
pub mod requirements;
pub use requirements::{RequirementMap, list_by_framework};

mod config;
pub use config::{Config, EmptyComponentPolicy};
