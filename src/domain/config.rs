use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for the command-line resolver.
///
/// None of these settings affect how rules are indexed or resolved; they
/// control how a resolution pass is driven and reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The framework to resolve when none is given on the command line.
    default_framework: Option<String>,

    /// What to do with a component that resolves no rules.
    pub on_empty_component: EmptyComponentPolicy,

    /// Whether JSON output is pretty-printed.
    pub pretty_json: bool,
}

/// What to do with a component that resolves no rules for a framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyComponentPolicy {
    /// Leave the component out of the results.
    #[default]
    Skip,
    /// Abort the resolution pass.
    Fail,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_framework: None,
            on_empty_component: EmptyComponentPolicy::default(),
            pretty_json: default_pretty_json(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Returns the default framework, if configured.
    #[must_use]
    pub fn default_framework(&self) -> Option<&str> {
        self.default_framework.as_deref()
    }
}

const fn default_pretty_json() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_framework: Option<String>,

        #[serde(default)]
        on_empty_component: EmptyComponentPolicy,

        #[serde(default = "default_pretty_json")]
        pretty_json: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                default_framework,
                on_empty_component,
                pretty_json,
            } => Self {
                default_framework,
                on_empty_component,
                pretty_json,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            default_framework: config.default_framework,
            on_empty_component: config.on_empty_component,
            pretty_json: config.pretty_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ndefault_framework = \"cis\"\non_empty_component = \"fail\"\npretty_json = false\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.default_framework(), Some("cis"));
        assert_eq!(config.on_empty_component, EmptyComponentPolicy::Fail);
        assert!(!config.pretty_json);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\non_empty_component = \"explode\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_defaults() {
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();

        assert_eq!(actual.default_framework(), None);
        assert_eq!(actual.on_empty_component, EmptyComponentPolicy::Skip);
        assert!(actual.pretty_json);
    }

    #[test]
    fn default_matches_empty_file() {
        let parsed: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn serializes_with_version_tag() {
        let config: Config =
            toml::from_str("_version = \"1\"\ndefault_framework = \"example\"\n").unwrap();

        let serialized = toml::to_string(&config).unwrap();

        assert!(serialized.contains("_version = \"1\""));
        assert_eq!(toml::from_str::<Config>(&serialized).unwrap(), config);
    }
}
