//! Component definitions stored as JSON or YAML files.
//!
//! A single file is loaded as is. A directory is walked recursively and every
//! file with a recognised extension is loaded, in path order, so the
//! resulting component sequence is stable between runs.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::instrument;
use walkdir::WalkDir;

use crate::model::{ComponentDefinition, Document};

/// Errors that can occur when loading component definitions.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A file could not be read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// A JSON file is not a component definition.
    #[error("failed to parse {} as JSON", .path.display())]
    Json {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A YAML file is not a component definition.
    #[error("failed to parse {} as YAML", .path.display())]
    Yaml {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_yaml::Error,
    },
    /// The file extension is not one of `json`, `yaml` or `yml`.
    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// A directory walk failed.
    #[error("failed to walk directory")]
    Walk(#[from] walkdir::Error),
    /// A directory holds no component definitions.
    #[error("no component definitions found in {}", .0.display())]
    NoDefinitions(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Loads a single component-definition file.
///
/// # Errors
///
/// Returns an error if the file has an unsupported extension, cannot be read
/// or does not hold a component definition.
pub fn load_definition(path: &Path) -> Result<ComponentDefinition, LoadError> {
    let format =
        Format::of(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document: Document = match format {
        Format::Json => serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Format::Yaml => serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
    };

    tracing::debug!(
        "Loaded {} components from {}",
        document.component_definition.components.len(),
        path.display()
    );
    Ok(document.component_definition)
}

/// Loads a component-definition file, or every definition under a directory.
///
/// Files with unrecognised extensions are skipped when walking a directory.
///
/// # Errors
///
/// Returns an error if any definition fails to load, or if a directory holds
/// no definitions at all.
#[instrument(level = "debug")]
pub fn load_definitions(path: &Path) -> Result<Vec<ComponentDefinition>, LoadError> {
    if !path.is_dir() {
        return Ok(vec![load_definition(path)?]);
    }

    let definitions = collect_definition_paths(path)?
        .into_iter()
        .map(|path| load_definition(&path))
        .collect::<Result<Vec<_>, _>>()?;

    if definitions.is_empty() {
        return Err(LoadError::NoDefinitions(path.to_path_buf()));
    }
    Ok(definitions)
}

fn collect_definition_paths(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if Format::of(entry.path()).is_none() {
            tracing::debug!("Skipping unrecognised file {}", entry.path().display());
            continue;
        }
        paths.push(entry.into_path());
    }

    Ok(paths)
}
