//! TOML configuration for the merge engine and the schema it relies on.
//!
//! ```toml
//! [merge]
//! basic_mode = "stream_and_mutate"
//! warn_without_unique_constraint = true
//!
//! [graph]
//! use_property_indexes = true
//!
//! [[indexes]]
//! label = "City"
//! property = "name"
//!
//! [[constraints]]
//! label = "Person"
//! property = "ssid"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::merge::MergeOptions;
use crate::storage::{Graph, GraphOptions, DEFAULT_MAX_LABELS_PER_NODE};
use crate::types::GraphError;

/// A `(label, property)` pair named in the configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyKeySpec {
    /// Label name.
    pub label: String,
    /// Property key.
    pub property: String,
}

impl PropertyKeySpec {
    /// Builds a pair from its names.
    pub fn new(label: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            property: property.into(),
        }
    }
}

/// Store settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphSection {
    /// Cap on labels per node.
    pub max_labels_per_node: usize,
    /// Whether identity lookups may use `(label, property)` indexes.
    pub use_property_indexes: bool,
}

impl Default for GraphSection {
    fn default() -> Self {
        Self {
            max_labels_per_node: DEFAULT_MAX_LABELS_PER_NODE,
            use_property_indexes: true,
        }
    }
}

/// Whole configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Engine options.
    pub merge: MergeOptions,
    /// Store options.
    pub graph: GraphSection,
    /// Property indexes to install.
    pub indexes: Vec<PropertyKeySpec>,
    /// Unique constraints to install.
    pub constraints: Vec<PropertyKeySpec>,
}

impl MergeConfig {
    /// Parses configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::ParseText { source })
    }

    /// Reads `path`; a missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "config.missing");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|source| ConfigError::Serialize { source })
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn persist(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let serialized = self.to_toml_string()?;
        fs::write(path, serialized).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Engine options from the `[merge]` section.
    pub fn merge_options(&self) -> MergeOptions {
        self.merge
    }

    /// Store options from the `[graph]` section.
    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions::new()
            .max_labels_per_node(self.graph.max_labels_per_node)
            .use_property_indexes(self.graph.use_property_indexes)
    }

    /// Installs every configured index and constraint in one write transaction.
    ///
    /// Either all of them are installed or, on the first failure, none are.
    pub fn apply(&self, graph: &Graph) -> Result<(), ConfigError> {
        let mut tx = graph.begin_write();
        for spec in &self.indexes {
            tx.create_property_index(&spec.label, &spec.property)
                .map_err(|source| ConfigError::schema(spec, source))?;
        }
        for spec in &self.constraints {
            tx.create_unique_constraint(&spec.label, &spec.property)
                .map_err(|source| ConfigError::schema(spec, source))?;
        }
        tx.commit().map_err(|source| ConfigError::Commit { source })?;
        debug!(
            indexes = self.indexes.len(),
            constraints = self.constraints.len(),
            "config.applied"
        );
        Ok(())
    }
}

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read merge config {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// I/O failure.
        source: std::io::Error,
    },
    /// The file is not valid configuration.
    #[error("failed to parse merge config {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// TOML failure.
        source: toml::de::Error,
    },
    /// The text is not valid configuration.
    #[error("failed to parse merge config: {source}")]
    ParseText {
        /// TOML failure.
        source: toml::de::Error,
    },
    /// The configuration could not be rendered.
    #[error("failed to serialize merge config: {source}")]
    Serialize {
        /// TOML failure.
        source: toml::ser::Error,
    },
    /// The file could not be written.
    #[error("failed to write merge config {path}: {source}")]
    Write {
        /// File path.
        path: PathBuf,
        /// I/O failure.
        source: std::io::Error,
    },
    /// A parent directory could not be created.
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// I/O failure.
        source: std::io::Error,
    },
    /// An index or constraint could not be installed.
    #[error("failed to install schema for ({label}, {property}): {source}")]
    Schema {
        /// Label name.
        label: String,
        /// Property key.
        property: String,
        /// Store failure.
        source: GraphError,
    },
    /// The schema transaction could not be committed.
    #[error("failed to commit schema changes: {source}")]
    Commit {
        /// Store failure.
        source: GraphError,
    },
}

impl ConfigError {
    fn schema(spec: &PropertyKeySpec, source: GraphError) -> Self {
        ConfigError::Schema {
            label: spec.label.clone(),
            property: spec.property.clone(),
            source,
        }
    }
}
