//! TOML definition files for the `config-file` command.
//!
//! A definition describes one JSON config file the way
//! [`ConfigFile::builder`] does, but in a file so the CLI can be pointed at
//! it.  Example:
//!
//! ```toml
//! file_path = "./settings.json"
//! allowed_keys = ["theme", "locale", "session"]
//! log_relative_path = "."
//!
//! [predefined_values]
//! theme = "dark"
//!
//! [generator]
//! kind = "uuid"
//! ```
//!
//! # Generator kinds
//!
//! | `kind`       | Produces                                   |
//! |--------------|--------------------------------------------|
//! | `"constant"` | the `value` field, every time              |
//! | `"uuid"`     | a fresh v4 UUID string per absent key      |
//!
//! Fields annotated with `#[serde(default)]` may be left out of the TOML.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config_file_core::{ConfigFile, ConfigFileBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Error type for definition loading.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Neither a definition file nor a target JSON file was given.
    #[error("no config file given: pass --definition or --file")]
    NoTarget,

    /// A file system I/O error occurred.
    #[error("I/O error reading definition at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse definition TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Definition schema types ───────────────────────────────────────────────────

/// One JSON config file, as described on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileDefinition {
    /// Path of the JSON document.  Relative paths resolve against the
    /// working directory.
    pub file_path: PathBuf,
    /// Closed key set.  Absent means any key is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_keys: Option<Vec<String>>,
    /// Fixed values for absent keys.  Checked before the generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predefined_values: Option<BTreeMap<String, Value>>,
    /// How to produce a value for an absent key with no predefined value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorSpec>,
    /// Root for paths reported by `--log`.  Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_relative_path: Option<PathBuf>,
}

/// Default-value generator selected in a definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorSpec {
    Constant { value: Value },
    Uuid,
}

impl FileDefinition {
    /// Open-schema definition for `file_path` with no way to create values.
    ///
    /// Reads, updates, and deletes work; `get` on an absent key reports that
    /// no value could be produced.
    pub fn open(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            allowed_keys: None,
            predefined_values: Some(BTreeMap::new()),
            generator: None,
            log_relative_path: None,
        }
    }

    /// Starts an accessor builder populated from this definition.
    pub fn builder(&self) -> ConfigFileBuilder<Value> {
        let mut builder = ConfigFile::<Value>::builder(&self.file_path);

        if let Some(keys) = &self.allowed_keys {
            builder = builder.allowed_keys(keys.iter().cloned());
        }
        if let Some(values) = &self.predefined_values {
            builder = builder.predefined_values(values.clone());
        }
        match &self.generator {
            Some(GeneratorSpec::Constant { value }) => {
                let value = value.clone();
                builder = builder.generator(move || Ok(value.clone()));
            }
            Some(GeneratorSpec::Uuid) => {
                builder = builder.generator(|| Ok(Value::String(Uuid::new_v4().to_string())));
            }
            None => {}
        }
        if let Some(root) = &self.log_relative_path {
            builder = builder.log_relative_path(root);
        }
        builder
    }
}

// ── Definition loading ────────────────────────────────────────────────────────

/// Loads a [`FileDefinition`] from a TOML file.
///
/// # Errors
///
/// Returns [`DefinitionError::Io`] when the file cannot be read and
/// [`DefinitionError::Parse`] when the TOML is malformed.
pub fn load_definition(path: &Path) -> Result<FileDefinition, DefinitionError> {
    let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Picks the definition for a CLI invocation.
///
/// A definition file wins; `file_override` then replaces its `file_path`.
/// Without a definition file, `file_override` alone yields an open-schema
/// definition.
///
/// # Errors
///
/// [`DefinitionError::NoTarget`] when both are `None`, otherwise whatever
/// [`load_definition`] reports.
pub fn resolve_definition(
    definition_path: Option<&Path>,
    file_override: Option<PathBuf>,
) -> Result<FileDefinition, DefinitionError> {
    match (definition_path, file_override) {
        (Some(path), file_override) => {
            let mut definition = load_definition(path)?;
            if let Some(file_path) = file_override {
                definition.file_path = file_path;
            }
            Ok(definition)
        }
        (None, Some(file_path)) => Ok(FileDefinition::open(file_path)),
        (None, None) => Err(DefinitionError::NoTarget),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
