//! Error type returned by every accessor operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::keys::InvalidKey;
use crate::infrastructure::store::StoreError;

/// Error type for config file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The requested key is outside the configured allowed-key set.
    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),

    /// The file parses as JSON but its top level is not an object.
    #[error(
        "Cannot use file \"{}\" as a JSON config file: it does not contain a JSON object.",
        .path.display()
    )]
    MalformedFile { path: PathBuf },

    /// The key is absent and there is neither a predefined value nor a
    /// generator to produce one.
    #[error(
        "Could not find or create any value for key '{key}' in config file '{}'",
        .path.display()
    )]
    NoValue { key: String, path: PathBuf },

    /// The definition has neither a generator nor predefined values.
    #[error("a config file needs a value generator or predefined values")]
    MissingValueSource,

    /// The process working directory could not be read while building the
    /// log root.
    #[error("could not determine the current working directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    /// The persistence adapter failed.
    #[error(transparent)]
    Store(StoreError),

    /// A value could not be converted to or from JSON.
    #[error("value for key '{key}' does not match the config value type: {source}")]
    Value {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A caller-supplied hook or log callback returned an error.
    #[error("{hook} failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl From<StoreError> for ConfigFileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotAnObject { path } => ConfigFileError::MalformedFile { path },
            other => ConfigFileError::Store(other),
        }
    }
}

impl ConfigFileError {
    pub(crate) fn hook(hook: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| ConfigFileError::Hook { hook, source }
    }

    pub(crate) fn value(key: &str) -> impl FnOnce(serde_json::Error) -> Self + '_ {
        move |source| ConfigFileError::Value {
            key: key.to_string(),
            source,
        }
    }
}
