//! JSON document persistence.
//!
//! [`JsonStore`] is the whole-file primitive set the accessor is built on:
//! existence check, read, overwrite, and shallow merge.  None of these
//! operations are atomic; a crash mid-write can leave a truncated file.
//!
//! [`FsJsonStore`] writes pretty-printed JSON with a 4-space indent and a
//! trailing newline, creating missing parent directories on every write.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file content is not valid JSON.
    #[error("failed to parse JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be rendered as JSON text.
    #[error("failed to serialize JSON for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A merge was requested into a file whose top level is not an object.
    #[error("cannot merge into {path}: it does not contain a JSON object")]
    NotAnObject { path: PathBuf },
}

/// Whole-file JSON persistence primitives.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JsonStore: Send + Sync {
    /// Returns `true` when a file exists at `path`.
    ///
    /// An I/O error while checking (a parent that is not a directory, denied
    /// permissions) is reported rather than treated as "missing".
    async fn exists(&self, path: &Path) -> Result<bool, StoreError>;

    /// Reads and parses the whole file.
    async fn read_json(&self, path: &Path) -> Result<Value, StoreError>;

    /// Overwrites the whole file with `value`.
    async fn write_json(&self, path: &Path, value: &Value) -> Result<(), StoreError>;

    /// Shallow-merges `entries` into the object stored at `path`.
    ///
    /// A missing (or empty) file is treated as `{}` and created.
    async fn append_json(&self, path: &Path, entries: Map<String, Value>)
        -> Result<(), StoreError>;
}

/// [`JsonStore`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsJsonStore;

impl FsJsonStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl JsonStore for FsJsonStore {
    async fn exists(&self, path: &Path) -> Result<bool, StoreError> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn read_json(&self, path: &Path) -> Result<Value, StoreError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        trace!("read {} bytes from {}", content.len(), path.display());
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn write_json(&self, path: &Path, value: &Value) -> Result<(), StoreError> {
        // Ensure directory exists before writing.
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        let content = to_pretty_json(value).map_err(|source| StoreError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        tokio::fs::write(path, content)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        trace!("wrote {}", path.display());
        Ok(())
    }

    async fn append_json(
        &self,
        path: &Path,
        entries: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut document = match tokio::fs::read_to_string(path).await {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(StoreError::NotAnObject {
                        path: path.to_path_buf(),
                    })
                }
                Err(source) => {
                    return Err(StoreError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        document.extend(entries);
        self.write_json(path, &Value::Object(document)).await
    }
}

/// Renders `value` with a 4-space indent and a trailing newline.
fn to_pretty_json(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
