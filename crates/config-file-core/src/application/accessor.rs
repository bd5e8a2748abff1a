//! ConfigFile: typed accessor over one JSON document on disk.
//!
//! Every keyed operation validates the key against the allowed-key set
//! before the file is touched.  The backing file is created lazily by
//! [`ConfigFile::get_with_update`]; reads and deletes on a missing file are
//! no-ops.
//!
//! # Resolution order for an absent key
//!
//! ```text
//! predefined value for key  ──►  generator  ──►  NoValue error
//! ```
//!
//! A predefined value wins over the generator when both exist.
//!
//! # Concurrency
//!
//! There is no locking.  Two overlapping calls on the same file can
//! interleave at `.await` points and the last merge wins.  Callers that need
//! atomic read-modify-write across tasks must serialise calls themselves.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::application::builder::{
    ConfigFileBuilder, Definition, FileInitFn, GenerateFn, TransformFn,
};
use crate::application::error::ConfigFileError;
use crate::application::logger::OperationLogger;
use crate::domain::keys::AllowedKeys;
use crate::domain::paths;
use crate::infrastructure::store::JsonStore;

/// Handle to one JSON config file.
///
/// Immutable after construction and cheap to clone; clones share the same
/// definition and store.
pub struct ConfigFile<V> {
    inner: Arc<Inner<V>>,
}

struct Inner<V> {
    file_path: PathBuf,
    allowed_keys: Option<AllowedKeys>,
    predefined_values: HashMap<String, V>,
    generator: Option<GenerateFn<V>>,
    transform: Option<TransformFn<V>>,
    file_init: Option<FileInitFn>,
    log_root: PathBuf,
    logger: OperationLogger<V>,
    store: Arc<dyn JsonStore>,
}

impl<V> Clone for ConfigFile<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for ConfigFile<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigFile")
            .field("file_path", &self.inner.file_path)
            .field("allowed_keys", &self.inner.allowed_keys)
            .field("log_root", &self.inner.log_root)
            .finish_non_exhaustive()
    }
}

impl<V> ConfigFile<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Starts a definition for the JSON file at `file_path`.
    pub fn builder(file_path: impl Into<PathBuf>) -> ConfigFileBuilder<V> {
        ConfigFileBuilder::new(file_path)
    }

    pub(crate) fn from_parts(def: Definition<V>) -> Self {
        let log_root = match def.log_relative_path {
            Some(root) => paths::absolutize(&root, &def.cwd),
            None => def.cwd.clone(),
        };
        let display_path =
            paths::relative_to(&paths::absolutize(&def.file_path, &def.cwd), &log_root);

        Self {
            inner: Arc::new(Inner {
                file_path: def.file_path,
                allowed_keys: def.allowed_keys,
                predefined_values: def.predefined_values,
                generator: def.generator,
                transform: def.transform,
                file_init: def.file_init,
                log_root,
                logger: OperationLogger::new(def.log_callbacks, display_path),
                store: def.store,
            }),
        }
    }

    /// Path of the backing file, exactly as configured.
    pub fn file_path(&self) -> &Path {
        &self.inner.file_path
    }

    /// The allowed keys, when the file was defined with a closed key set.
    pub fn keys(&self) -> Option<&AllowedKeys> {
        self.inner.allowed_keys.as_ref()
    }

    /// Absolute root that log-event paths are relative to.
    pub fn log_relative_root(&self) -> &Path {
        &self.inner.log_root
    }

    /// Returns the stored value for `key`, creating it if absent.
    ///
    /// Creates the backing file when it does not exist.  An absent key is
    /// filled from the predefined values or the generator and merged into
    /// the file.  The transform (if any) is then applied and its output is
    /// persisted, even when the value came straight from storage.
    ///
    /// # Errors
    ///
    /// [`ConfigFileError::InvalidKey`], [`ConfigFileError::MalformedFile`],
    /// [`ConfigFileError::NoValue`], or any store, conversion, or hook
    /// failure.
    pub async fn get_with_update(
        &self,
        key: &str,
        logging_enabled: bool,
    ) -> Result<V, ConfigFileError> {
        self.check_key(key)?;
        let inner = &self.inner;

        if !inner.store.exists(&inner.file_path).await? {
            inner.logger.file_creation(logging_enabled)?;
            self.init_file().await?;
        }

        let document = self.current_document().await?;

        let value = match document.get(key) {
            Some(stored) => {
                let value: V =
                    serde_json::from_value(stored.clone()).map_err(ConfigFileError::value(key))?;
                inner.logger.property_access(logging_enabled, key, Some(&value))?;
                value
            }
            None => {
                let value = self.resolve_absent(key).await?;
                inner.logger.property_update(logging_enabled, key, &value)?;
                self.merge(key, &value).await?;
                value
            }
        };

        let value = self.apply_transform(key, value).await?;
        self.update_value(key, value).await
    }

    /// Reads the stored value for `key` without creating or writing
    /// anything.
    ///
    /// Returns `None` when the file or the property does not exist.  A
    /// property-access event is logged whenever the file exists, even if the
    /// property does not.
    pub async fn read_current_value(
        &self,
        key: &str,
        logging_enabled: bool,
    ) -> Result<Option<V>, ConfigFileError> {
        self.check_key(key)?;

        if !self.inner.store.exists(&self.inner.file_path).await? {
            trace!("{} does not exist; nothing to read", self.inner.file_path.display());
            return Ok(None);
        }

        let document = self.current_document().await?;
        let value = document
            .get(key)
            .map(|stored| serde_json::from_value::<V>(stored.clone()))
            .transpose()
            .map_err(ConfigFileError::value(key))?;

        self.inner
            .logger
            .property_access(logging_enabled, key, value.as_ref())?;
        Ok(value)
    }

    /// Stores `value` under `key` and returns it unchanged.
    ///
    /// Creates the file with just this property if it does not exist.  Not
    /// logged through the callback table.
    pub async fn update_value(&self, key: &str, value: V) -> Result<V, ConfigFileError> {
        self.check_key(key)?;
        self.merge(key, &value).await?;
        Ok(value)
    }

    /// Removes `key` from the file.
    ///
    /// Returns `true` when a stored property was removed.  A missing file or
    /// a missing property returns `false` and writes nothing.
    pub async fn delete_property(
        &self,
        key: &str,
        logging_enabled: bool,
    ) -> Result<bool, ConfigFileError> {
        self.check_key(key)?;
        let inner = &self.inner;

        if !inner.store.exists(&inner.file_path).await? {
            return Ok(false);
        }

        let mut document = self.current_document().await?;
        if !document.contains_key(key) {
            return Ok(false);
        }

        inner.logger.property_delete(logging_enabled, key)?;
        document.shift_remove(key);
        inner
            .store
            .write_json(&inner.file_path, &Value::Object(document))
            .await?;
        debug!("deleted '{key}' from {}", inner.file_path.display());
        Ok(true)
    }

    /// Returns the parsed file verbatim: no shape check, no logging.
    ///
    /// # Errors
    ///
    /// A missing file is reported as a store I/O error.
    pub async fn read_whole_file(&self) -> Result<Value, ConfigFileError> {
        Ok(self.inner.store.read_json(&self.inner.file_path).await?)
    }

    /// Runs file initialisation: the init hook (if any), then writes `{}`
    /// when the file still does not exist.
    ///
    /// Does not log a file-creation event; [`get_with_update`] does that
    /// before calling this.
    ///
    /// [`get_with_update`]: Self::get_with_update
    pub async fn init_file(&self) -> Result<(), ConfigFileError> {
        let inner = &self.inner;

        if let Some(init) = &inner.file_init {
            init(inner.file_path.clone())
                .await
                .map_err(ConfigFileError::hook("file init hook"))?;
        }

        if !inner.store.exists(&inner.file_path).await? {
            inner
                .store
                .write_json(&inner.file_path, &Value::Object(Map::new()))
                .await?;
            debug!("created {}", inner.file_path.display());
        }
        Ok(())
    }

    fn check_key(&self, key: &str) -> Result<(), ConfigFileError> {
        trace!("validating key '{key}'");
        match &self.inner.allowed_keys {
            Some(keys) => Ok(keys.check(key, &self.inner.file_path)?),
            None => Ok(()),
        }
    }

    async fn current_document(&self) -> Result<Map<String, Value>, ConfigFileError> {
        match self.inner.store.read_json(&self.inner.file_path).await? {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigFileError::MalformedFile {
                path: self.inner.file_path.clone(),
            }),
        }
    }

    async fn resolve_absent(&self, key: &str) -> Result<V, ConfigFileError> {
        if let Some(value) = self.inner.predefined_values.get(key) {
            debug!("'{key}' resolved from predefined values");
            return Ok(value.clone());
        }
        if let Some(generate) = &self.inner.generator {
            debug!("'{key}' resolved by generator");
            return generate()
                .await
                .map_err(ConfigFileError::hook("value generator"));
        }
        Err(ConfigFileError::NoValue {
            key: key.to_string(),
            path: self.inner.file_path.clone(),
        })
    }

    async fn apply_transform(&self, key: &str, value: V) -> Result<V, ConfigFileError> {
        match &self.inner.transform {
            Some(transform) => transform(key.to_string(), value)
                .await
                .map_err(ConfigFileError::hook("transform hook")),
            None => Ok(value),
        }
    }

    async fn merge(&self, key: &str, value: &V) -> Result<(), ConfigFileError> {
        let json = serde_json::to_value(value).map_err(ConfigFileError::value(key))?;
        let mut entries = Map::new();
        entries.insert(key.to_string(), json);
        self.inner
            .store
            .append_json(&self.inner.file_path, entries)
            .await?;
        trace!("merged '{key}' into {}", self.inner.file_path.display());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::logger::LogCallbacks;
    use crate::domain::events::{LogEvent, LogEventKind};
    use crate::infrastructure::store::{MockJsonStore, StoreError};
    use serde_json::json;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    // ── Helpers ───────────────────────────────────────────────────────────────

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!("config_file_accessor_{}", Uuid::new_v4())))
        }

        fn file(&self, name: &str) -> PathBuf {
            self.0.join(name)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.0).ok();
        }
    }

    fn read_disk(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("parse")
    }

    fn basic(path: PathBuf) -> ConfigFile<String> {
        ConfigFile::builder(path)
            .allowed_keys(["a", "b"])
            .generator(|| Ok("x".to_string()))
            .build()
            .expect("valid definition")
    }

    // ── Key validation ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_every_keyed_operation_rejects_unknown_key() {
        // Arrange
        let dir = TempDir::new();
        let cfg = basic(dir.file("cfg.json"));
        let expected = "Key \"z\" is not allowed for config file \"cfg.json\". \
                        Expected one of the following: a or b";

        // Act
        let errors = vec![
            cfg.get_with_update("z", false).await.unwrap_err(),
            cfg.read_current_value("z", false).await.unwrap_err(),
            cfg.update_value("z", "v".into()).await.unwrap_err(),
            cfg.delete_property("z", false).await.unwrap_err(),
        ];

        // Assert
        for err in errors {
            assert!(matches!(err, ConfigFileError::InvalidKey(_)));
            assert_eq!(err.to_string(), expected);
        }
        assert!(!dir.file("cfg.json").exists(), "validation precedes file access");
    }

    #[tokio::test]
    async fn test_open_schema_accepts_any_key() {
        let dir = TempDir::new();
        let cfg = ConfigFile::<String>::builder(dir.file("cfg.json"))
            .generator(|| Ok("g".into()))
            .build()
            .unwrap();

        assert_eq!(cfg.get_with_update("anything", false).await.unwrap(), "g");
    }

    // ── get_with_update ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_with_update_on_fresh_file_creates_and_persists() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("nested/cfg.json");
        let cfg = basic(path.clone());

        // Act
        let value = cfg.get_with_update("a", false).await.unwrap();

        // Assert
        assert_eq!(value, "x");
        assert_eq!(read_disk(&path), json!({"a": "x"}));
        assert_eq!(cfg.read_current_value("a", false).await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_get_with_update_returns_stored_value_without_generating() {
        // Arrange
        let dir = TempDir::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cfg = ConfigFile::<String>::builder(dir.file("cfg.json"))
            .generator(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("generated".into())
            })
            .build()
            .unwrap();
        cfg.update_value("k", "stored".into()).await.unwrap();

        // Act
        let value = cfg.get_with_update("k", false).await.unwrap();

        // Assert
        assert_eq!(value, "stored");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_predefined_value_takes_precedence_over_generator() {
        // Arrange
        let dir = TempDir::new();
        let cfg = ConfigFile::<String>::builder(dir.file("cfg.json"))
            .allowed_keys(["a", "b"])
            .predefined_value("a", "fixed".into())
            .generator(|| Ok("generated".into()))
            .build()
            .unwrap();

        // Act / Assert
        assert_eq!(cfg.get_with_update("a", false).await.unwrap(), "fixed");
        assert_eq!(cfg.get_with_update("b", false).await.unwrap(), "generated");
    }

    #[tokio::test]
    async fn test_predefined_only_without_entry_is_no_value_error() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = ConfigFile::<u32>::builder(path.clone())
            .predefined_values([("port", 8080u32)])
            .build()
            .unwrap();

        // Act
        let port = cfg.get_with_update("port", false).await.unwrap();
        let err = cfg.get_with_update("timeout", false).await.unwrap_err();

        // Assert
        assert_eq!(port, 8080);
        assert!(matches!(err, ConfigFileError::NoValue { ref key, .. } if key == "timeout"));
        assert_eq!(read_disk(&path), json!({"port": 8080}));
    }

    #[tokio::test]
    async fn test_transform_output_is_returned_and_persisted() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = ConfigFile::<String>::builder(path.clone())
            .generator(|| Ok("v".into()))
            .transform(|key, value| Ok(format!("{key}:{value}")))
            .build()
            .unwrap();

        // Act
        let value = cfg.get_with_update("k", false).await.unwrap();

        // Assert
        assert_eq!(value, "k:v");
        assert_eq!(read_disk(&path), json!({"k": "k:v"}));
    }

    #[tokio::test]
    async fn test_transform_is_applied_to_stored_values_on_every_call() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = ConfigFile::<u32>::builder(path.clone())
            .generator(|| Ok(1))
            .transform_async(|_key, value| async move { Ok::<_, anyhow::Error>(value * 2) })
            .build()
            .unwrap();

        // Act
        let first = cfg.get_with_update("n", false).await.unwrap();
        let second = cfg.get_with_update("n", false).await.unwrap();

        // Assert
        assert_eq!(first, 2);
        assert_eq!(second, 4);
        assert_eq!(read_disk(&path), json!({"n": 4}));
    }

    #[tokio::test]
    async fn test_async_generator_is_awaited() {
        let dir = TempDir::new();
        let cfg = ConfigFile::<String>::builder(dir.file("cfg.json"))
            .generator_async(|| async {
                tokio::task::yield_now().await;
                Ok::<_, anyhow::Error>("later".to_string())
            })
            .build()
            .unwrap();

        assert_eq!(cfg.get_with_update("k", false).await.unwrap(), "later");
    }

    #[tokio::test]
    async fn test_generator_error_surfaces_as_hook_error_and_nothing_is_stored() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = ConfigFile::<String>::builder(path.clone())
            .generator(|| Err(anyhow::anyhow!("entropy exhausted")))
            .build()
            .unwrap();

        // Act
        let err = cfg.get_with_update("k", false).await.unwrap_err();

        // Assert
        assert!(matches!(err, ConfigFileError::Hook { hook: "value generator", .. }));
        assert_eq!(read_disk(&path), json!({}));
    }

    #[tokio::test]
    async fn test_file_init_hook_content_is_kept() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = ConfigFile::<String>::builder(path.clone())
            .generator(|| Ok("g".into()))
            .file_init(|path| {
                std::fs::create_dir_all(path.parent().unwrap())?;
                std::fs::write(&path, r#"{"seeded": "yes"}"#)?;
                Ok(())
            })
            .build()
            .unwrap();

        // Act
        let seeded = cfg.get_with_update("seeded", false).await.unwrap();

        // Assert
        assert_eq!(seeded, "yes");
    }

    #[tokio::test]
    async fn test_file_init_hook_that_writes_nothing_falls_back_to_empty_object() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_hook = Arc::clone(&ran);
        let cfg = ConfigFile::<String>::builder(path.clone())
            .predefined_values(Vec::<(String, String)>::new())
            .file_init(move |_| {
                ran_in_hook.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build()
            .unwrap();

        // Act
        cfg.init_file().await.unwrap();

        // Assert
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(read_disk(&path), json!({}));
    }

    #[tokio::test]
    async fn test_async_file_init_hook_runs_before_empty_object_fallback() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = ConfigFile::<String>::builder(path.clone())
            .generator(|| Ok("g".into()))
            .file_init_async(|path: PathBuf| async move {
                tokio::task::yield_now().await;
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, r#"{"seeded": "async"}"#).await?;
                Ok::<_, anyhow::Error>(())
            })
            .build()
            .unwrap();

        // Act
        let seeded = cfg.get_with_update("seeded", false).await.unwrap();

        // Assert
        assert_eq!(seeded, "async");
        assert_eq!(read_disk(&path), json!({"seeded": "async"}));
    }

    #[tokio::test]
    async fn test_non_object_document_is_malformed() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        std::fs::create_dir_all(&dir.0).unwrap();
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let cfg = basic(path);

        // Act
        let get_err = cfg.get_with_update("a", false).await.unwrap_err();
        let read_err = cfg.read_current_value("a", false).await.unwrap_err();
        let update_err = cfg.update_value("a", "v".into()).await.unwrap_err();

        // Assert
        assert!(matches!(get_err, ConfigFileError::MalformedFile { .. }));
        assert!(matches!(read_err, ConfigFileError::MalformedFile { .. }));
        assert!(matches!(update_err, ConfigFileError::MalformedFile { .. }));
    }

    #[tokio::test]
    async fn test_stored_value_of_wrong_type_is_value_error() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        std::fs::create_dir_all(&dir.0).unwrap();
        std::fs::write(&path, r#"{"n": "not a number"}"#).unwrap();
        let cfg = ConfigFile::<u32>::builder(path)
            .generator(|| Ok(0))
            .build()
            .unwrap();

        // Act
        let err = cfg.read_current_value("n", false).await.unwrap_err();

        // Assert
        assert!(matches!(err, ConfigFileError::Value { ref key, .. } if key == "n"));
    }

    // ── read / update / delete ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_read_current_value_on_missing_file_does_not_create_it() {
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = basic(path.clone());

        assert_eq!(cfg.read_current_value("a", false).await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_update_then_read_round_trips() {
        let dir = TempDir::new();
        let cfg = basic(dir.file("cfg.json"));

        let returned = cfg.update_value("b", "hello".into()).await.unwrap();

        assert_eq!(returned, "hello");
        assert_eq!(
            cfg.read_current_value("b", false).await.unwrap().as_deref(),
            Some("hello")
        );
    }

    #[tokio::test]
    async fn test_update_leaves_unknown_keys_on_disk_alone() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        std::fs::create_dir_all(&dir.0).unwrap();
        std::fs::write(&path, r#"{"legacy": 1}"#).unwrap();
        let cfg = basic(path.clone());

        // Act
        cfg.update_value("a", "new".into()).await.unwrap();

        // Assert
        assert_eq!(read_disk(&path), json!({"legacy": 1, "a": "new"}));
    }

    #[tokio::test]
    async fn test_merge_and_delete_keep_property_order_on_disk() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        std::fs::create_dir_all(&dir.0).unwrap();
        std::fs::write(&path, r#"{"zeta": 1, "alpha": 2}"#).unwrap();
        let cfg = ConfigFile::<u32>::builder(path.clone())
            .generator(|| Ok(0))
            .build()
            .unwrap();

        // Act
        cfg.update_value("mid", 3).await.unwrap();
        let after_merge = std::fs::read_to_string(&path).unwrap();
        cfg.delete_property("alpha", false).await.unwrap();
        let after_delete = std::fs::read_to_string(&path).unwrap();

        // Assert
        assert_eq!(
            after_merge,
            "{\n    \"zeta\": 1,\n    \"alpha\": 2,\n    \"mid\": 3\n}\n"
        );
        assert_eq!(after_delete, "{\n    \"zeta\": 1,\n    \"mid\": 3\n}\n");
    }

    #[tokio::test]
    async fn test_delete_on_missing_file_returns_false_without_creating_it() {
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = basic(path.clone());

        assert!(!cfg.delete_property("a", false).await.unwrap());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_delete_existing_property_then_again() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = basic(path.clone());
        cfg.update_value("a", "1".into()).await.unwrap();
        cfg.update_value("b", "2".into()).await.unwrap();

        // Act
        let first = cfg.delete_property("a", false).await.unwrap();
        let second = cfg.delete_property("a", false).await.unwrap();

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(cfg.read_current_value("a", false).await.unwrap(), None);
        assert_eq!(read_disk(&path), json!({"b": "2"}));
    }

    #[tokio::test]
    async fn test_read_whole_file_returns_document_verbatim() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        std::fs::create_dir_all(&dir.0).unwrap();
        std::fs::write(&path, r#"{"a": "1", "other": [true]}"#).unwrap();
        let cfg = basic(path);

        // Act
        let whole = cfg.read_whole_file().await.unwrap();

        // Assert
        assert_eq!(whole, json!({"a": "1", "other": [true]}));
    }

    #[tokio::test]
    async fn test_read_whole_file_on_missing_file_is_store_error() {
        let dir = TempDir::new();
        let cfg = basic(dir.file("cfg.json"));
        let err = cfg.read_whole_file().await.unwrap_err();
        assert!(matches!(err, ConfigFileError::Store(StoreError::Io { .. })));
    }

    // ── Logging ───────────────────────────────────────────────────────────────

    fn logged_config(
        dir: &TempDir,
    ) -> (ConfigFile<String>, Arc<Mutex<Vec<LogEvent<String>>>>) {
        let seen: Arc<Mutex<Vec<LogEvent<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let mut builder = ConfigFile::<String>::builder(dir.file("files/cfg.json"))
            .allowed_keys(["a", "b"])
            .generator(|| Ok("x".into()))
            .log_relative_path(&dir.0);
        for kind in LogEventKind::ALL {
            let seen = Arc::clone(&seen);
            builder = builder.on_log(kind, move |event| {
                seen.lock().unwrap().push(event.clone());
                Ok(())
            });
        }
        (builder.build().unwrap(), seen)
    }

    #[tokio::test]
    async fn test_logging_disabled_fires_no_callbacks() {
        // Arrange
        let dir = TempDir::new();
        let (cfg, seen) = logged_config(&dir);

        // Act
        cfg.get_with_update("a", false).await.unwrap();
        cfg.read_current_value("a", false).await.unwrap();
        cfg.delete_property("a", false).await.unwrap();

        // Assert
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logging_enabled_reports_each_operation_with_relative_path() {
        // Arrange
        let dir = TempDir::new();
        let (cfg, seen) = logged_config(&dir);
        let rel = PathBuf::from("files").join("cfg.json");

        // Act
        cfg.get_with_update("a", true).await.unwrap();
        cfg.get_with_update("a", true).await.unwrap();
        cfg.read_current_value("b", true).await.unwrap();
        cfg.delete_property("a", true).await.unwrap();

        // Assert
        let seen = seen.lock().unwrap();
        let kinds: Vec<_> = seen.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                LogEventKind::FileCreation,
                LogEventKind::PropertyUpdate,
                LogEventKind::PropertyAccess,
                LogEventKind::PropertyAccess,
                LogEventKind::PropertyDelete,
            ]
        );
        assert!(seen.iter().all(|e| e.file_path == rel));
        assert_eq!(seen[0].key, None);
        assert_eq!(seen[1].value.as_deref(), Some("x"));
        assert_eq!(seen[3].key.as_deref(), Some("b"));
        assert_eq!(seen[3].value, None);
        assert_eq!(seen[4].value, None);
    }

    #[tokio::test]
    async fn test_prebuilt_callback_table_is_used() {
        // Arrange
        let dir = TempDir::new();
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let mut callbacks = LogCallbacks::<String>::new();
        callbacks.set(LogEventKind::FileCreation, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let cfg = ConfigFile::<String>::builder(dir.file("cfg.json"))
            .generator(|| Ok("x".into()))
            .log_callbacks(callbacks)
            .build()
            .unwrap();

        // Act
        cfg.get_with_update("k", true).await.unwrap();
        cfg.get_with_update("k", true).await.unwrap();

        // Assert
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_log_callback_error_aborts_the_operation() {
        // Arrange
        let dir = TempDir::new();
        let path = dir.file("cfg.json");
        let cfg = ConfigFile::<String>::builder(path.clone())
            .generator(|| Ok("x".into()))
            .on_log(LogEventKind::PropertyUpdate, |_| Err(anyhow::anyhow!("refused")))
            .build()
            .unwrap();

        // Act
        let err = cfg.get_with_update("k", true).await.unwrap_err();

        // Assert: the update event fires before the merge, so nothing was stored.
        assert!(matches!(err, ConfigFileError::Hook { hook: "log callback", .. }));
        assert_eq!(read_disk(&path), json!({}));
    }

    // ── Store failures ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_store_io_failure_propagates_unchanged() {
        // Arrange
        let mut store = MockJsonStore::new();
        store.expect_exists().returning(|_| Ok(true));
        store.expect_read_json().returning(|path| {
            Err(StoreError::Io {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
        });
        store.expect_write_json().never();
        store.expect_append_json().never();
        let cfg = ConfigFile::<String>::builder("locked.json")
            .generator(|| Ok("x".into()))
            .store(Arc::new(store))
            .build()
            .unwrap();

        // Act
        let err = cfg.get_with_update("k", false).await.unwrap_err();

        // Assert
        match err {
            ConfigFileError::Store(StoreError::Io { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected store I/O error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_existence_check_failure_is_reported_not_treated_as_missing() {
        // Arrange
        let dir = TempDir::new();
        std::fs::create_dir_all(&dir.0).unwrap();
        let blocker = dir.file("blocker");
        std::fs::write(&blocker, "plain file").unwrap();
        let cfg = basic(blocker.join("cfg.json"));

        // Act
        let read_err = cfg.read_current_value("a", false).await.unwrap_err();
        let delete_err = cfg.delete_property("a", false).await.unwrap_err();
        let get_err = cfg.get_with_update("a", false).await.unwrap_err();

        // Assert
        for err in [read_err, delete_err, get_err] {
            assert!(matches!(err, ConfigFileError::Store(StoreError::Io { .. })));
        }
    }

    #[test]
    fn test_clones_share_definition() {
        let cfg = basic(PathBuf::from("shared.json"));
        let clone = cfg.clone();
        assert_eq!(cfg.file_path(), clone.file_path());
        assert!(Arc::ptr_eq(&cfg.inner, &clone.inner));
    }

    #[test]
    fn test_operations_can_be_driven_with_block_on() {
        let dir = TempDir::new();
        let cfg = basic(dir.file("cfg.json"));
        let value = tokio_test::block_on(cfg.update_value("a", "sync".into())).unwrap();
        assert_eq!(value, "sync");
    }
}
