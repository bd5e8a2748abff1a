//! Config file definition builder.
//!
//! One builder covers every definition variant: a closed key set or open
//! string keys, a generator, predefined values, or both.  [`build`] rejects a
//! definition that has no way to produce a value for an absent key.
//!
//! Hooks come in sync and async flavours.  Both are stored as boxed-future
//! factories, so the accessor awaits them uniformly.
//!
//! [`build`]: ConfigFileBuilder::build

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::application::accessor::ConfigFile;
use crate::application::error::ConfigFileError;
use crate::application::logger::LogCallbacks;
use crate::domain::events::{LogEvent, LogEventKind};
use crate::domain::keys::AllowedKeys;
use crate::infrastructure::store::{FsJsonStore, JsonStore};

pub(crate) type GenerateFn<V> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<V>> + Send + Sync>;
pub(crate) type TransformFn<V> =
    Arc<dyn Fn(String, V) -> BoxFuture<'static, anyhow::Result<V>> + Send + Sync>;
pub(crate) type FileInitFn =
    Arc<dyn Fn(PathBuf) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Builder for a [`ConfigFile`].
///
/// ```rust
/// use config_file_core::{ConfigFile, ConfigFileError};
///
/// // No generator and no predefined values: nothing could fill an absent key.
/// let result = ConfigFile::<u32>::builder("cfg.json").build();
/// assert!(matches!(result, Err(ConfigFileError::MissingValueSource)));
/// ```
pub struct ConfigFileBuilder<V> {
    file_path: PathBuf,
    allowed_keys: Option<AllowedKeys>,
    predefined_values: Option<HashMap<String, V>>,
    generator: Option<GenerateFn<V>>,
    transform: Option<TransformFn<V>>,
    file_init: Option<FileInitFn>,
    log_relative_path: Option<PathBuf>,
    log_callbacks: LogCallbacks<V>,
    store: Arc<dyn JsonStore>,
}

impl<V> ConfigFileBuilder<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Starts a definition for the JSON file at `file_path`.
    ///
    /// The path is not required to end in `.json`; the content is JSON
    /// regardless of extension.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            allowed_keys: None,
            predefined_values: None,
            generator: None,
            transform: None,
            file_init: None,
            log_relative_path: None,
            log_callbacks: LogCallbacks::new(),
            store: Arc::new(FsJsonStore::new()),
        }
    }

    /// Restricts every keyed operation to these keys.
    pub fn allowed_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_keys = Some(AllowedKeys::new(keys));
        self
    }

    /// Sets the fixed fallback value for one key.
    pub fn predefined_value(mut self, key: impl Into<String>, value: V) -> Self {
        self.predefined_values
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    /// Sets the fixed fallback values.  An empty map still counts as a value
    /// source.
    pub fn predefined_values<I, K>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let map = self.predefined_values.get_or_insert_with(HashMap::new);
        map.extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Synchronous default-value generator.
    pub fn generator<F>(mut self, generate: F) -> Self
    where
        F: Fn() -> anyhow::Result<V> + Send + Sync + 'static,
    {
        self.generator = Some(Arc::new(move || future::ready(generate()).boxed()));
        self
    }

    /// Asynchronous default-value generator.
    pub fn generator_async<F, Fut>(mut self, generate: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        self.generator = Some(Arc::new(move || generate().boxed()));
        self
    }

    /// Synchronous transform applied on every `get_with_update`.
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str, V) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(move |key: String, value: V| {
            future::ready(transform(&key, value)).boxed()
        }));
        self
    }

    /// Asynchronous transform applied on every `get_with_update`.
    pub fn transform_async<F, Fut>(mut self, transform: F) -> Self
    where
        F: Fn(String, V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        self.transform = Some(Arc::new(move |key: String, value: V| {
            transform(key, value).boxed()
        }));
        self
    }

    /// Synchronous hook run when the backing file is initialised.
    ///
    /// If the file still does not exist afterwards, `{}` is written.
    pub fn file_init<F>(mut self, init: F) -> Self
    where
        F: Fn(PathBuf) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.file_init = Some(Arc::new(move |path: PathBuf| {
            future::ready(init(path)).boxed()
        }));
        self
    }

    /// Asynchronous hook run when the backing file is initialised.
    pub fn file_init_async<F, Fut>(mut self, init: F) -> Self
    where
        F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.file_init = Some(Arc::new(move |path: PathBuf| init(path).boxed()));
        self
    }

    /// Root that log-event paths are made relative to.  Defaults to the
    /// working directory at [`build`](Self::build) time.
    pub fn log_relative_path(mut self, root: impl Into<PathBuf>) -> Self {
        self.log_relative_path = Some(root.into());
        self
    }

    /// Registers a log callback for one event kind.
    pub fn on_log<F>(mut self, kind: LogEventKind, callback: F) -> Self
    where
        F: Fn(&LogEvent<V>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.log_callbacks.set(kind, callback);
        self
    }

    /// Replaces the whole callback table.
    pub fn log_callbacks(mut self, callbacks: LogCallbacks<V>) -> Self {
        self.log_callbacks = callbacks;
        self
    }

    /// Swaps the persistence adapter (defaults to [`FsJsonStore`]).
    pub fn store(mut self, store: Arc<dyn JsonStore>) -> Self {
        self.store = store;
        self
    }

    /// Finishes the definition.
    ///
    /// # Errors
    ///
    /// - [`ConfigFileError::MissingValueSource`] when neither a generator nor
    ///   predefined values were supplied.
    /// - [`ConfigFileError::WorkingDirectory`] when the working directory is
    ///   needed for the log root and cannot be read.
    pub fn build(self) -> Result<ConfigFile<V>, ConfigFileError> {
        if self.generator.is_none() && self.predefined_values.is_none() {
            return Err(ConfigFileError::MissingValueSource);
        }

        let cwd = std::env::current_dir().map_err(ConfigFileError::WorkingDirectory)?;

        Ok(ConfigFile::from_parts(Definition {
            file_path: self.file_path,
            allowed_keys: self.allowed_keys,
            predefined_values: self.predefined_values.unwrap_or_default(),
            generator: self.generator,
            transform: self.transform,
            file_init: self.file_init,
            log_relative_path: self.log_relative_path,
            log_callbacks: self.log_callbacks,
            store: self.store,
            cwd,
        }))
    }
}

/// Validated builder output consumed by [`ConfigFile::from_parts`].
pub(crate) struct Definition<V> {
    pub(crate) file_path: PathBuf,
    pub(crate) allowed_keys: Option<AllowedKeys>,
    pub(crate) predefined_values: HashMap<String, V>,
    pub(crate) generator: Option<GenerateFn<V>>,
    pub(crate) transform: Option<TransformFn<V>>,
    pub(crate) file_init: Option<FileInitFn>,
    pub(crate) log_relative_path: Option<PathBuf>,
    pub(crate) log_callbacks: LogCallbacks<V>,
    pub(crate) store: Arc<dyn JsonStore>,
    pub(crate) cwd: PathBuf,
}
