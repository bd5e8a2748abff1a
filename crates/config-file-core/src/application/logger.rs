//! Operation logger: per-event-kind callback table.
//!
//! Callbacks are looked up by [`LogEventKind`] and fire only when the
//! triggering call passed `logging_enabled = true`.  A callback error is not
//! swallowed; it becomes the result of the operation that triggered it.
//!
//! Independently of the table, every dispatch attempt is reported through
//! `tracing` at `debug` level.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::application::error::ConfigFileError;
use crate::domain::events::{LogEvent, LogEventKind};

/// A caller-supplied log callback.
pub type LogCallback<V> = Arc<dyn Fn(&LogEvent<V>) -> anyhow::Result<()> + Send + Sync>;

/// Mapping from event kind to an optional callback.
pub struct LogCallbacks<V> {
    callbacks: HashMap<LogEventKind, LogCallback<V>>,
}

impl<V> LogCallbacks<V> {
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// Registers `callback` for `kind`, replacing any previous one.
    pub fn set<F>(&mut self, kind: LogEventKind, callback: F)
    where
        F: Fn(&LogEvent<V>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.insert(kind, Arc::new(callback));
    }

    pub fn get(&self, kind: LogEventKind) -> Option<&LogCallback<V>> {
        self.callbacks.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<V> Default for LogCallbacks<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for LogCallbacks<V> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<V> fmt::Debug for LogCallbacks<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.callbacks.keys().copied().collect();
        kinds.sort();
        f.debug_struct("LogCallbacks").field("kinds", &kinds).finish()
    }
}

/// Dispatches accessor events to the callback table.
///
/// `display_path` is computed once at construction: the file path relative
/// to the log root.
pub(crate) struct OperationLogger<V> {
    callbacks: LogCallbacks<V>,
    display_path: PathBuf,
}

impl<V: Clone> OperationLogger<V> {
    pub(crate) fn new(callbacks: LogCallbacks<V>, display_path: PathBuf) -> Self {
        Self {
            callbacks,
            display_path,
        }
    }

    pub(crate) fn file_creation(&self, logging_enabled: bool) -> Result<(), ConfigFileError> {
        self.dispatch(logging_enabled, LogEventKind::FileCreation, |path| {
            LogEvent::file_creation(path)
        })
    }

    pub(crate) fn property_access(
        &self,
        logging_enabled: bool,
        key: &str,
        value: Option<&V>,
    ) -> Result<(), ConfigFileError> {
        self.dispatch(logging_enabled, LogEventKind::PropertyAccess, |path| {
            LogEvent::property_access(path, key, value.cloned())
        })
    }

    pub(crate) fn property_update(
        &self,
        logging_enabled: bool,
        key: &str,
        value: &V,
    ) -> Result<(), ConfigFileError> {
        self.dispatch(logging_enabled, LogEventKind::PropertyUpdate, |path| {
            LogEvent::property_update(path, key, value.clone())
        })
    }

    pub(crate) fn property_delete(
        &self,
        logging_enabled: bool,
        key: &str,
    ) -> Result<(), ConfigFileError> {
        self.dispatch(logging_enabled, LogEventKind::PropertyDelete, |path| {
            LogEvent::property_delete(path, key)
        })
    }

    fn dispatch(
        &self,
        logging_enabled: bool,
        kind: LogEventKind,
        make_event: impl FnOnce(PathBuf) -> LogEvent<V>,
    ) -> Result<(), ConfigFileError> {
        debug!("{kind} on {}", self.display_path.display());
        if !logging_enabled {
            return Ok(());
        }
        let Some(callback) = self.callbacks.get(kind) else {
            return Ok(());
        };
        let event = make_event(self.display_path.clone());
        callback(&event).map_err(ConfigFileError::hook("log callback"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
