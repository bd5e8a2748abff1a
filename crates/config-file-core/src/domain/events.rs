//! Log event records handed to caller-registered callbacks.

use std::fmt;
use std::path::PathBuf;

/// The operation a [`LogEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogEventKind {
    /// The backing file did not exist and is about to be initialised.
    FileCreation,
    /// A stored value was read.
    PropertyAccess,
    /// A value was resolved for an absent key and is about to be stored.
    PropertyUpdate,
    /// A stored property is about to be removed.
    PropertyDelete,
}

impl LogEventKind {
    pub const ALL: [LogEventKind; 4] = [
        LogEventKind::FileCreation,
        LogEventKind::PropertyAccess,
        LogEventKind::PropertyUpdate,
        LogEventKind::PropertyDelete,
    ];

    /// Stable name used in log lines and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogEventKind::FileCreation => "file_creation",
            LogEventKind::PropertyAccess => "property_access",
            LogEventKind::PropertyUpdate => "property_update",
            LogEventKind::PropertyDelete => "property_delete",
        }
    }
}

impl fmt::Display for LogEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accessor operation, as seen by a log callback.
///
/// `file_path` is relative to the accessor's log root, not absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent<V> {
    pub kind: LogEventKind,
    pub file_path: PathBuf,
    /// `None` for [`LogEventKind::FileCreation`].
    pub key: Option<String>,
    /// `None` for creation and delete events, and for an access that found
    /// nothing stored.
    pub value: Option<V>,
}

impl<V> LogEvent<V> {
    pub fn file_creation(file_path: PathBuf) -> Self {
        Self {
            kind: LogEventKind::FileCreation,
            file_path,
            key: None,
            value: None,
        }
    }

    pub fn property_access(file_path: PathBuf, key: &str, value: Option<V>) -> Self {
        Self {
            kind: LogEventKind::PropertyAccess,
            file_path,
            key: Some(key.to_string()),
            value,
        }
    }

    pub fn property_update(file_path: PathBuf, key: &str, value: V) -> Self {
        Self {
            kind: LogEventKind::PropertyUpdate,
            file_path,
            key: Some(key.to_string()),
            value: Some(value),
        }
    }

    pub fn property_delete(file_path: PathBuf, key: &str) -> Self {
        Self {
            kind: LogEventKind::PropertyDelete,
            file_path,
            key: Some(key.to_string()),
            value: None,
        }
    }
}
