//! Domain types for the config file accessor.
//!
//! Nothing in this layer performs I/O.  The types here describe which keys a
//! file accepts, what a log event looks like, and how a file path is rendered
//! relative to a root directory.  They can be tested without touching disk.

pub mod events;
pub mod keys;
pub mod paths;

pub use events::{LogEvent, LogEventKind};
pub use keys::{AllowedKeys, InvalidKey};
