//! # config-file-core
//!
//! Typed accessor over a single JSON file used as a persistent key/value
//! store.  A [`ConfigFile`] owns one path on disk and offers create-if-missing
//! reads, optional key allow-listing, default-value generation, value
//! transformation, and per-operation log callbacks.
//!
//! # Architecture overview
//!
//! - **`domain`** – Pure types with no I/O: the allowed-key set and its
//!   validation message, log event records, and path formatting for log
//!   events.
//!
//! - **`application`** – The accessor itself.  [`ConfigFileBuilder`] captures
//!   the definition; [`ConfigFile`] runs the read-modify-write protocol and
//!   dispatches log callbacks through the [`application::logger`] table.
//!
//! - **`infrastructure`** – The [`JsonStore`] persistence seam and its
//!   `tokio::fs` implementation, [`FsJsonStore`].
//!
//! # Example
//!
//! ```rust,no_run
//! use config_file_core::ConfigFile;
//!
//! # async fn run() -> Result<(), config_file_core::ConfigFileError> {
//! let settings = ConfigFile::<String>::builder("./settings.json")
//!     .allowed_keys(["theme", "locale"])
//!     .generator(|| Ok("unset".to_string()))
//!     .build()?;
//!
//! let theme = settings.get_with_update("theme", false).await?;
//! settings.update_value("locale", "en-GB".to_string()).await?;
//! # let _ = theme;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::accessor::ConfigFile;
pub use application::builder::ConfigFileBuilder;
pub use application::error::ConfigFileError;
pub use application::logger::{LogCallback, LogCallbacks};
pub use domain::events::{LogEvent, LogEventKind};
pub use domain::keys::{join_with_final_conjunction, AllowedKeys, InvalidKey};
pub use infrastructure::store::{FsJsonStore, JsonStore, StoreError};
