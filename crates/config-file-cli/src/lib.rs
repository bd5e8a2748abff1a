//! config-file-cli library crate.
//!
//! Holds everything the `config-file` binary needs apart from argument
//! parsing and subscriber setup, so it can be tested without spawning a
//! process.
//!
//! ```text
//! config-file [--definition def.toml] [--file cfg.json] [--log] <COMMAND>
//!   definition/  TOML definition → ConfigFileBuilder
//!   commands/    subcommand → accessor operation
//! ```

/// TOML definition files and their loading.
pub mod definition;

/// Subcommands and their execution.
pub mod commands;
