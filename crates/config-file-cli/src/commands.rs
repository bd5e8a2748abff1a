//! Subcommands of the `config-file` binary.
//!
//! Each subcommand maps onto one accessor operation.  [`run`] returns the
//! text to print (or `None` for no output) so the commands can be tested
//! without capturing stdout.

use clap::Subcommand;
use config_file_core::{ConfigFile, ConfigFileBuilder, LogEventKind};
use serde_json::Value;
use tracing::info;

/// Operations on the target JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the value for KEY, creating the file and the value if absent.
    Get { key: String },
    /// Print the stored value for KEY without writing anything.
    Read { key: String },
    /// Store VALUE under KEY.  VALUE is parsed as JSON, falling back to a
    /// plain string.
    Set { key: String, value: String },
    /// Remove KEY; prints whether anything was removed.
    Delete { key: String },
    /// Print the whole document.
    Dump,
    /// List the allowed keys.
    Keys,
    /// Create the file (as `{}`) if it does not exist.
    Init,
}

/// Forwards every accessor log event to `tracing` at `info` level.
pub fn with_tracing_callbacks(mut builder: ConfigFileBuilder<Value>) -> ConfigFileBuilder<Value> {
    for kind in LogEventKind::ALL {
        builder = builder.on_log(kind, move |event| {
            match (&event.key, &event.value) {
                (Some(key), Some(value)) => {
                    info!("{kind}: {} [{key}] = {value}", event.file_path.display())
                }
                (Some(key), None) => info!("{kind}: {} [{key}]", event.file_path.display()),
                (None, _) => info!("{kind}: {}", event.file_path.display()),
            }
            Ok(())
        });
    }
    builder
}

/// Parses a command-line value: JSON when it parses, else a string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Runs `command` against `file`.
///
/// # Errors
///
/// Any accessor error, or `keys` on an open-schema file.
pub async fn run(
    file: &ConfigFile<Value>,
    command: Command,
    log: bool,
) -> anyhow::Result<Option<String>> {
    let output = match command {
        Command::Get { key } => Some(file.get_with_update(&key, log).await?.to_string()),
        Command::Read { key } => file
            .read_current_value(&key, log)
            .await?
            .map(|value| value.to_string()),
        Command::Set { key, value } => {
            Some(file.update_value(&key, parse_value(&value)).await?.to_string())
        }
        Command::Delete { key } => Some(file.delete_property(&key, log).await?.to_string()),
        Command::Dump => Some(serde_json::to_string_pretty(&file.read_whole_file().await?)?),
        Command::Keys => match file.keys() {
            Some(keys) => Some(keys.as_slice().join("\n")),
            None => anyhow::bail!(
                "{} accepts any key; no allowed keys are defined",
                file.file_path().display()
            ),
        },
        Command::Init => {
            file.init_file().await?;
            None
        }
    };
    Ok(output)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
