//! `config-file`: inspect and edit a JSON config file from the shell.
//!
//! # Usage
//!
//! ```text
//! config-file [OPTIONS] <COMMAND>
//!
//! Commands:
//!   get <KEY>           Value for KEY, created if absent
//!   read <KEY>          Stored value for KEY, nothing written
//!   set <KEY> <VALUE>   Store VALUE (JSON or plain string)
//!   delete <KEY>        Remove KEY
//!   dump                Whole document
//!   keys                Allowed keys
//!   init                Create the file if missing
//!
//! Options:
//!   --definition <PATH>  TOML definition of the config file
//!   --file <PATH>        JSON file to operate on (overrides the definition)
//!   --log                Report accessor events through the log output
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                 | Description                     |
//! |--------------------------|---------------------------------|
//! | `CONFIG_FILE_DEFINITION` | Default for `--definition`      |
//! | `CONFIG_FILE_PATH`       | Default for `--file`            |
//! | `RUST_LOG`               | Log filter (default `info`)     |

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config_file_cli::commands::{self, Command};
use config_file_cli::definition::resolve_definition;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Typed access to a JSON config file.
#[derive(Debug, Parser)]
#[command(name = "config-file", version)]
struct Cli {
    /// TOML file describing allowed keys, predefined values, and the
    /// default-value generator.
    #[arg(long, env = "CONFIG_FILE_DEFINITION")]
    definition: Option<PathBuf>,

    /// JSON file to operate on.  Replaces `file_path` from the definition;
    /// without a definition, any key is accepted and nothing is generated.
    #[arg(long, env = "CONFIG_FILE_PATH")]
    file: Option<PathBuf>,

    /// Fire the accessor's log callbacks, which print through `tracing`.
    #[arg(long)]
    log: bool,

    #[command(subcommand)]
    command: Command,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Level is overridden by `RUST_LOG`.  Logs go to stderr so stdout stays
    // clean for values.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!("parsed arguments: {cli:?}");

    let definition = resolve_definition(cli.definition.as_deref(), cli.file)
        .context("could not load the config file definition")?;

    let file = commands::with_tracing_callbacks(definition.builder())
        .build()
        .with_context(|| {
            format!(
                "invalid definition for {}",
                definition.file_path.display()
            )
        })?;

    if let Some(output) = commands::run(&file, cli.command, cli.log).await? {
        println!("{output}");
    }
    Ok(())
}
