//! # CLI Behavior
//!
//! This is **one client** for jotz, not the application itself. The CLI is the
//! only place that knows about stdin/stdout, exit codes, and the location of the
//! data directory.
//!
//! ## Data Directory
//!
//! Resolved in order:
//!
//! 1. `--data-dir <DIR>` or `JOTZ_DATA`
//! 2. The platform data directory (`~/.local/share/jotz` on Linux)
//!
//! The directory holds `jotz.redb` and, optionally, `jotz.toml`.
//!
//! ## Content Input
//!
//! `new`, `edit` and `import` read from a file argument when given, otherwise
//! from stdin. `edit` takes the full new content; the patch against the stored
//! content is computed here, so the engine only ever sees patches.
//!
//! ## Output
//!
//! Every command prints a JSON document on stdout (`show --raw` prints the bare
//! content). Errors go to stderr and exit with status 1.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap
//! - `handlers`: one engine call per command, JSON rendering

mod handlers;
pub mod setup;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use jotzapp::Engine;
use setup::Cli;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "JOTZ_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let dir = data_dir(cli.data_dir)?;
    let engine = Engine::open_dir(&dir)
        .with_context(|| format!("opening store in {}", dir.display()))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    handlers::dispatch(&engine, cli.command, &mut stdin.lock(), &mut stdout.lock())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "jotzapp=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

fn data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    ProjectDirs::from("com", "jotz", "jotz")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("no home directory found; pass --data-dir or set JOTZ_DATA"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_data_dir_wins() {
        let dir = data_dir(Some(PathBuf::from("/srv/notes"))).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/notes"));
    }
}
