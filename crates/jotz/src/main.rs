//! # Jotz CLI
//!
//! The binary is thin: the CLI lives in `src/cli/`, and this file only invokes
//! `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/jotzapp/`: the note store library (engine, commands, redb storage)
//! - `crates/jotz/`: this CLI, depending on `jotzapp`
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/jotz/src/cli/)                           │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - stdin/file input, JSON output (handlers.rs)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (crates/jotzapp/src/engine.rs)                      │
//! │  - Write Serializer, one transaction per mutation           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (crates/jotzapp/src/commands/*)              │
//! │  - Business rules over the open transaction                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing Approach
//!
//! - `crates/jotzapp`: unit tests per command module plus integration tests
//!   for the engine-wide properties.
//! - `src/cli/`: handler tests run clap argument vectors against an in-memory
//!   engine with buffered stdin/stdout.
//! - `tests/`: end-to-end runs of the built binary against a temp data dir.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
