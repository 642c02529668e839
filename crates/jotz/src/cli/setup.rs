use clap::{Args, Parser, Subcommand};
use jotzapp::NoteType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jotz",
    bin_name = "jotz",
    version,
    disable_help_subcommand = true,
    about = "Versioned note store with tag search",
    long_about = None,
    after_help = "Every command prints JSON on stdout.\nLogs go to stderr; set JOTZ_LOG (e.g. JOTZ_LOG=jotzapp=debug) to tune them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding jotz.redb and jotz.toml
    #[arg(long, global = true, env = "JOTZ_DATA", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a note from a file or stdin
    New {
        /// Tags, e.g. "work,ideas" or "#work #ideas"
        #[arg(short, long, required = true, num_args = 1..)]
        tags: Vec<String>,

        #[arg(long)]
        title: Option<String>,

        /// plaintext or markdown
        #[arg(long = "type", default_value = "plaintext")]
        note_type: NoteType,

        /// Read content from this file instead of stdin
        file: Option<PathBuf>,
    },

    /// Replace a note's content; the change is stored as a patch
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        file: Option<PathBuf>,
    },

    /// Show a note and its current content
    Show {
        id: String,

        /// Print only the content, not JSON
        #[arg(long)]
        raw: bool,
    },

    /// List notes, newest first
    List(ListArgs),

    /// Change a note's type
    Retype { id: String, note_type: NoteType },

    /// Replace a note's tags
    Retag {
        id: String,
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Move notes to the trash
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Bring notes back from the trash
    Restore {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Permanently remove notes and all their history
    Purge {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// List a note's history, oldest first
    History {
        id: String,

        /// Include full contents instead of a summary
        #[arg(long)]
        full: bool,
    },

    /// Delete a note's unprotected history, or one entry with --entry
    ForgetHistory {
        id: String,

        /// Treat ID as a single history entry
        #[arg(long)]
        entry: bool,
    },

    /// Protect a history entry from deletion
    ProtectHistory {
        id: String,

        /// Remove the protection instead
        #[arg(long)]
        off: bool,
    },

    /// List all tags
    Tags {
        /// Order by most recent use instead of by name
        #[arg(long, conflicts_with = "prefix")]
        by_date: bool,

        /// Only tags starting with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Notes carrying a tag
    Tagged {
        tag: String,

        /// Match every tag that starts with TAG
        #[arg(long)]
        prefix: bool,
    },

    /// Rename a tag on every note and tag group
    RenameTag { old: String, new: String },

    /// Remove a tag from every note
    DeleteTag { name: String },

    /// Search notes by title or by a set of tags
    Search(SearchArgs),

    /// Manage saved tag groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Store size, capacity and record counts
    Status,

    /// Recompute note sizes and repair the total
    Doctor,

    /// Write every note as a JSON array
    Export {
        /// Output file (stdout when omitted)
        file: Option<PathBuf>,
    },

    /// Load notes from an export document
    Import {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only notes in the trash
    #[arg(long, conflicts_with = "all")]
    pub deleted: bool,

    /// Active and deleted notes
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SearchArgs {
    /// Match note titles
    #[arg(long)]
    pub title: Option<String>,

    /// Notes carrying every one of these tags
    #[arg(long, num_args = 1..)]
    pub tags: Option<Vec<String>>,
}

#[derive(Subcommand, Debug)]
pub enum GroupAction {
    /// Save a tag set (saving an existing set refreshes it)
    Save {
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },
    /// List groups, most recently used first
    List,
    /// Delete a group
    Delete { id: String },
    /// Protect a group from pruning and deletion
    Protect {
        id: String,
        #[arg(long)]
        off: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_new_with_type_and_tags() {
        let cli = Cli::try_parse_from([
            "jotz", "new", "--type", "md", "-t", "a,b", "c", "--", "note.md",
        ])
        .unwrap();
        match cli.command {
            Commands::New {
                tags,
                note_type,
                file,
                ..
            } => {
                assert_eq!(tags, vec!["a,b", "c"]);
                assert_eq!(note_type, NoteType::Markdown);
                assert_eq!(file, Some(PathBuf::from("note.md")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn new_requires_tags() {
        assert!(Cli::try_parse_from(["jotz", "new"]).is_err());
    }

    #[test]
    fn search_needs_exactly_one_mode() {
        assert!(Cli::try_parse_from(["jotz", "search"]).is_err());
        assert!(Cli::try_parse_from(["jotz", "search", "--title", "x", "--tags", "a"]).is_err());
        assert!(Cli::try_parse_from(["jotz", "search", "--tags", "a", "b"]).is_ok());
    }

    #[test]
    fn tag_listing_modes() {
        assert!(Cli::try_parse_from(["jotz", "tags", "--by-date", "--prefix", "wo"]).is_err());
        let cli = Cli::try_parse_from(["jotz", "tagged", "wo", "--prefix"]).unwrap();
        assert!(matches!(cli.command, Commands::Tagged { prefix: true, .. }));
    }

    #[test]
    fn data_dir_is_global() {
        let cli = Cli::try_parse_from(["jotz", "status", "--data-dir", "/tmp/j"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/j")));
    }
}
