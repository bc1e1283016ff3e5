// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "pdlog - A personal journal for the command line",
    long_about = "pdlog keeps timestamped, tagged journal entries in a local database. Entries can be searched by tag or text, and the whole journal can be exported to a portable JSON backup and merged back in on another machine."
)]
pub struct Cli {
    /// Journal database to use instead of the configured one.
    #[arg(long, global = true, env = "PDLOG_DB", value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates the config directory, a default config file and the journal database.
    Init,

    /// Adds a new journal entry.
    /// If no text is provided via -m, it opens the default editor.
    Add {
        #[arg(short, long, help = "The entry text")]
        message: Option<String>,
        #[arg(short, long, default_value = "", help = "A short label for the entry")]
        tag: String,
        #[arg(long, value_name = "YYYY-MM-DD HH:MM", help = "When it happened (local time, default: now)")]
        at: Option<String>,
    },

    /// Lists entries, most recent first.
    /// With a query, only entries whose tag or text contains it (ignoring case) are shown.
    #[command(visible_alias = "search")]
    List {
        /// Text to look for in tags and entry text.
        query: Option<String>,
    },

    /// Deletes one entry by its ID.
    Del {
        #[arg(help = "The ID of the entry to delete, as shown by `pdlog list`")]
        id: String,
    },

    /// Deletes every entry. Asks for confirmation first.
    Clear {
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Writes a full backup named pd-tracker-backup-<date>.json.
    Export {
        #[arg(short, long, value_name = "DIR", help = "Directory for the backup file")]
        out: Option<PathBuf>,
    },

    /// Merges a backup file into the journal. Entries with the same ID are overwritten.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Manages the offline copy of the app's static files.
    #[command(subcommand)]
    Assets(AssetsCommand),
}

#[derive(Subcommand, Debug)]
pub enum AssetsCommand {
    /// Caches every manifest path as a new generation and drops older generations.
    Install {
        #[arg(long, value_name = "DIR", help = "Directory serving the original files")]
        from: PathBuf,
        #[arg(long, value_name = "DIR", help = "Cache root directory")]
        cache: PathBuf,
        #[arg(long, default_value = "pd-tracker")]
        name: String,
        #[arg(long, help = "Generation number; older generations are deleted")]
        cache_version: u32,
        #[arg(required = true, value_name = "PATH")]
        manifest: Vec<String>,
    },
}
