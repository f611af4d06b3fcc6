//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// Structured report viewer: inspect and search DICOM SR content trees
#[derive(Parser, Debug)]
#[command(name = "srview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding a local .srview.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the content tree
    Tree {
        /// Report document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Find nodes whose value contains text (case-insensitive)
    Search {
        /// Report document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Search term
        term: String,
        /// Show the whole tree with matches highlighted
        #[arg(long)]
        tree: bool,
    },

    /// Find nodes by value type (TEXT, CODE, NUM, CONTAINER, ...)
    FindType {
        /// Report document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Value type
        value_type: String,
    },

    /// Find nodes by relationship to their parent (CONTAINS, HAS PROPERTIES, ...)
    FindRel {
        /// Report document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Relationship type
        relationship: String,
    },

    /// Combined search: text, then type, then relationship
    Query {
        /// Report document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Value contains text
        #[arg(long)]
        text: Option<String>,
        /// Value type equals
        #[arg(long = "type")]
        value_type: Option<String>,
        /// Relationship equals
        #[arg(long = "rel")]
        relationship: Option<String>,
    },

    /// Show details of one node
    Show {
        /// Report document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node id (root, node_3 or 3)
        id: String,
    },

    /// Classify documents in a directory
    Scan {
        /// Directory (default: scan_dir setting or cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
