use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "category-agent")]
#[command(about = "Assign product descriptions to category paths, one level at a time")]
#[command(version)]
pub struct Cli {
    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.category-agent)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Taxonomy file, one category path per line (overrides taxonomy.file)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Backend {
    Claude,
    Openai,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the taxonomy as a tree
    Tree,

    /// List the children of a category path ("root" for top level)
    Children {
        /// Category path (e.g., "Beverages > Drink Mixes")
        #[arg(default_value = "root")]
        path: String,

        /// Fail when the path does not exist instead of printing nothing
        #[arg(long)]
        strict: bool,
    },

    /// List every leaf category path
    Categories,

    /// Assign a product description to a category path
    Classify {
        /// Product description (e.g., "Coca-Cola Original Taste Soda Pop - 6 pack")
        description: String,

        /// LLM backend (default: llm.backend)
        #[arg(short, long, value_enum)]
        backend: Option<Backend>,

        /// Model name (default: llm.model)
        #[arg(short, long)]
        model: Option<String>,

        /// Maximum number of decisions, at least 1 (default: traversal.max_steps)
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        max_steps: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., llm.backend)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., llm.backend)
        key: String,

        /// Value to set (e.g., "openai")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
