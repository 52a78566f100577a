//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Nested AND/OR where-clause builder
#[derive(Parser, Debug)]
#[command(name = "querytree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file (default: $XDG_CONFIG_HOME/querytree/querytree.toml)
    #[arg(short, long, global = true, env = "QUERYTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the starting tree
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit the tree interactively
    Shell,

    /// Apply shell commands from a file and print the result
    Run {
        /// Script with one shell command per line
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the field catalog
    Fields,

    /// List the operators
    Operators,

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

    /// Show config path
    Path,

    /// Write config template to the global config path
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
