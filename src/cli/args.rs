//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Build squarified treemap JSON from a directory of keyword cluster CSVs
#[derive(Parser, Debug)]
#[command(name = "clustermap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project root (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract all clusters and write the squarified JSON
    Build {
        /// Root holding the cluster directory (default: project dir)
        #[arg(value_hint = ValueHint::DirPath)]
        root: Option<PathBuf>,

        /// Output file (default from config, relative to root)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Extraction workers (0 = all cores)
        #[arg(short = 'j', long)]
        workers: Option<usize>,
    },

    /// Replace pillar directory names with display names in an output file
    Rename {
        /// Output file (default from config, relative to project dir)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Print the taxonomy with metrics as a tree
    Tree {
        /// Root holding the cluster directory (default: project dir)
        #[arg(value_hint = ValueHint::DirPath)]
        root: Option<PathBuf>,

        /// Include cluster leaves
        #[arg(long)]
        clusters: bool,
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

    /// Print config template
    Template,

    /// Show config paths
    Path,
}
