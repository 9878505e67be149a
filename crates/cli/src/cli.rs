use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Load, validate and inspect SVDS directories.
#[derive(Parser, Debug)]
#[command(name = "svds", version, about = "Load, validate and inspect SVDS directories")]
pub struct CliArgs {
    /// Configuration profile (overrides SVDS_PROFILE)
    #[arg(long, global = true, env = "SVDS_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a directory into a merged tree, or print a single file's content
    Load {
        /// SVDS directory or JSON file (default: configured data dir)
        path: Option<PathBuf>,

        #[command(flatten)]
        rules: RulesArg,

        /// Also print collected diagnostics
        #[arg(long)]
        diagnostics: bool,
    },

    /// Validate a single SVDS file
    Validate {
        /// JSON file to validate
        file: PathBuf,

        #[command(flatten)]
        rules: RulesArg,
    },

    /// List the file names, classes and class rules
    Rules {
        #[command(flatten)]
        rules: RulesArg,
    },

    /// Read a software export and print its software name and content
    Export {
        /// Export JSON file
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RulesArg {
    /// Rule directory (overrides SVDS_RULES_DIR)
    #[arg(long = "rules")]
    pub dir: Option<PathBuf>,
}
