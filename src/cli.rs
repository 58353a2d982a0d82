use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "guwen",
    about = "guwen — translate and run classical scripts",
    version,
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct GuwenCli {
    /// Script to run (shorthand for `guwen run <FILE>`)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse and execute a script
    #[command(alias = "运转")]
    Run {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Translate a script to token and syntax-tree dumps without running it
    #[command(alias = "译")]
    Translate {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Token dump path (default: <FILE stem>.tokens.json)
        #[arg(long = "tokens-out", value_name = "FILE")]
        tokens_out: Option<PathBuf>,

        /// Syntax-tree dump path (default: <FILE stem>.ast.json)
        #[arg(long = "ast-out", value_name = "FILE")]
        ast_out: Option<PathBuf>,
    },

    /// Interactive session (also the default with no arguments)
    Repl,
}
