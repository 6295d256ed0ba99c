pub mod discover;
pub mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use scan::{OutputFormat, ScanArgs};

#[derive(Parser)]
#[command(
    name = "actiontree",
    about = "Resolve the transitive action dependencies of GitHub workflows",
    version
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve action references and report everything they pull in
    Scan(ScanArgs),
    /// List the action references used by workflow or action files
    Discover {
        /// Workflow or action manifest file(s)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

/// Log filter used when `RUST_LOG` is not set.
pub const fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "actiontree=info,actiontree_core=info",
        1 => "actiontree=debug,actiontree_core=debug",
        _ => "actiontree=trace,actiontree_core=trace",
    }
}
