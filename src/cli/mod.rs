//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod archives;
pub mod jobs;
pub mod simulate;

use clap::Subcommand;

pub use archives::{handle_command, RunContext};
pub use jobs::JobArgs;
pub use simulate::handle_simulate;

/// snapkeeper subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new backup, and afterwards expire old backups
    Make {
        /// Only simulate, make no changes
        #[arg(long)]
        dry_run: bool,

        /// Don't expire, only make backups
        #[arg(long)]
        no_expire: bool,

        /// Only process the given jobs as defined in the config file
        #[arg(value_name = "JOB")]
        jobs: Vec<String>,
    },

    /// Delete old backups, but don't create a new one
    Expire {
        /// Only simulate, don't delete anything
        #[arg(long)]
        dry_run: bool,

        /// Only process the given jobs as defined in the config file
        #[arg(value_name = "JOB")]
        jobs: Vec<String>,
    },

    /// List all the existing backups
    #[command(alias = "ls")]
    List {
        /// Show creation time and age of each archive
        #[arg(short, long, conflicts_with = "json")]
        long: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,

        /// Only process the given jobs as defined in the config file
        #[arg(value_name = "JOB")]
        jobs: Vec<String>,
    },

    /// Show which backups a set of deltas keeps (default deltas: 1d 7d 30d)
    Simulate {
        /// Existing backup timestamps; without any, a daily backup is
        /// simulated for 18 days
        #[arg(value_name = "TIMESTAMP")]
        timestamps: Vec<String>,
    },
}

impl Commands {
    /// Job names given on the command line
    pub fn job_names(&self) -> &[String] {
        match self {
            Self::Make { jobs, .. } | Self::Expire { jobs, .. } | Self::List { jobs, .. } => jobs,
            Self::Simulate { .. } => &[],
        }
    }
}
