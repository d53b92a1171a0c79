//! make, expire and list
//!
//! Loads the jobs, wires the tarsnap backend into a `JobRunner` and runs the
//! command on every selected job in turn.

use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use super::jobs::{select_jobs, validate_args, JobArgs};
use super::{handle_simulate, Commands};
use crate::backend::{BackendOption, TarsnapBackend};
use crate::catalog::ArchiveCatalog;
use crate::config::{load_config_from_file, Config};
use crate::display::{format_archive_list, format_archive_table, format_listings_json, JobListing};
use crate::error::KeeperResult;
use crate::services::{JobRunner, RunOptions, ShellHooks};

/// Everything from the command line besides the subcommand
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Job file to load; `None` means the job comes from `job`
    pub config: Option<PathBuf>,
    pub job: JobArgs,
    /// Options forwarded to every tarsnap call
    pub options: Vec<BackendOption>,
    pub tarsnap_binary: PathBuf,
    pub ask_passphrase: bool,
}

/// Run a subcommand, writing its output to stdout
pub fn handle_command(ctx: RunContext, cmd: Commands) -> KeeperResult<()> {
    if let Commands::Simulate { timestamps } = &cmd {
        print!("{}", handle_simulate(ctx.job.deltas(), timestamps)?);
        return Ok(());
    }

    validate_args(ctx.config.is_some(), &ctx.job, &cmd)?;

    let config = match &ctx.config {
        Some(path) => Some(load_config_from_file(path)?),
        None => None,
    };
    let jobs = select_jobs(config.as_ref(), &ctx.job, cmd.job_names())?;

    let ask_passphrase = ctx.ask_passphrase || config.as_ref().map_or(false, Config::ask_passphrase);
    let backend = TarsnapBackend::new(ctx.tarsnap_binary, ctx.options).ask_passphrase(ask_passphrase);

    let options = match cmd {
        Commands::Make {
            dry_run, no_expire, ..
        } => RunOptions { dry_run, no_expire },
        Commands::Expire { dry_run, .. } => RunOptions {
            dry_run,
            no_expire: false,
        },
        _ => RunOptions::default(),
    };
    let mut runner = JobRunner::new(ArchiveCatalog::new(backend), ShellHooks, options);

    match cmd {
        Commands::Make { .. } => {
            for job in &jobs {
                runner.make(job)?;
            }
        }
        Commands::Expire { .. } => {
            for job in &jobs {
                runner.expire(job)?;
            }
        }
        Commands::List { long, json, .. } => {
            let now = Utc::now().naive_utc();
            let mut listings = Vec::new();

            for job in &jobs {
                let archives = runner.list(job)?;
                if json {
                    listings.push(JobListing {
                        job: job.name().map(str::to_string),
                        archives,
                    });
                    continue;
                }

                info!("{}", job.display_name());
                if long {
                    print!("{}", format_archive_table(&archives, now));
                } else {
                    print!("{}", format_archive_list(&archives));
                }
            }

            if json {
                println!("{}", format_listings_json(&listings)?);
            }
        }
        Commands::Simulate { .. } => {}
    }

    Ok(())
}
