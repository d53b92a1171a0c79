//! The make command

use std::fs;
use std::path::PathBuf;

use tracing::{error, info};

use super::{job_options, ExpireOutcome, HookRunner, JobRunner};
use crate::backend::ArchiveBackend;
use crate::error::{KeeperError, KeeperResult};
use crate::models::Job;
use crate::naming::{format_date, DEFAULT_DATEFORMAT};

/// What happened to the backup step of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MakeStatus {
    /// The job defines no sources
    NoSources,
    /// A source is missing or an empty directory, and the job is not forced
    SourcesMissing,
    Created(String),
    /// Dry run: the archive that would have been created
    Simulated(String),
    /// The backend failed to create this archive
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeOutcome {
    pub status: MakeStatus,
    /// Expiration run after the backup, if any
    pub expired: Option<ExpireOutcome>,
}

impl MakeOutcome {
    fn skipped(status: MakeStatus) -> Self {
        Self {
            status,
            expired: None,
        }
    }
}

/// True when every source exists and no source directory is empty
fn sources_present(sources: &[PathBuf]) -> bool {
    sources.iter().all(|source| {
        if source.is_dir() {
            fs::read_dir(source)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false)
        } else {
            source.exists()
        }
    })
}

impl<B: ArchiveBackend, H: HookRunner> JobRunner<B, H> {
    /// Back up a job's sources, then expire its old archives
    ///
    /// A failing backend create is logged and the job carries on with its
    /// `exec_after` hook and expiration. Hook failures and expiration errors
    /// are returned.
    pub fn make(&mut self, job: &Job) -> KeeperResult<MakeOutcome> {
        if job.sources().is_empty() {
            info!("Skipping '{}', does not define sources", job.display_name());
            return Ok(MakeOutcome::skipped(MakeStatus::NoSources));
        }

        if !job.force() && !sources_present(job.sources()) {
            match job.name() {
                Some(name) => info!(
                    "Not backing up '{}', because not all given sources exist",
                    name
                ),
                None => info!("Not making backup, because not all given sources exist"),
            }
            return Ok(MakeOutcome::skipped(MakeStatus::SourcesMissing));
        }

        if let Some(command) = job.exec_before() {
            self.hooks.run(command)?;
        }

        let dateformat = job.dateformat().unwrap_or(DEFAULT_DATEFORMAT);
        let date = format_date((self.clock)(), dateformat).ok_or_else(|| {
            KeeperError::Config(format!(
                "{}: cannot render dateformat '{}'",
                job.display_name(),
                dateformat
            ))
        })?;
        let archive = job.archive_name(&date);

        match job.name() {
            Some(name) => info!("Creating backup {}: {}", name, archive),
            None => info!("Creating backup: {}", archive),
        }

        let status = if self.options.dry_run {
            self.catalog.record_created(archive.clone());
            MakeStatus::Simulated(archive)
        } else {
            match self.catalog.create(
                &archive,
                job.excludes(),
                job.sources(),
                &job_options(job),
            ) {
                Ok(()) => MakeStatus::Created(archive),
                Err(e) => {
                    error!(
                        "Something went wrong with backup job '{}': {}",
                        job.display_name(),
                        e
                    );
                    MakeStatus::Failed(archive)
                }
            }
        };

        if let (MakeStatus::Created(_), Some(command)) = (&status, job.on_success()) {
            self.hooks.run(command)?;
        }
        if let Some(command) = job.exec_after() {
            self.hooks.run(command)?;
        }

        let expired = if self.options.no_expire {
            None
        } else {
            Some(self.expire(job)?)
        };

        Ok(MakeOutcome { status, expired })
    }
}
