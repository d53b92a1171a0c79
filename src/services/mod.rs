//! Command orchestration for snapkeeper
//!
//! `JobRunner` implements the three per-job commands on top of the archive
//! catalog:
//!
//! - `make`: back up a job's sources, then expire its old archives
//! - `expire`: delete the archives the job's deltas no longer need
//! - `list`: the job's archives, newest first
//!
//! Jobs are processed one at a time. In dry-run mode no archive is created or
//! deleted; a backup that would have been made is still recorded in the
//! catalog so the following expiration sees it.

pub mod expire;
pub mod hooks;
pub mod list;
pub mod make;

use chrono::{NaiveDateTime, Utc};

use crate::backend::{ArchiveBackend, BackendOption};
use crate::catalog::ArchiveCatalog;
use crate::error::KeeperResult;
use crate::models::{ArchiveMap, Job};
use crate::naming::JobMatcher;

pub use expire::ExpireOutcome;
pub use hooks::{HookRunner, ShellHooks};
pub use make::{MakeOutcome, MakeStatus};

/// Flags shared by all jobs of a run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Log what would be created and deleted, but change nothing
    pub dry_run: bool,
    /// Skip the expiration that normally follows `make`
    pub no_expire: bool,
}

/// Runs commands against jobs, sharing one archive catalog
pub struct JobRunner<B, H> {
    catalog: ArchiveCatalog<B>,
    hooks: H,
    options: RunOptions,
    clock: fn() -> NaiveDateTime,
}

fn utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl<B: ArchiveBackend, H: HookRunner> JobRunner<B, H> {
    pub fn new(catalog: ArchiveCatalog<B>, hooks: H, options: RunOptions) -> Self {
        Self {
            catalog,
            hooks,
            options,
            clock: utc_now,
        }
    }

    /// Replace the clock used to date new archives
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &ArchiveCatalog<B> {
        &self.catalog
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The archives belonging to a job, with their timestamps
    pub fn archives(&mut self, job: &Job) -> KeeperResult<ArchiveMap> {
        let matcher = JobMatcher::new(job)?;
        self.catalog.archives_for(&matcher)
    }
}

/// Per-job options passed on create and delete calls
pub(crate) fn job_options(job: &Job) -> Vec<BackendOption> {
    let mut options = Vec::new();
    if let Some(keyfile) = job.keyfile() {
        options.push(BackendOption::new(
            "keyfile",
            Some(keyfile.display().to_string()),
        ));
    }
    if let Some(cachedir) = job.cachedir() {
        options.push(BackendOption::new(
            "cachedir",
            Some(cachedir.display().to_string()),
        ));
    }
    options
}
