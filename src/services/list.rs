//! The list command

use super::{HookRunner, JobRunner};
use crate::backend::ArchiveBackend;
use crate::error::KeeperResult;
use crate::models::{newest_first, Archive, Job};

impl<B: ArchiveBackend, H: HookRunner> JobRunner<B, H> {
    /// A job's archives, newest first
    pub fn list(&mut self, job: &Job) -> KeeperResult<Vec<Archive>> {
        let backups = self.archives(job)?;
        Ok(newest_first(&backups))
    }
}
