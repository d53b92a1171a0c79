//! Archive catalog
//!
//! One consistent view of the archives that exist, for the duration of a
//! single command invocation.
//!
//! The backend is queried for its archive list at most once. Archives created
//! during the run are held in a separate list and merged in on every read, so
//! a backup that was just made is visible to a following expiration without
//! asking the backend again. Deleted archives are removed from both lists.
//!
//! The catalog assumes nothing else modifies the archive set while it lives.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::warn;

use crate::backend::{ArchiveBackend, BackendOption};
use crate::error::KeeperResult;
use crate::models::ArchiveMap;
use crate::naming::JobMatcher;

/// Largest number of archives removed by a single backend call
///
/// Keeps the backend command line well below common argument length limits.
pub const DELETE_BATCH_SIZE: usize = 500;

/// Cached archive listing for one run
pub struct ArchiveCatalog<B> {
    backend: B,
    /// Result of the backend query, once made
    queried: Option<Vec<String>>,
    /// Archives created during this run
    known: Vec<String>,
    batch_size: usize,
}

impl<B: ArchiveBackend> ArchiveCatalog<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            queried: None,
            known: Vec::new(),
            batch_size: DELETE_BATCH_SIZE,
        }
    }

    /// Override the delete batch size (minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// All archive names: the backend listing followed by those created since
    pub fn list_archives(&mut self) -> KeeperResult<Vec<String>> {
        if self.queried.is_none() {
            self.backend.authenticate_if_needed()?;
            self.queried = Some(self.backend.list_archives()?);
        }

        let queried = self.queried.as_deref().unwrap_or_default();
        let created = self.known.iter().filter(|name| !queried.contains(name));

        Ok(queried.iter().chain(created).cloned().collect())
    }

    /// Remember an archive made during this run without requerying
    pub fn record_created(&mut self, name: impl Into<String>) {
        self.known.push(name.into());
    }

    /// Have the backend create an archive, then record it
    pub fn create(
        &mut self,
        name: &str,
        excludes: &[String],
        sources: &[PathBuf],
        options: &[BackendOption],
    ) -> KeeperResult<()> {
        self.backend.authenticate_if_needed()?;
        self.backend.create_archive(name, excludes, sources, options)?;
        self.record_created(name);
        Ok(())
    }

    /// Delete archives, at most `batch_size` per backend call
    ///
    /// Stops at the first failing batch; archives of earlier batches stay
    /// deleted. Returns the number of archives deleted.
    pub fn delete_batch(&mut self, names: &[String], options: &[BackendOption]) -> KeeperResult<usize> {
        if names.is_empty() {
            return Ok(0);
        }
        self.backend.authenticate_if_needed()?;

        let mut deleted = 0;
        for batch in names.chunks(self.batch_size) {
            self.backend.delete_archives(batch, options)?;

            let gone: HashSet<&str> = batch.iter().map(String::as_str).collect();
            if let Some(queried) = self.queried.as_mut() {
                queried.retain(|name| !gone.contains(name.as_str()));
            }
            self.known.retain(|name| !gone.contains(name.as_str()));
            deleted += batch.len();
        }

        Ok(deleted)
    }

    /// Archives belonging to a job, with their timestamps
    ///
    /// Names that match the job's pattern but carry no parsable date are
    /// skipped with a warning.
    pub fn archives_for(&mut self, matcher: &JobMatcher) -> KeeperResult<ArchiveMap> {
        let mut backups = ArchiveMap::new();
        for name in self.list_archives()? {
            match matcher.timestamp(&name) {
                None => {}
                Some(Ok(created)) => {
                    backups.insert(name, created);
                }
                Some(Err(e)) => warn!("Ignoring '{}': {}", name, e),
            }
        }
        Ok(backups)
    }
}
