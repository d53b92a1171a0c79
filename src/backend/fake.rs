//! In-memory backend for tests
//!
//! Serves a canned archive listing and records every call as the argument
//! list tarsnap would have received.

use std::path::PathBuf;

use super::{ArchiveBackend, BackendOption};
use crate::error::{KeeperError, KeeperResult};

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub archives: Vec<String>,
    pub calls: Vec<Vec<String>>,
    pub fail_create: bool,
    pub fail_delete: bool,
    pub authentications: usize,
}

impl FakeBackend {
    pub fn with_archives<S: Into<String>>(archives: impl IntoIterator<Item = S>) -> Self {
        Self {
            archives: archives.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Number of recorded calls containing `flag`
    pub fn count(&self, flag: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| call.iter().any(|arg| arg == flag))
            .count()
    }
}

fn option_args(options: &[BackendOption]) -> Vec<String> {
    options.iter().flat_map(BackendOption::to_args).collect()
}

impl ArchiveBackend for FakeBackend {
    fn list_archives(&mut self) -> KeeperResult<Vec<String>> {
        self.calls.push(vec!["--list-archives".into()]);
        Ok(self.archives.clone())
    }

    fn create_archive(
        &mut self,
        name: &str,
        excludes: &[String],
        sources: &[PathBuf],
        options: &[BackendOption],
    ) -> KeeperResult<()> {
        let mut call = option_args(options);
        call.push("-c".into());
        for exclude in excludes {
            call.push("--exclude".into());
            call.push(exclude.clone());
        }
        call.push("-f".into());
        call.push(name.into());
        call.extend(sources.iter().map(|s| s.display().to_string()));
        self.calls.push(call);

        if self.fail_create {
            return Err(KeeperError::backend(1, "simulated create failure"));
        }
        self.archives.push(name.to_string());
        Ok(())
    }

    fn delete_archives(&mut self, names: &[String], options: &[BackendOption]) -> KeeperResult<()> {
        let mut call = option_args(options);
        call.push("-d".into());
        for name in names {
            call.push("-f".into());
            call.push(name.clone());
        }
        self.calls.push(call);

        if self.fail_delete {
            return Err(KeeperError::backend(1, "simulated delete failure"));
        }
        self.archives.retain(|a| !names.contains(a));
        Ok(())
    }

    fn authenticate_if_needed(&mut self) -> KeeperResult<()> {
        self.authentications += 1;
        Ok(())
    }
}
