//! The expire command

use tracing::{debug, info};

use super::{job_options, HookRunner, JobRunner};
use crate::backend::ArchiveBackend;
use crate::config::format_delta;
use crate::error::KeeperResult;
use crate::expire::{delete_set, expire};
use crate::models::Job;

/// Result of expiring one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpireOutcome {
    /// The job defines no deltas
    NoDeltas,
    Expired {
        /// Number of archives belonging to the job
        matched: usize,
        kept: Vec<String>,
        /// Archives deleted, or that would be deleted in a dry run
        deleted: Vec<String>,
    },
}

impl<B: ArchiveBackend, H: HookRunner> JobRunner<B, H> {
    /// Delete the archives of a job that its deltas no longer require
    ///
    /// Backend failures are returned to the caller.
    pub fn expire(&mut self, job: &Job) -> KeeperResult<ExpireOutcome> {
        if job.deltas().is_empty() {
            info!("Skipping '{}', does not define deltas", job.display_name());
            return Ok(ExpireOutcome::NoDeltas);
        }

        debug!(
            "Expiring '{}' with deltas {}",
            job.display_name(),
            job.deltas().iter().map(format_delta).collect::<Vec<_>>().join(" ")
        );

        let backups = self.archives(job)?;
        info!("{} backups are matching", backups.len());

        let keep = expire(&backups, job.deltas());
        let to_delete = delete_set(&backups, &keep);
        info!("{} of those can be deleted", to_delete.len());

        let kept: Vec<String> = keep.into_iter().collect();
        debug!("Keeping {}", kept.join(" "));

        if !to_delete.is_empty() {
            info!("Deleting {}", to_delete.join(" "));
            if !self.options.dry_run {
                self.catalog.delete_batch(&to_delete, &job_options(job))?;
            }
        }

        Ok(ExpireOutcome::Expired {
            matched: backups.len(),
            kept,
            deleted: to_delete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::delta::parse_deltas;
    use crate::models::JobBuilder;
    use crate::services::testing::{archive, runner};
    use crate::services::RunOptions;
    use std::path::PathBuf;

    fn job(deltas: &str) -> JobBuilder {
        JobBuilder::new("$name-$date")
            .name("test")
            .deltas(parse_deltas(deltas).unwrap())
    }

    #[test]
    fn test_nothing_to_do() {
        let mut runner = runner(
            vec![archive("test", 1), archive("test", 5)],
            RunOptions::default(),
        );

        let outcome = runner.expire(&job("1d 10d").build().unwrap()).unwrap();

        assert!(matches!(outcome, ExpireOutcome::Expired { ref deleted, .. } if deleted.is_empty()));
        assert_eq!(runner.catalog().backend().calls, vec![vec!["--list-archives"]]);
    }

    #[test]
    fn test_no_deltas() {
        let mut runner = runner(vec![archive("test", 1)], RunOptions::default());

        let job = JobBuilder::new("$name-$date").name("test").build().unwrap();
        let outcome = runner.expire(&job).unwrap();

        assert_eq!(outcome, ExpireOutcome::NoDeltas);
        assert!(runner.catalog().backend().calls.is_empty());
    }

    #[test]
    fn test_something_to_expire() {
        let mut runner = runner(
            vec![archive("test", 1), archive("test", 5)],
            RunOptions::default(),
        );

        runner.expire(&job("1d 2d").build().unwrap()).unwrap();

        let calls = &runner.catalog().backend().calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], vec!["-d".to_string(), "-f".into(), archive("test", 5)]);
    }

    #[test]
    fn test_aliases() {
        let mut runner = runner(
            vec![archive("test", 1), archive("alias", 5)],
            RunOptions::default(),
        );

        let job = job("1d 2d").aliases(vec!["alias".into()]).build().unwrap();
        runner.expire(&job).unwrap();

        assert_eq!(
            runner.catalog().backend().calls[1],
            vec!["-d".to_string(), "-f".into(), archive("alias", 5)]
        );
    }

    #[test]
    fn test_prefix_job_archives_untouched() {
        let mut runner = runner(
            vec![archive("home", 1), archive("home-dev", 5), archive("home-dev", 9)],
            RunOptions::default(),
        );

        let job = JobBuilder::new("$name-$date")
            .name("home")
            .deltas(parse_deltas("1d 2d").unwrap())
            .build()
            .unwrap();
        let outcome = runner.expire(&job).unwrap();

        assert!(matches!(outcome, ExpireOutcome::Expired { matched: 1, ref deleted, .. } if deleted.is_empty()));
        assert_eq!(runner.catalog().backend().count("-d"), 0);
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let mut runner = runner(
            vec![archive("test", 1), archive("test", 5)],
            RunOptions {
                dry_run: true,
                ..RunOptions::default()
            },
        );

        let outcome = runner.expire(&job("1d 2d").build().unwrap()).unwrap();

        assert!(matches!(outcome, ExpireOutcome::Expired { ref deleted, .. } if deleted.len() == 1));
        assert_eq!(runner.catalog().backend().count("-d"), 0);
    }

    #[test]
    fn test_job_options_on_delete() {
        let mut runner = runner(
            vec![archive("test", 1), archive("test", 5)],
            RunOptions::default(),
        );

        let job = job("1d 2d")
            .keyfile(Some(PathBuf::from("/etc/tarsnap/key")))
            .cachedir(Some(PathBuf::from("/var/cache/tarsnap")))
            .build()
            .unwrap();
        runner.expire(&job).unwrap();

        assert_eq!(
            runner.catalog().backend().calls[1][..5],
            ["--keyfile", "/etc/tarsnap/key", "--cachedir", "/var/cache/tarsnap", "-d"]
        );
    }

    #[test]
    fn test_delete_failure_propagates() {
        let mut runner = runner(
            vec![archive("test", 1), archive("test", 5)],
            RunOptions::default(),
        );
        runner.catalog.backend_mut().fail_delete = true;

        let err = runner.expire(&job("1d 2d").build().unwrap()).unwrap_err();
        assert!(err.is_backend());
    }
}
