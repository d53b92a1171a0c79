//! Selecting the jobs a command runs on
//!
//! Jobs come from the config file, or, without one, from a single unnamed
//! job described by `--target`, `--source`, `--deltas` and `--dateformat`.

use std::path::PathBuf;

use chrono::Duration;
use clap::Args;

use super::Commands;
use crate::config::{parse_delta_list, Config};
use crate::error::{KeeperError, KeeperResult};
use crate::models::{Job, JobBuilder};

/// Flags describing a job on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct JobArgs {
    /// Archive name template, e.g. `home-$date`
    #[arg(long, global = true)]
    pub target: Option<String>,

    /// Path to back up (repeatable)
    #[arg(short = 's', long = "source", value_name = "PATH", global = true)]
    pub sources: Vec<PathBuf>,

    /// Retention deltas, e.g. "1d 7d 30d"
    // The full path keeps clap from treating the list as repeated values
    #[arg(
        short,
        long,
        value_name = "DELTAS",
        value_parser = parse_delta_list,
        global = true
    )]
    pub deltas: Option<std::vec::Vec<Duration>>,

    /// strftime format of the $date placeholder
    #[arg(short = 'f', long, global = true)]
    pub dateformat: Option<String>,
}

impl JobArgs {
    /// Whether any job flag was given
    pub fn is_empty(&self) -> bool {
        self.target.is_none()
            && self.sources.is_empty()
            && self.deltas.is_none()
            && self.dateformat.is_none()
    }

    /// The `--deltas` given, or none
    pub fn deltas(&self) -> &[Duration] {
        self.deltas.as_deref().unwrap_or(&[])
    }

    /// Build the unnamed command-line job
    pub fn to_job(&self) -> KeeperResult<Job> {
        let target = self.target.clone().ok_or_else(|| {
            KeeperError::Argument(
                "Since you are not using a config file, you need to give --target".into(),
            )
        })?;

        JobBuilder::new(target)
            .maybe_dateformat(self.dateformat.clone())
            .deltas(self.deltas().to_vec())
            .sources(self.sources.clone())
            .build()
            .map_err(|e| KeeperError::Config(e.to_string()))
    }
}

/// Check flag combinations before anything runs
pub fn validate_args(has_config: bool, args: &JobArgs, command: &Commands) -> KeeperResult<()> {
    if has_config && !args.is_empty() {
        return Err(KeeperError::Argument(
            "If --config is used, then --target, --deltas, --source and --dateformat are not available"
                .into(),
        ));
    }

    let names = command.job_names();
    if !names.is_empty() && !has_config {
        return Err(KeeperError::Argument(format!(
            "Specific jobs ({}) can only be given if a config file is used",
            names.join(", ")
        )));
    }

    if has_config {
        return Ok(());
    }

    match command {
        Commands::Make { no_expire, .. } => {
            require_target(args)?;
            if args.deltas().is_empty() && !no_expire {
                return Err(KeeperError::Argument(
                    "Since you are not using a config file, and have not specified --no-expire, \
                     you will need to give --deltas"
                        .into(),
                ));
            }
            if args.sources.is_empty() {
                return Err(KeeperError::Argument(
                    "Since you are not using a config file, you need to specify at least one \
                     source path using --source"
                        .into(),
                ));
            }
        }
        Commands::Expire { .. } | Commands::List { .. } => require_target(args)?,
        Commands::Simulate { .. } => {}
    }

    Ok(())
}

fn require_target(args: &JobArgs) -> KeeperResult<()> {
    if args.target.is_none() {
        return Err(KeeperError::Argument(
            "Since you are not using a config file, you need to give --target".into(),
        ));
    }
    Ok(())
}

/// The jobs to run, in config order
pub fn select_jobs(config: Option<&Config>, args: &JobArgs, names: &[String]) -> KeeperResult<Vec<Job>> {
    match config {
        Some(config) => Ok(config.select(names)?.into_iter().cloned().collect()),
        None => Ok(vec![args.to_job()?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    fn make(no_expire: bool) -> Commands {
        Commands::Make {
            dry_run: false,
            no_expire,
            jobs: vec![],
        }
    }

    fn full_args() -> JobArgs {
        JobArgs {
            target: Some("home-$date".into()),
            sources: vec![PathBuf::from("/home")],
            deltas: Some(vec![Duration::days(1), Duration::days(7)]),
            dateformat: None,
        }
    }

    #[test]
    fn test_config_excludes_job_flags() {
        let err = validate_args(true, &full_args(), &make(false)).unwrap_err();
        assert!(matches!(err, KeeperError::Argument(_)));
    }

    #[test]
    fn test_job_names_need_config() {
        let command = Commands::Expire {
            dry_run: false,
            jobs: vec!["home".into()],
        };
        let err = validate_args(false, &full_args(), &command).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Specific jobs (home) can only be given if a config file is used"
        );
    }

    #[test]
    fn test_make_requirements() {
        assert!(validate_args(false, &full_args(), &make(false)).is_ok());

        let no_target = JobArgs {
            target: None,
            ..full_args()
        };
        assert!(validate_args(false, &no_target, &make(false)).is_err());

        let no_deltas = JobArgs {
            deltas: None,
            ..full_args()
        };
        assert!(validate_args(false, &no_deltas, &make(false)).is_err());
        assert!(validate_args(false, &no_deltas, &make(true)).is_ok());

        let no_sources = JobArgs {
            sources: vec![],
            ..full_args()
        };
        assert!(validate_args(false, &no_sources, &make(false)).is_err());
    }

    #[test]
    fn test_list_needs_only_target() {
        let command = Commands::List {
            long: false,
            json: false,
            jobs: vec![],
        };
        let args = JobArgs {
            target: Some("$date".into()),
            ..JobArgs::default()
        };
        assert!(validate_args(false, &args, &command).is_ok());
        assert!(validate_args(false, &JobArgs::default(), &command).is_err());
    }

    #[test]
    fn test_command_line_job() {
        let jobs = select_jobs(None, &full_args(), &[]).unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name(), None);
        assert_eq!(jobs[0].target(), "home-$date");
    }

    #[test]
    fn test_command_line_job_without_name_placeholder() {
        let args = JobArgs {
            target: Some("$name-$date".into()),
            ..full_args()
        };
        assert!(select_jobs(None, &args, &[]).unwrap_err().is_config());
    }

    #[test]
    fn test_config_jobs() {
        let config =
            load_config("target: $name-$date\njobs:\n  a:\n  b:\n  c:\n").unwrap();

        let jobs = select_jobs(Some(&config), &JobArgs::default(), &["c".into(), "a".into()]).unwrap();
        let names: Vec<_> = jobs.iter().filter_map(Job::name).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
