//! Backup job model
//!
//! A job describes one backup target: where the data comes from, how its
//! archives are named, and how long they are retained. Jobs are assembled
//! through `JobBuilder`, validated once, and never change afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Duration;

use crate::naming::dates::is_valid_format;
use crate::naming::Template;

/// A single, validated backup job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    name: Option<String>,
    aliases: Vec<String>,
    target: String,
    dateformat: Option<String>,
    deltas: Vec<Duration>,
    sources: Vec<PathBuf>,
    excludes: Vec<String>,
    force: bool,
    exec_before: Option<String>,
    exec_after: Option<String>,
    on_success: Option<String>,
    keyfile: Option<PathBuf>,
    cachedir: Option<PathBuf>,
}

impl Job {
    /// The configured job name; jobs given on the command line have none
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for log messages
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed job")
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The job name followed by its aliases, in matching order
    pub fn candidate_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_deref().unwrap_or_default())
            .chain(self.aliases.iter().map(String::as_str))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn dateformat(&self) -> Option<&str> {
        self.dateformat.as_deref()
    }

    /// Retention deltas, ascending; empty when the job does not expire
    pub fn deltas(&self) -> &[Duration] {
        &self.deltas
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Back up even when sources are missing or empty
    pub fn force(&self) -> bool {
        self.force
    }

    pub fn exec_before(&self) -> Option<&str> {
        self.exec_before.as_deref()
    }

    pub fn exec_after(&self) -> Option<&str> {
        self.exec_after.as_deref()
    }

    pub fn on_success(&self) -> Option<&str> {
        self.on_success.as_deref()
    }

    pub fn keyfile(&self) -> Option<&Path> {
        self.keyfile.as_deref()
    }

    pub fn cachedir(&self) -> Option<&Path> {
        self.cachedir.as_deref()
    }

    /// Render the archive name for a backup taken at the given date string
    pub fn archive_name(&self, date: &str) -> String {
        Template::new(&self.target).render(self.name.as_deref().unwrap_or_default(), date)
    }
}

/// Builder for `Job`
#[derive(Debug, Clone, Default)]
pub struct JobBuilder {
    job: JobFields,
}

#[derive(Debug, Clone, Default)]
struct JobFields {
    name: Option<String>,
    aliases: Vec<String>,
    target: String,
    dateformat: Option<String>,
    deltas: Vec<Duration>,
    sources: Vec<PathBuf>,
    excludes: Vec<String>,
    force: bool,
    exec_before: Option<String>,
    exec_after: Option<String>,
    on_success: Option<String>,
    keyfile: Option<PathBuf>,
    cachedir: Option<PathBuf>,
}

impl JobBuilder {
    /// Start a job with the given target template
    pub fn new(target: impl Into<String>) -> Self {
        let mut builder = Self::default();
        builder.job.target = target.into();
        builder
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.job.name = Some(name.into());
        self
    }

    pub fn aliases(mut self, aliases: Vec<String>) -> Self {
        self.job.aliases = aliases;
        self
    }

    pub fn dateformat(mut self, dateformat: impl Into<String>) -> Self {
        self.job.dateformat = Some(dateformat.into());
        self
    }

    pub fn maybe_dateformat(mut self, dateformat: Option<String>) -> Self {
        self.job.dateformat = dateformat;
        self
    }

    pub fn deltas(mut self, deltas: Vec<Duration>) -> Self {
        self.job.deltas = deltas;
        self
    }

    pub fn sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.job.sources = sources;
        self
    }

    pub fn excludes(mut self, excludes: Vec<String>) -> Self {
        self.job.excludes = excludes;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.job.force = force;
        self
    }

    pub fn exec_before(mut self, command: Option<String>) -> Self {
        self.job.exec_before = command;
        self
    }

    pub fn exec_after(mut self, command: Option<String>) -> Self {
        self.job.exec_after = command;
        self
    }

    pub fn on_success(mut self, command: Option<String>) -> Self {
        self.job.on_success = command;
        self
    }

    pub fn keyfile(mut self, keyfile: Option<PathBuf>) -> Self {
        self.job.keyfile = keyfile;
        self
    }

    pub fn cachedir(mut self, cachedir: Option<PathBuf>) -> Self {
        self.job.cachedir = cachedir;
        self
    }

    /// Validate and produce the job
    pub fn build(self) -> Result<Job, JobValidationError> {
        let mut fields = self.job;
        let template = Template::new(&fields.target);

        if fields.target.trim().is_empty() {
            return Err(JobValidationError::EmptyTarget);
        }
        if !template.has_placeholder("date") {
            return Err(JobValidationError::MissingDatePlaceholder);
        }
        if fields.name.is_none() && template.has_placeholder("name") {
            return Err(JobValidationError::NamePlaceholderWithoutName);
        }
        if fields.deltas.len() == 1 {
            return Err(JobValidationError::TooFewDeltas);
        }
        if let Some(delta) = fields.deltas.iter().find(|d| **d <= Duration::zero()) {
            return Err(JobValidationError::NonPositiveDelta(delta.num_seconds()));
        }
        if let Some(format) = &fields.dateformat {
            if !is_valid_format(format) {
                return Err(JobValidationError::InvalidDateFormat(format.clone()));
            }
        }

        fields.deltas.sort();

        Ok(Job {
            name: fields.name,
            aliases: fields.aliases,
            target: fields.target,
            dateformat: fields.dateformat,
            deltas: fields.deltas,
            sources: fields.sources,
            excludes: fields.excludes,
            force: fields.force,
            exec_before: fields.exec_before,
            exec_after: fields.exec_after,
            on_success: fields.on_success,
            keyfile: fields.keyfile,
            cachedir: fields.cachedir,
        })
    }
}

/// Validation errors for jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobValidationError {
    EmptyTarget,
    MissingDatePlaceholder,
    NamePlaceholderWithoutName,
    TooFewDeltas,
    NonPositiveDelta(i64),
    InvalidDateFormat(String),
}

impl fmt::Display for JobValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTarget => write!(f, "does not have a target name"),
            Self::MissingDatePlaceholder => {
                write!(f, "target must make use of the following placeholders: date")
            }
            Self::NamePlaceholderWithoutName => {
                write!(f, "target uses $name, but the job has no name")
            }
            Self::TooFewDeltas => write!(f, "At least two deltas are required"),
            Self::NonPositiveDelta(seconds) => {
                write!(f, "deltas must be positive (got {}s)", seconds)
            }
            Self::InvalidDateFormat(format) => write!(f, "invalid dateformat '{}'", format),
        }
    }
}

impl std::error::Error for JobValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_job() {
        let job = JobBuilder::new("$name-$date")
            .name("home")
            .sources(vec![PathBuf::from("/home")])
            .build()
            .unwrap();

        assert_eq!(job.name(), Some("home"));
        assert_eq!(job.display_name(), "home");
        assert!(job.deltas().is_empty());
        assert!(!job.force());
    }

    #[test]
    fn test_deltas_sorted_ascending() {
        let job = JobBuilder::new("$date")
            .deltas(vec![Duration::days(30), Duration::days(1), Duration::days(7)])
            .build()
            .unwrap();

        assert_eq!(
            job.deltas(),
            &[Duration::days(1), Duration::days(7), Duration::days(30)]
        );
    }

    #[test]
    fn test_target_validation() {
        assert_eq!(
            JobBuilder::new("").build().unwrap_err(),
            JobValidationError::EmptyTarget
        );
        assert_eq!(
            JobBuilder::new("$name").name("x").build().unwrap_err(),
            JobValidationError::MissingDatePlaceholder
        );
        assert_eq!(
            JobBuilder::new("$name-$date").build().unwrap_err(),
            JobValidationError::NamePlaceholderWithoutName
        );
    }

    #[test]
    fn test_delta_validation() {
        assert_eq!(
            JobBuilder::new("$date")
                .deltas(vec![Duration::days(1)])
                .build()
                .unwrap_err(),
            JobValidationError::TooFewDeltas
        );
        assert!(matches!(
            JobBuilder::new("$date")
                .deltas(vec![Duration::zero(), Duration::days(1)])
                .build(),
            Err(JobValidationError::NonPositiveDelta(0))
        ));
    }

    #[test]
    fn test_dateformat_validation() {
        assert!(JobBuilder::new("$date").dateformat("%Y-%Q").build().is_err());
        assert!(JobBuilder::new("$date").dateformat("%Y%m%d").build().is_ok());
    }

    #[test]
    fn test_dateformat_with_offset_rejected() {
        let err = JobBuilder::new("$date")
            .dateformat("%Y%m%d-%H%M%S%z")
            .build()
            .unwrap_err();
        assert!(matches!(err, JobValidationError::InvalidDateFormat(_)));
    }

    #[test]
    fn test_candidate_names_and_archive_name() {
        let job = JobBuilder::new("/srv/$name-$date")
            .name("db")
            .aliases(vec!["database".into()])
            .build()
            .unwrap();

        let names: Vec<_> = job.candidate_names().collect();
        assert_eq!(names, vec!["db", "database"]);
        assert_eq!(job.archive_name("20200101-000000"), "/srv/db-20200101-000000");
    }
}
