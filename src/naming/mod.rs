//! Archive naming for snapkeeper
//!
//! Maps between a job's target template and the physical archive names the
//! backend reports.
//!
//! A `JobMatcher` is built once per job. For the job's name and each of its
//! aliases the target template is rendered with a unique sentinel in place of
//! `$date`, escaped, and turned into an anchored pattern whose sentinel is a
//! lazy capture group. An archive name belongs to the job if any of these
//! patterns matches it in full; the first match (job name first, then the
//! aliases in order) decides which substring is parsed as the date.
//!
//! The capture is a wildcard, so a job `home` with target `$name-$date` also
//! captures `dev-20200101-000000` from `home-dev-20200101-000000`. Such a
//! capture fails to parse and the archive is reported as unparsable, never
//! attributed to the wrong job.

pub mod dates;
pub mod template;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{KeeperError, KeeperResult};
use crate::models::Job;

pub use dates::{format_date, parse_date, DEFAULT_DATEFORMAT};
pub use template::Template;

/// Recognizes the archives belonging to one job
#[derive(Debug, Clone)]
pub struct JobMatcher {
    patterns: Vec<Regex>,
    dateformat: Option<String>,
}

impl JobMatcher {
    /// Build the matcher for a job and its aliases
    pub fn new(job: &Job) -> KeeperResult<Self> {
        let sentinel = uuid::Uuid::new_v4().simple().to_string();
        let template = Template::new(job.target());

        let patterns = job
            .candidate_names()
            .map(|name| {
                let rendered = template.render(name, &sentinel);
                let escaped = regex::escape(&rendered)
                    .replacen(&sentinel, "(?P<date>.*?)", 1)
                    .replace(&sentinel, ".*?");
                Regex::new(&format!("^{}$", escaped)).map_err(|e| {
                    KeeperError::Config(format!(
                        "Cannot build archive pattern for target '{}': {}",
                        job.target(),
                        e
                    ))
                })
            })
            .collect::<KeeperResult<Vec<_>>>()?;

        Ok(Self {
            patterns,
            dateformat: job.dateformat().map(str::to_string),
        })
    }

    /// The date substring of an archive name, if the name belongs to the job
    pub fn capture_date<'n>(&self, archive: &'n str) -> Option<&'n str> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures(archive)
                .and_then(|caps| caps.name("date"))
                .map(|m| m.as_str())
        })
    }

    /// Match an archive name and parse its timestamp
    ///
    /// Returns `None` for archives of other jobs and a `NamingParse` error for
    /// names that match the pattern but carry no parsable date.
    pub fn timestamp(&self, archive: &str) -> Option<KeeperResult<NaiveDateTime>> {
        let value = self.capture_date(archive)?;
        Some(
            parse_date(value, self.dateformat.as_deref()).ok_or_else(|| {
                KeeperError::NamingParse {
                    archive: archive.to_string(),
                    value: value.to_string(),
                }
            }),
        )
    }
}
