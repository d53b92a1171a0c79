//! YAML job configuration
//!
//! ```yaml
//! deltas: 1d 7d 30d
//! delta-names:
//!   important: 1h 1d 30d 90d 360d
//! target: /localmachine/$name-$date
//! include-jobs: /etc/snapkeeper/jobs.d/*
//!
//! jobs:
//!   images:
//!     source: /home/me/Images
//!   important-job:
//!     source: /important/
//!     delta: important
//! ```
//!
//! Global `deltas`, `target` and `dateformat` are defaults for every job.
//! Files matched by `include-jobs` each hold a mapping of further jobs, read
//! in sorted order as if they followed the `jobs` section.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::delta::parse_deltas;
use crate::error::{KeeperError, KeeperResult};
use crate::models::{Job, JobBuilder};
use crate::naming::Template;

/// Top-level keys of the config file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    deltas: Option<String>,
    delta_names: Option<BTreeMap<String, Option<String>>>,
    target: Option<String>,
    dateformat: Option<String>,
    include_jobs: Option<String>,
    jobs: Option<Mapping>,
    #[serde(default)]
    ask_passphrase: bool,
    /// Keys snapkeeper does not know about
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// A value given either as a single string or as a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJob {
    source: Option<String>,
    sources: Option<StringOrList>,
    alias: Option<String>,
    aliases: Option<StringOrList>,
    exclude: Option<String>,
    excludes: Option<StringOrList>,
    delta: Option<String>,
    deltas: Option<String>,
    target: Option<String>,
    dateformat: Option<String>,
    #[serde(default)]
    force: bool,
    exec_before: Option<String>,
    exec_after: Option<String>,
    on_success: Option<String>,
    keyfile: Option<PathBuf>,
    cachedir: Option<PathBuf>,
}

/// Settings every job falls back to
struct Defaults {
    deltas: Vec<Duration>,
    named_deltas: BTreeMap<String, Vec<Duration>>,
    target: Option<String>,
    dateformat: Option<String>,
}

/// A loaded configuration
#[derive(Debug, Clone)]
pub struct Config {
    jobs: Vec<Job>,
    ask_passphrase: bool,
    extra: BTreeMap<String, Value>,
}

impl Config {
    /// All jobs, in order of appearance
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.name() == Some(name))
    }

    pub fn ask_passphrase(&self) -> bool {
        self.ask_passphrase
    }

    /// Top-level keys that were not recognised
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// The jobs named in `names`, in config order; all jobs if `names` is empty
    pub fn select(&self, names: &[String]) -> KeeperResult<Vec<&Job>> {
        if names.is_empty() {
            return Ok(self.jobs.iter().collect());
        }

        let unknown: Vec<String> = names
            .iter()
            .filter(|name| self.job(name).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(KeeperError::UnknownJobs(unknown));
        }

        Ok(self
            .jobs
            .iter()
            .filter(|job| job.name().map_or(false, |n| names.iter().any(|s| s == n)))
            .collect())
    }
}

/// Load a configuration from YAML text
///
/// A relative `include-jobs` pattern is resolved against the working
/// directory.
pub fn load_config(text: &str) -> KeeperResult<Config> {
    load(text, None)
}

/// Load a configuration file
///
/// A relative `include-jobs` pattern is resolved against the directory of
/// the file.
pub fn load_config_from_file(path: &Path) -> KeeperResult<Config> {
    let text = fs::read_to_string(path)
        .map_err(|e| KeeperError::Io(format!("Cannot read {}: {}", path.display(), e)))?;
    load(&text, path.parent())
}

fn load(text: &str, base_dir: Option<&Path>) -> KeeperResult<Config> {
    let value: Value = serde_yaml::from_str(text)?;
    let raw: RawConfig = match value {
        Value::Null => RawConfig::default(),
        Value::Mapping(_) => serde_yaml::from_value(value)?,
        _ => return Err(KeeperError::Config("config must be a mapping".into())),
    };

    if let Some(target) = &raw.target {
        require_placeholders(target, &["name", "date"], "The global target")?;
    }

    let defaults = Defaults {
        deltas: match &raw.deltas {
            Some(text) => parse_deltas(text)?,
            None => Vec::new(),
        },
        named_deltas: parse_named_deltas(raw.delta_names.unwrap_or_default())?,
        target: raw.target,
        dateformat: raw.dateformat,
    };

    for key in raw.extra.keys() {
        debug!("Ignoring unknown config key '{}'", key);
    }

    let mut jobs = Vec::new();
    let mut seen = HashSet::new();

    if let Some(section) = raw.jobs {
        load_jobs(section, &defaults, &mut jobs, &mut seen)?;
    }

    if let Some(pattern) = &raw.include_jobs {
        for file in expand_include_pattern(pattern, base_dir)? {
            debug!("Including jobs from {}", file.display());
            let text = fs::read_to_string(&file)
                .map_err(|e| KeeperError::Io(format!("Cannot read {}: {}", file.display(), e)))?;
            match serde_yaml::from_str(&text)? {
                Value::Null => {}
                Value::Mapping(section) => load_jobs(section, &defaults, &mut jobs, &mut seen)?,
                _ => {
                    return Err(KeeperError::Config(format!(
                        "{}: included job files must contain a mapping of jobs",
                        file.display()
                    )))
                }
            }
        }
    }

    if jobs.is_empty() {
        return Err(KeeperError::Config(
            "config must define at least one job".into(),
        ));
    }

    Ok(Config {
        jobs,
        ask_passphrase: raw.ask_passphrase,
        extra: raw.extra,
    })
}

fn require_placeholders(text: &str, placeholders: &[&str], what: &str) -> KeeperResult<()> {
    let template = Template::new(text);
    if placeholders.iter().all(|p| template.has_placeholder(p)) {
        Ok(())
    } else {
        Err(KeeperError::Config(format!(
            "{} must make use of the following placeholders: {}",
            what,
            placeholders.join(", ")
        )))
    }
}

fn parse_named_deltas(
    named: BTreeMap<String, Option<String>>,
) -> KeeperResult<BTreeMap<String, Vec<Duration>>> {
    named
        .into_iter()
        .map(|(name, deltas)| match deltas {
            Some(text) => Ok((name, parse_deltas(&text)?)),
            None => Err(KeeperError::Config(format!("{}: No deltas specified", name))),
        })
        .collect()
}

fn load_jobs(
    section: Mapping,
    defaults: &Defaults,
    jobs: &mut Vec<Job>,
    seen: &mut HashSet<String>,
) -> KeeperResult<()> {
    for (key, value) in section {
        let name = job_name(key)?;
        if !seen.insert(name.clone()) {
            return Err(KeeperError::Config(format!("{}: duplicated job name", name)));
        }
        jobs.push(load_job(name, value, defaults)?);
    }
    Ok(())
}

fn job_name(key: Value) -> KeeperResult<String> {
    match key {
        Value::String(name) => Ok(name),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(KeeperError::Config(format!(
            "invalid job name: {:?}",
            other
        ))),
    }
}

/// Pick the single or the list form of a key, refusing both
fn one_or_many(
    job: &str,
    single: Option<String>,
    many: Option<StringOrList>,
    keys: (&str, &str),
) -> KeeperResult<Option<Vec<String>>> {
    match (single, many) {
        (Some(_), Some(_)) => Err(KeeperError::Config(format!(
            "{}: Use either the \"{}\" or \"{}\" option, not both",
            job, keys.0, keys.1
        ))),
        (Some(value), None) => Ok(Some(vec![value])),
        (None, Some(values)) => Ok(Some(values.into_vec())),
        (None, None) => Ok(None),
    }
}

fn load_job(name: String, value: Value, defaults: &Defaults) -> KeeperResult<Job> {
    let raw: RawJob = if value.is_null() {
        RawJob::default()
    } else {
        serde_yaml::from_value(value).map_err(|e| {
            KeeperError::Config(format!("{} has unsupported configuration values: {}", name, e))
        })?
    };

    let sources = one_or_many(&name, raw.source, raw.sources, ("source", "sources"))?
        .unwrap_or_default();
    let aliases = one_or_many(&name, raw.alias, raw.aliases, ("alias", "aliases"))?
        .unwrap_or_default();
    let excludes = one_or_many(&name, raw.exclude, raw.excludes, ("exclude", "excludes"))?
        .unwrap_or_default();

    let deltas = match (raw.delta, raw.deltas) {
        (Some(_), Some(_)) => {
            return Err(KeeperError::Config(format!(
                "{}: Use either the \"deltas\" or \"delta\" option, not both",
                name
            )))
        }
        (Some(delta_name), None) => defaults
            .named_deltas
            .get(&delta_name)
            .cloned()
            .ok_or_else(|| {
                KeeperError::Config(format!(
                    "{}: Named delta \"{}\" not defined",
                    name, delta_name
                ))
            })?,
        (None, Some(text)) => {
            let deltas = parse_deltas(&text)?;
            if deltas.is_empty() {
                defaults.deltas.clone()
            } else {
                deltas
            }
        }
        (None, None) => defaults.deltas.clone(),
    };

    let target = raw
        .target
        .or_else(|| defaults.target.clone())
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| KeeperError::Config(format!("{} does not have a target name", name)))?;
    require_placeholders(&target, &["date"], &format!("{}: target", name))?;

    JobBuilder::new(target)
        .name(name.clone())
        .aliases(aliases)
        .maybe_dateformat(raw.dateformat.or_else(|| defaults.dateformat.clone()))
        .deltas(deltas)
        .sources(sources.into_iter().map(PathBuf::from).collect())
        .excludes(excludes)
        .force(raw.force)
        .exec_before(raw.exec_before)
        .exec_after(raw.exec_after)
        .on_success(raw.on_success)
        .keyfile(raw.keyfile)
        .cachedir(raw.cachedir)
        .build()
        .map_err(|e| KeeperError::Config(format!("{}: {}", name, e)))
}

/// Files matching an `include-jobs` glob, sorted
///
/// Wildcards (`*`, `?`) are supported in the final path component only.
fn expand_include_pattern(pattern: &str, base_dir: Option<&Path>) -> KeeperResult<Vec<PathBuf>> {
    let pattern_path = Path::new(pattern);
    let pattern_path = match base_dir {
        Some(base) if pattern_path.is_relative() => base.join(pattern_path),
        _ => pattern_path.to_path_buf(),
    };

    let file_pattern = pattern_path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| KeeperError::Config(format!("invalid include-jobs pattern: {}", pattern)))?;
    let dir = match pattern_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if dir.to_string_lossy().contains(|c| c == '*' || c == '?') {
        return Err(KeeperError::Config(format!(
            "include-jobs: wildcards are only supported in the file name: {}",
            pattern
        )));
    }

    let regex = format!(
        "^{}$",
        regex::escape(file_pattern)
            .replace(r"\*", ".*")
            .replace(r"\?", ".")
    );
    let matcher = Regex::new(&regex)
        .map_err(|e| KeeperError::Config(format!("invalid include-jobs pattern: {}", e)))?;

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|f| f.to_str())
            .map_or(false, |f| matcher.is_match(f));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
