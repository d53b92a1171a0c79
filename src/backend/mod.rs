//! Archival backend interface
//!
//! snapkeeper never touches archive contents. Listing, creating and deleting
//! archives, as well as unlocking the key, are delegated to an
//! `ArchiveBackend`; `TarsnapBackend` drives the `tarsnap` binary.

pub mod tarsnap;

#[cfg(test)]
pub mod fake;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::KeeperResult;

pub use tarsnap::TarsnapBackend;

/// Operations snapkeeper needs from the archival tool
pub trait ArchiveBackend {
    /// Names of all archives the backend knows about
    fn list_archives(&mut self) -> KeeperResult<Vec<String>>;

    /// Create a new archive from `sources`
    fn create_archive(
        &mut self,
        name: &str,
        excludes: &[String],
        sources: &[PathBuf],
        options: &[BackendOption],
    ) -> KeeperResult<()>;

    /// Delete the named archives in a single call
    fn delete_archives(&mut self, names: &[String], options: &[BackendOption]) -> KeeperResult<()>;

    /// Obtain credentials before the first call that needs them
    fn authenticate_if_needed(&mut self) -> KeeperResult<()>;
}

/// An option forwarded verbatim to the backend, e.g. `keyfile=/etc/key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOption {
    pub key: String,
    pub value: Option<String>,
}

impl BackendOption {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Command-line arguments: `-k` for single-letter keys, `--key` otherwise
    pub fn to_args(&self) -> Vec<String> {
        let prefix = if self.key.chars().count() == 1 { "-" } else { "--" };
        let mut args = vec![format!("{}{}", prefix, self.key)];
        args.extend(self.value.clone());
        args
    }
}

impl FromStr for BackendOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = match s.split_once('=') {
            Some((key, value)) => (key, Some(value.to_string())),
            None => (s, None),
        };
        let key = key.trim_start_matches('-');
        if key.is_empty() {
            return Err(format!("invalid option '{}': expected KEY or KEY=VALUE", s));
        }
        Ok(Self::new(key, value))
    }
}

impl fmt::Display for BackendOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        let opt: BackendOption = "keyfile=/etc/tarsnap.key".parse().unwrap();
        assert_eq!(opt.key, "keyfile");
        assert_eq!(opt.value.as_deref(), Some("/etc/tarsnap.key"));

        let flag: BackendOption = "v".parse().unwrap();
        assert_eq!(flag, BackendOption::new("v", None));

        assert!("=x".parse::<BackendOption>().is_err());
    }

    #[test]
    fn test_option_args() {
        assert_eq!(BackendOption::new("o", Some("1".into())).to_args(), vec!["-o", "1"]);
        assert_eq!(
            BackendOption::new("foo", Some("1".into())).to_args(),
            vec!["--foo", "1"]
        );
        assert_eq!(BackendOption::new("foo", None).to_args(), vec!["--foo"]);
    }
}
