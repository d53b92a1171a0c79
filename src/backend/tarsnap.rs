//! tarsnap backend
//!
//! Runs the `tarsnap` executable once per operation and maps a non-zero exit
//! status to `KeeperError::Backend`. Calls block until tarsnap exits; there
//! is no timeout.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;
use zeroize::Zeroizing;

use super::{ArchiveBackend, BackendOption};
use crate::error::{KeeperError, KeeperResult};

/// Environment variable carrying the key passphrase to tarsnap
pub const PASSPHRASE_ENV: &str = "SNAPKEEPER_PASSPHRASE";

/// Drives the tarsnap command-line tool
pub struct TarsnapBackend {
    binary: PathBuf,
    options: Vec<BackendOption>,
    ask_passphrase: bool,
    passphrase: Option<Zeroizing<String>>,
}

impl TarsnapBackend {
    /// Create a backend; `options` are passed on every call
    pub fn new(binary: impl Into<PathBuf>, options: Vec<BackendOption>) -> Self {
        Self {
            binary: binary.into(),
            options,
            ask_passphrase: false,
            passphrase: None,
        }
    }

    /// Prompt for the key passphrase once, before the first call
    pub fn ask_passphrase(mut self, ask: bool) -> Self {
        self.ask_passphrase = ask;
        self
    }

    /// Whether `-v` is among the global options
    fn is_verbose(&self) -> bool {
        self.options.iter().any(|opt| opt.key == "v")
    }

    /// Assemble the argument list: global options, then per-call arguments
    fn command_args(&self, args: Vec<OsString>) -> Vec<OsString> {
        let mut full: Vec<OsString> = self
            .options
            .iter()
            .flat_map(BackendOption::to_args)
            .map(OsString::from)
            .collect();
        if self.passphrase.is_some() {
            full.push("--passphrase".into());
            full.push(format!("env:{}", PASSPHRASE_ENV).into());
        }
        full.extend(args);
        full
    }

    fn call(&mut self, args: Vec<OsString>) -> KeeperResult<String> {
        let args = self.command_args(args);
        debug!(
            "Executing: {} {}",
            self.binary.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut command = Command::new(&self.binary);
        command.args(&args);
        if let Some(passphrase) = &self.passphrase {
            command.env(PASSPHRASE_ENV, passphrase.as_str());
        }

        let output = command.output().map_err(|e| {
            KeeperError::backend(
                "n/a",
                format!("failed to run {}: {}", self.binary.display(), e),
            )
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let status = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KeeperError::backend(
                status,
                format!("{}{}", stderr, stdout).trim_end(),
            ));
        }

        Ok(stdout)
    }
}

/// Archive names from `--list-archives` output
///
/// With `-v` each line carries a tab-separated creation date after the name.
fn parse_listing(output: &str, verbose: bool) -> Vec<String> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let name = if verbose {
                line.rsplit_once('\t').map_or(line, |(name, _)| name)
            } else {
                line
            };
            name.to_string()
        })
        .collect()
}

impl ArchiveBackend for TarsnapBackend {
    fn list_archives(&mut self) -> KeeperResult<Vec<String>> {
        let output = self.call(vec!["--list-archives".into()])?;
        Ok(parse_listing(&output, self.is_verbose()))
    }

    fn create_archive(
        &mut self,
        name: &str,
        excludes: &[String],
        sources: &[PathBuf],
        options: &[BackendOption],
    ) -> KeeperResult<()> {
        let mut args: Vec<OsString> = options
            .iter()
            .flat_map(BackendOption::to_args)
            .map(OsString::from)
            .collect();
        args.push("-c".into());
        for exclude in excludes {
            args.push("--exclude".into());
            args.push(exclude.into());
        }
        args.push("-f".into());
        args.push(name.into());
        args.extend(sources.iter().map(|s| s.as_os_str().to_owned()));

        self.call(args).map(|_| ())
    }

    fn delete_archives(&mut self, names: &[String], options: &[BackendOption]) -> KeeperResult<()> {
        let mut args: Vec<OsString> = options
            .iter()
            .flat_map(BackendOption::to_args)
            .map(OsString::from)
            .collect();
        args.push("-d".into());
        for name in names {
            args.push("-f".into());
            args.push(name.into());
        }

        self.call(args).map(|_| ())
    }

    fn authenticate_if_needed(&mut self) -> KeeperResult<()> {
        if !self.ask_passphrase || self.passphrase.is_some() {
            return Ok(());
        }

        let passphrase = rpassword::prompt_password("Passphrase for the tarsnap key: ")
            .map_err(|e| KeeperError::Io(format!("Failed to read passphrase: {}", e)))?;
        self.passphrase = Some(Zeroizing::new(passphrase));
        Ok(())
    }
}
