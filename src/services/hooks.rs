//! Job hooks
//!
//! `exec_before`, `exec_after` and `on_success` are shell commands run around
//! a job's backup.

use std::process::Command;

use tracing::debug;

use crate::error::{KeeperError, KeeperResult};

/// Runs hook commands
pub trait HookRunner {
    fn run(&mut self, command: &str) -> KeeperResult<()>;
}

/// Runs hooks through `sh -c`, inheriting stdio
#[derive(Debug, Default)]
pub struct ShellHooks;

impl HookRunner for ShellHooks {
    fn run(&mut self, command: &str) -> KeeperResult<()> {
        debug!("Executing: {}", command);

        let status = Command::new("sh").arg("-c").arg(command).status()?;
        if !status.success() {
            return Err(KeeperError::Hook {
                command: command.to_string(),
                status: status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
            });
        }
        Ok(())
    }
}

/// Records hook commands instead of running them
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub commands: Vec<String>,
}

#[cfg(test)]
impl HookRunner for RecordingHooks {
    fn run(&mut self, command: &str) -> KeeperResult<()> {
        self.commands.push(command.to_string());
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_successful_hook() {
        assert!(ShellHooks.run("true").is_ok());
    }

    #[test]
    fn test_failing_hook() {
        let err = ShellHooks.run("exit 3").unwrap_err();
        assert!(matches!(err, KeeperError::Hook { ref status, .. } if status == "3"));
    }
}
