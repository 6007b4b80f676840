//! The default [`Executor`] collaborator: runs a command line as a
//! foreground external process in its own process group, so job
//! control can track it, using `tokio::process::Command` to spawn and
//! await it. Full shell-language parsing is out of scope here — the
//! real command-language parser and executor sit behind the
//! [`Executor`] trait; this implementation just splits on whitespace.

use async_trait::async_trait;
use kaish_ctl_types::{ExitStatus, SignalNum};
use tokio::process::Command;

use kaish_ctl_builtins::error::BuiltinError;
use kaish_ctl_builtins::traits::Executor;

/// Splits on whitespace and spawns directly — a minimal stand-in for
/// the real shell-language parser, adequate for exercising job control
/// end to end without depending on a full grammar.
#[derive(Debug, Default)]
pub struct ExternalExecutor;

#[async_trait]
impl Executor for ExternalExecutor {
    async fn exec_wcs(&mut self, command: &str) -> Result<ExitStatus, BuiltinError> {
        let mut words = command.split_whitespace();
        let Some(program) = words.next() else {
            return Ok(ExitStatus::Exited(0));
        };

        let mut cmd = Command::new(program);
        cmd.args(words);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.as_std_mut().process_group(0);
        }

        let status = cmd
            .status()
            .await
            .map_err(|e| BuiltinError::not_found("exec", format!("{program}: {e}")))?;

        Ok(match status.code() {
            Some(code) => ExitStatus::Exited(code),
            None => {
                #[cfg(unix)]
                {
                    use std::os::unix::process::ExitStatusExt;
                    ExitStatus::Signaled(SignalNum::new(status.signal().unwrap_or(0)))
                }
                #[cfg(not(unix))]
                {
                    ExitStatus::Exited(-1)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn true_exits_zero() {
        let mut exec = ExternalExecutor::default();
        let status = exec.exec_wcs("true").await.unwrap();
        assert_eq!(status, ExitStatus::Exited(0));
    }

    #[tokio::test]
    async fn empty_command_is_a_no_op_success() {
        let mut exec = ExternalExecutor::default();
        let status = exec.exec_wcs("   ").await.unwrap();
        assert_eq!(status, ExitStatus::Exited(0));
    }
}
