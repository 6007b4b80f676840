//! Collaborator traits for the subsystems treated as out of scope for
//! this crate's control core: the command-language executor,
//! alias/hash-table lookup, path search/globbing, and terminal
//! capability control. Each has a minimal
//! but real implementation here so the crate is usable standalone;
//! callers (e.g. a full `kaish` reimplementation) can substitute their
//! own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kaish_ctl_types::ExitStatus;

use crate::error::BuiltinError;

/// Runs a parsed command line, the analogue of the original's
/// `exec_wcs` entry point.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn exec_wcs(&mut self, command: &str) -> Result<ExitStatus, BuiltinError>;
}

/// An executor that can't actually run anything — used where a real
/// parser/interpreter collaborator hasn't been wired up yet, but the
/// trait object is still needed (e.g. standalone tests of the builtins
/// in this crate).
#[derive(Debug, Default)]
pub struct NullExecutor;

#[async_trait]
impl Executor for NullExecutor {
    async fn exec_wcs(&mut self, command: &str) -> Result<ExitStatus, BuiltinError> {
        Err(BuiltinError::system(
            "exec",
            "run command",
            format!("no command executor configured: {command}"),
        ))
    }
}

/// Opaque alias name → expansion text store.
pub trait AliasTable: Send + Sync {
    fn get(&self, name: &str) -> Option<&str>;
    fn set(&mut self, name: &str, value: &str);
    fn remove(&mut self, name: &str) -> Option<String>;
    fn names(&self) -> Vec<&str>;
}

/// A plain in-memory alias table — real enough to use, thin enough that
/// the engineering weight stays in the in-scope subsystems.
#[derive(Debug, Default)]
pub struct SimpleAliasTable(HashMap<String, String>);

impl SimpleAliasTable {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AliasTable for SimpleAliasTable {
    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn set(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

/// Resolves a bare command name to an executable path by walking `PATH`.
pub trait PathSearch: Send + Sync {
    fn search(&self, command: &str) -> Option<PathBuf>;
}

#[derive(Debug, Default)]
pub struct EnvPathSearch;

impl PathSearch for EnvPathSearch {
    fn search(&self, command: &str) -> Option<PathBuf> {
        if command.contains('/') {
            let path = Path::new(command);
            return path.is_file().then(|| path.to_path_buf());
        }
        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var)
            .map(|dir| dir.join(command))
            .find(|candidate| candidate.is_file())
    }
}

/// Terminal capability control: foreground process-group transfer and
/// raw-mode toggling.
pub trait Terminal: Send + Sync {
    fn set_foreground_pgrp(&self, pgid: i32) -> Result<(), BuiltinError>;
    fn raw_mode(&mut self, on: bool) -> Result<(), BuiltinError>;
}

/// Drives the real controlling terminal via `nix::unistd::tcsetpgrp`
/// and `nix::sys::termios`.
#[derive(Debug, Default)]
pub struct StdinTerminal {
    saved: Option<nix::sys::termios::Termios>,
}

impl Terminal for StdinTerminal {
    /// Transfers the controlling terminal's foreground process group,
    /// bracketed with SIGTTOU blocked.
    fn set_foreground_pgrp(&self, pgid: i32) -> Result<(), BuiltinError> {
        use nix::sys::signal::{self, SigSet, Signal};
        use nix::unistd::Pid;

        let mut block = SigSet::empty();
        block.add(Signal::SIGTTOU);
        let mut prior = SigSet::empty();
        signal::sigprocmask(signal::SigmaskHow::SIG_BLOCK, Some(&block), Some(&mut prior))
            .map_err(|e| BuiltinError::system("fg", "block SIGTTOU", e.to_string()))?;

        let result = nix::unistd::tcsetpgrp(
            std::io::stdin(),
            Pid::from_raw(pgid),
        );

        signal::sigprocmask(signal::SigmaskHow::SIG_SETMASK, Some(&prior), None)
            .map_err(|e| BuiltinError::system("fg", "restore signal mask", e.to_string()))?;

        result.map_err(|e| BuiltinError::system("fg", "tcsetpgrp", e.to_string()))
    }

    fn raw_mode(&mut self, on: bool) -> Result<(), BuiltinError> {
        use nix::sys::termios;

        if on {
            let original = termios::tcgetattr(std::io::stdin())
                .map_err(|e| BuiltinError::system("terminal", "tcgetattr", e.to_string()))?;
            let mut raw = original.clone();
            termios::cfmakeraw(&mut raw);
            termios::tcsetattr(std::io::stdin(), termios::SetArg::TCSANOW, &raw)
                .map_err(|e| BuiltinError::system("terminal", "tcsetattr", e.to_string()))?;
            self.saved = Some(original);
        } else if let Some(original) = self.saved.take() {
            termios::tcsetattr(std::io::stdin(), termios::SetArg::TCSANOW, &original)
                .map_err(|e| BuiltinError::system("terminal", "tcsetattr", e.to_string()))?;
        }
        Ok(())
    }
}
