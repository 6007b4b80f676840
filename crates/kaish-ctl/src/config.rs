//! XDG-resolved configuration, following the platform's standard
//! config/data directory layout and parsed with `serde` + `toml`.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;

/// Default vi-vs-emacs editing mode, matching `kaish_ctl_edit::fsm::Mode`
/// without introducing a dependency cycle between config and the editor
/// crate — the string is mapped onto `Mode` by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    Emacs,
    Vi,
}

impl Default for EditMode {
    fn default() -> Self {
        EditMode::Emacs
    }
}

/// The shell's persisted configuration: history
/// file path and cap, default editing mode, kill-ring capacity
/// override, completion script directory, and the asynchronous
/// notification toggle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history_file: Option<PathBuf>,
    pub history_max_entries: usize,
    pub edit_mode: EditMode,
    pub kill_ring_capacity: Option<usize>,
    pub completion_dir: Option<PathBuf>,
    pub async_notify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: None,
            history_max_entries: 1000,
            edit_mode: EditMode::default(),
            kill_ring_capacity: None,
            completion_dir: None,
            async_notify: true,
        }
    }
}

impl Config {
    /// Loads `config.toml` from the XDG config directory, falling back
    /// to defaults when the file is absent.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_dir().join("config.toml");
        Self::load_from(&path)
    }

    /// Loads from an explicit path — used by tests and `--config`.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Resolves the history file path, defaulting under the XDG data
    /// directory when not set explicitly.
    pub fn resolved_history_file(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| data_dir().join("history"))
    }
}

/// `$XDG_CONFIG_HOME/kaish-ctl` or `~/.config/kaish-ctl`.
pub fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| dirs_fallback().join(".config"))
        .join("kaish-ctl")
}

/// `$XDG_DATA_HOME/kaish-ctl` or `~/.local/share/kaish-ctl`.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| dirs_fallback().join(".local").join("share"))
        .join("kaish-ctl")
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from(Path::new("/nonexistent/kaish-ctl-config.toml")).unwrap();
        assert_eq!(cfg.history_max_entries, 1000);
        assert_eq!(cfg.edit_mode, EditMode::Emacs);
    }

    #[test]
    fn parses_a_minimal_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "edit_mode = \"vi\"\nhistory_max_entries = 500\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.edit_mode, EditMode::Vi);
        assert_eq!(cfg.history_max_entries, 500);
    }

    #[test]
    fn resolved_history_file_defaults_under_data_dir() {
        let cfg = Config::default();
        assert!(cfg.resolved_history_file().ends_with("history"));
    }
}
