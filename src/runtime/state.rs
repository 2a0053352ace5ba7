//! The single persisted value: the last music folder the user picked.
//!
//! Stored as a tiny TOML file under the XDG data dir. Absence is normal
//! (first run) and unreadable content falls back to defaults; state is
//! written whenever the user picks a new folder.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub music_folder: Option<String>,
}

/// Resolve the state path from `FERMATA_STATE_PATH` or XDG defaults.
pub fn resolve_state_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("FERMATA_STATE_PATH") {
        return Some(PathBuf::from(p));
    }
    default_state_path()
}

/// `$XDG_DATA_HOME/fermata/state.toml` or `~/.local/share/fermata/state.toml`.
pub fn default_state_path() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".local").join("share"))
    } else {
        None
    };

    data_home.map(|d| d.join("fermata").join("state.toml"))
}

pub fn load() -> PersistedState {
    match resolve_state_path() {
        Some(path) => load_from(&path),
        None => PersistedState::default(),
    }
}

pub fn load_from(path: &Path) -> PersistedState {
    match fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw).unwrap_or_else(|e| {
            log::debug!("ignoring unreadable state file {}: {e}", path.display());
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

pub fn save(state: &PersistedState) -> std::io::Result<()> {
    match resolve_state_path() {
        Some(path) => save_to(&path, state),
        None => Ok(()),
    }
}

pub fn save_to(path: &Path, state: &PersistedState) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = toml::to_string_pretty(state).map_err(std::io::Error::other)?;
    fs::write(path, raw)
}
