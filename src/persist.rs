use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::state::{AppState, Theme};

const PREFS_DIR: &str = "epl_terminal";
const PREFS_FILE: &str = "prefs.json";
const PREFS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    pub version: u32,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub last_team: Option<String>,
    #[serde(default)]
    pub saved_at: Option<u64>,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            version: PREFS_VERSION,
            theme: Theme::default(),
            last_team: None,
            saved_at: None,
        }
    }
}

pub fn load_into_state(state: &mut AppState) {
    let Some(path) = prefs_path() else {
        return;
    };
    let Some(prefs) = load_prefs_file(&path) else {
        return;
    };
    state.theme = prefs.theme;
    if state.selected_team.is_none() {
        state.selected_team = prefs.last_team.filter(|t| !t.trim().is_empty());
    }
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = prefs_path() else {
        return;
    };
    let prefs = Prefs {
        version: PREFS_VERSION,
        theme: state.theme,
        last_team: state.selected_team.clone(),
        saved_at: system_time_to_secs(SystemTime::now()),
    };
    let _ = save_prefs_file(&path, &prefs);
}

/// Missing, unreadable or older-version files all read as "no prefs".
pub fn load_prefs_file(path: &Path) -> Option<Prefs> {
    let raw = fs::read_to_string(path).ok()?;
    let prefs = serde_json::from_str::<Prefs>(&raw).ok()?;
    if prefs.version != PREFS_VERSION {
        return None;
    }
    Some(prefs)
}

/// Writes through a temp file and a rename so a crash never leaves half a file behind.
pub fn save_prefs_file(path: &Path, prefs: &Prefs) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(prefs)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn prefs_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(PREFS_DIR).join(PREFS_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(PREFS_DIR)
            .join(PREFS_FILE),
    )
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "epl_terminal_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn prefs_survive_a_save_and_load() {
        let dir = scratch_dir("prefs");
        let path = dir.join(PREFS_FILE);
        let prefs = Prefs {
            theme: Theme::Light,
            last_team: Some("Newcastle United".to_string()),
            ..Prefs::default()
        };
        save_prefs_file(&path, &prefs).unwrap();
        assert_eq!(load_prefs_file(&path), Some(prefs));
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn old_or_garbled_files_are_ignored() {
        let dir = scratch_dir("garbled");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(PREFS_FILE);
        assert_eq!(load_prefs_file(&path), None);

        fs::write(&path, "{not json").unwrap();
        assert_eq!(load_prefs_file(&path), None);

        fs::write(&path, r#"{"version":0,"theme":"light"}"#).unwrap();
        assert_eq!(load_prefs_file(&path), None);
        let _ = fs::remove_dir_all(&dir);
    }
}
