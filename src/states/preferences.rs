//! Preferences
//!
//! Local UI preferences persisted as TOML in the platform config directory.
//! Only the theme is stored today:
//!
//! ```toml
//! theme = "dark"
//! ```

use crate::constants::PREFERENCES_FILE;
use crate::error::Result;
use crate::eventing::{AppEvent, EventBus};
use crate::helpers::get_or_create_config_dir;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the operating system
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// light → dark → system → light
    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
            Self::System => Self::Light,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk layout; the theme stays a plain string so unknown values load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
}

/// Persisted local preferences
#[derive(Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    mode: Arc<RwLock<ThemeMode>>,
    events: Option<EventBus>,
}

impl PreferenceStore {
    /// Load from `path`; a missing or empty file gives the defaults
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mode = read_theme(&path)?;
        info!(path = ?path, theme = %mode, "Preferences loaded");

        Ok(Self {
            path,
            mode: Arc::new(RwLock::new(mode)),
            events: None,
        })
    }

    /// Load from the platform config directory
    pub fn load_default() -> Result<Self> {
        let dir = get_or_create_config_dir()?;
        Self::load(dir.join(PREFERENCES_FILE))
    }

    /// Publish theme changes on `events`
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> ThemeMode {
        *self.mode.read()
    }

    /// Change the theme and write it to disk
    ///
    /// The new mode is applied even if the write fails.
    pub fn set_mode(&self, mode: ThemeMode) -> Result<()> {
        *self.mode.write() = mode;
        if let Some(events) = &self.events {
            events.emit(AppEvent::ThemeChanged { mode });
        }

        self.save(mode).map_err(|e| {
            error!(error = %e, path = ?self.path, "Failed to save preferences");
            e
        })?;
        info!(theme = %mode, "Theme saved");
        Ok(())
    }

    /// Advance to the next theme and persist it
    pub fn cycle_mode(&self) -> Result<ThemeMode> {
        let next = self.mode().next();
        self.set_mode(next)?;
        Ok(next)
    }

    /// Effective darkness, resolving `system` with the host preference
    pub fn is_dark(&self, system_prefers_dark: bool) -> bool {
        match self.mode() {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => system_prefers_dark,
        }
    }

    fn save(&self, mode: ThemeMode) -> Result<()> {
        let prefs = Preferences {
            theme: Some(mode.as_str().to_string()),
        };
        let value = toml::to_string(&prefs)?;
        std::fs::write(&self.path, value)?;
        Ok(())
    }
}

fn read_theme(path: &Path) -> Result<ThemeMode> {
    if !path.exists() {
        return Ok(ThemeMode::default());
    }

    let value = std::fs::read_to_string(path)?;
    if value.trim().is_empty() {
        return Ok(ThemeMode::default());
    }

    let prefs: Preferences = toml::from_str(&value).map_err(|e| {
        error!(error = %e, path = ?path, "Failed to parse preferences file");
        e
    })?;

    Ok(match prefs.theme.as_deref() {
        None => ThemeMode::default(),
        Some(theme) => ThemeMode::parse(theme).unwrap_or_else(|| {
            warn!(theme, "Unknown theme in preferences; using system");
            ThemeMode::System
        }),
    })
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("path", &self.path)
            .field("mode", &self.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_file() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("symlink-prefs-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        dir.join(PREFERENCES_FILE)
    }

    #[test]
    fn missing_or_empty_file_gives_system() {
        let path = temp_file();
        assert_eq!(PreferenceStore::load(&path).expect("load").mode(), ThemeMode::System);

        std::fs::write(&path, "  \n").expect("write");
        assert_eq!(PreferenceStore::load(&path).expect("load").mode(), ThemeMode::System);
    }

    #[test]
    fn unknown_theme_falls_back_to_system() {
        let path = temp_file();
        std::fs::write(&path, "theme = \"sepia\"\n").expect("write");

        assert_eq!(PreferenceStore::load(&path).expect("load").mode(), ThemeMode::System);
    }

    #[test]
    fn set_mode_persists_and_notifies() {
        let path = temp_file();
        let events = EventBus::new();
        let rx = events.subscribe();
        let store = PreferenceStore::load(&path).expect("load").with_events(events);

        store.set_mode(ThemeMode::Dark).expect("saved");

        assert_eq!(rx.try_recv().ok(), Some(AppEvent::ThemeChanged { mode: ThemeMode::Dark }));
        let written = std::fs::read_to_string(&path).expect("read");
        assert_eq!(written.trim(), "theme = \"dark\"");
        assert_eq!(PreferenceStore::load(&path).expect("reload").mode(), ThemeMode::Dark);
    }

    #[test]
    fn cycle_visits_every_mode() {
        let store = PreferenceStore::load(temp_file()).expect("load");

        assert_eq!(store.cycle_mode().expect("cycle"), ThemeMode::Light);
        assert_eq!(store.cycle_mode().expect("cycle"), ThemeMode::Dark);
        assert_eq!(store.cycle_mode().expect("cycle"), ThemeMode::System);
    }

    #[test]
    fn is_dark_resolves_system() {
        let store = PreferenceStore::load(temp_file()).expect("load");
        assert!(store.is_dark(true));
        assert!(!store.is_dark(false));

        store.set_mode(ThemeMode::Light).expect("saved");
        assert!(!store.is_dark(true));
    }
}
