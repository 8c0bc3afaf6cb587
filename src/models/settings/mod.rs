// Settings module
// Grid and scheduling parameters, persisted as TOML

use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::models::event::{is_hex_color, DEFAULT_EVENT_COLOR};

/// Environment variable overriding the settings file location
pub const CONFIG_ENV_VAR: &str = "FOCUS_CALENDAR_CONFIG";
const LOCAL_CONFIG_FILE: &str = "focus-calendar.toml";

/// How task schedules are written back to the task store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFormat {
    /// Local `scheduledDate` + `HH:MM` strings only
    #[default]
    Legacy,
    /// Legacy fields plus UTC start/end instants
    Utc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minute granularity dragged times are rounded to (5 or 15)
    pub snap_minutes: u32,
    /// Pixel height of one hour cell
    pub hour_height_px: f32,
    /// Minimum rendered duration for short or zero-length events
    pub min_visual_minutes: u32,
    /// Gestures shorter than this are treated as clicks
    pub min_gesture_minutes: u32,
    /// Pointer travel below this is treated as a click
    pub click_threshold_px: f32,
    /// Distance from the viewport edge that triggers auto-scroll
    pub auto_scroll_edge_px: f32,
    /// Scroll increment applied per frame while auto-scrolling
    pub auto_scroll_step_px: f32,
    /// Duration given to timed items that have no end
    pub default_event_minutes: u32,
    pub default_color: String,
    pub field_format: FieldFormat,
    /// 0 = Sunday, 1 = Monday, etc.
    pub first_day_of_week: u8,
    pub database_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snap_minutes: 15,
            hour_height_px: 60.0,
            min_visual_minutes: 30,
            min_gesture_minutes: 15,
            click_threshold_px: 10.0,
            auto_scroll_edge_px: 100.0,
            auto_scroll_step_px: 20.0,
            default_event_minutes: 60,
            default_color: DEFAULT_EVENT_COLOR.to_string(),
            field_format: FieldFormat::Legacy,
            first_day_of_week: 0,
            database_path: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.snap_minutes == 0 || 60 % self.snap_minutes != 0 {
            return Err(SettingsError::Invalid(format!(
                "snap_minutes must divide 60, got {}",
                self.snap_minutes
            )));
        }

        if !(self.hour_height_px > 0.0) {
            return Err(SettingsError::Invalid(
                "hour_height_px must be positive".to_string(),
            ));
        }

        if self.click_threshold_px < 0.0 || self.auto_scroll_edge_px < 0.0 {
            return Err(SettingsError::Invalid(
                "pixel thresholds cannot be negative".to_string(),
            ));
        }

        if self.default_event_minutes == 0 {
            return Err(SettingsError::Invalid(
                "default_event_minutes must be positive".to_string(),
            ));
        }

        if !is_hex_color(&self.default_color) {
            return Err(SettingsError::Invalid(
                "default_color must be in hex format (#RRGGBB or #RGB)".to_string(),
            ));
        }

        if self.first_day_of_week > 6 {
            return Err(SettingsError::Invalid(
                "first_day_of_week must be between 0 and 6".to_string(),
            ));
        }

        Ok(())
    }

    pub fn min_visual_duration(&self) -> Duration {
        Duration::minutes(self.min_visual_minutes as i64)
    }

    pub fn min_gesture_duration(&self) -> Duration {
        Duration::minutes(self.min_gesture_minutes as i64)
    }

    pub fn default_event_duration(&self) -> Duration {
        Duration::minutes(self.default_event_minutes as i64)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "FocusCalendar", "FocusCalendar")
    }

    /// Resolve the settings file: env var, then the working directory,
    /// then the platform config directory.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(env_path));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }

        let dirs = Self::project_dirs().ok_or(SettingsError::NoConfigDir)?;
        Ok(dirs.config_dir().join("settings.toml"))
    }

    /// Database location: explicit setting, else the platform data dir
    pub fn resolve_database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }

        match Self::project_dirs() {
            Some(dirs) => dirs.data_dir().join("focus-calendar.db"),
            None => {
                log::warn!("Unable to resolve project directory; using current dir for database");
                PathBuf::from("focus-calendar.db")
            }
        }
    }

    /// Load from the default path, falling back to defaults when absent
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            log::info!("No settings file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, format!("# focus-calendar settings\n\n{content}"))?;
        Ok(())
    }
}
