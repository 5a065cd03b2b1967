//! Scheduler settings.
//!
//! Read from `--config PATH`, otherwise from `settings.json` in the OS config
//! directory. A missing file means defaults; a malformed one is an error.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{GanttError, Result};

/// What to do when a reference cycle has to be broken.
///
/// Either way the fallback dates are used and a diagnostic is recorded; the
/// policy only picks how loudly it is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    #[default]
    Warn,
    Silent,
}

/// Persisted scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed default start date. When unset, "today" is the anchor.
    pub anchor_date: Option<NaiveDate>,
    /// Joins project and row name in grouping keys.
    pub group_separator: String,
    /// How far before its finish an unsplit bar is drawn to end.
    pub bar_gap_hours: u32,
    pub cycle_policy: CyclePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anchor_date: None,
            group_separator: " | ".into(),
            bar_gap_hours: 4,
            cycle_policy: CyclePolicy::Warn,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file; using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from an explicit path or the OS config directory.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(GanttError::Config(format!(
                        "settings file not found: {}",
                        path.display()
                    )));
                }
                Self::load(path)
            }
            None => Self::load(&Self::default_path()),
        }
    }

    /// `settings.json` in the per-user config directory.
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "GanttScheduler") {
            proj_dirs.config_dir().join("settings.json")
        } else {
            PathBuf::from("settings.json")
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.bar_gap_hours >= 24 {
            return Err(GanttError::Config(format!(
                "bar_gap_hours must be below 24, got {}",
                self.bar_gap_hours
            )));
        }
        if self.group_separator.is_empty() {
            return Err(GanttError::Config("group_separator must not be empty".into()));
        }
        Ok(())
    }

    /// Anchor for tasks with neither predecessor nor manual start.
    pub fn anchor(&self, today: NaiveDate) -> NaiveDate {
        self.anchor_date.unwrap_or(today)
    }
}
