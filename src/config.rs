use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

use chrono_tz::Tz;

/// System timezone, detected once per process.
static DETECTED_TIMEZONE: Lazy<String> =
    Lazy::new(|| iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string()));

fn default_row_height() -> u16 {
    1
}

fn default_slot_width() -> u16 {
    14
}

fn default_overscan() -> usize {
    5
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// IANA timezone name. Detected from the system when unset.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Grid row height in terminal cells
    #[serde(default = "default_row_height")]
    pub row_height: u16,
    /// Width of one 30-minute slot in terminal cells
    #[serde(default = "default_slot_width")]
    pub slot_width: u16,
    /// Extra rows/columns rendered beyond the viewport on each side
    #[serde(default = "default_overscan")]
    pub overscan: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            row_height: default_row_height(),
            slot_width: default_slot_width(),
            overscan: default_overscan(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, anyhow::Error> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "tvgrid", "tvgrid") {
            let config_path = proj_dirs.config_dir().join("config.json");
            if config_path.exists() {
                let content = fs::read_to_string(config_path)?;
                let config: AppConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(AppConfig::default())
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "tvgrid", "tvgrid") {
            let config_dir = proj_dirs.config_dir();
            fs::create_dir_all(config_dir)?;
            let config_path = config_dir.join("config.json");
            let content = serde_json::to_string_pretty(self)?;
            fs::write(config_path, content)?;
        }
        Ok(())
    }

    pub fn get_user_timezone(&self) -> String {
        if let Some(tz) = &self.timezone {
            return tz.clone();
        }
        DETECTED_TIMEZONE.clone()
    }

    /// Parsed user timezone, falling back to UTC on an invalid name.
    pub fn user_tz(&self) -> Tz {
        Tz::from_str(&self.get_user_timezone()).unwrap_or(chrono_tz::UTC)
    }

    pub fn set_timezone(&mut self, tz: String) {
        self.timezone = Some(tz);
        let _ = self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_timezone_wins_over_detection() {
        let config = AppConfig {
            timezone: Some("Europe/Berlin".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.get_user_timezone(), "Europe/Berlin");
        assert_eq!(config.user_tz(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn invalid_timezone_falls_back_to_utc() {
        let config = AppConfig {
            timezone: Some("Not/AZone".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.user_tz(), chrono_tz::UTC);
    }

    #[test]
    fn defaults_survive_partial_config() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.row_height, 1);
        assert_eq!(config.slot_width, 14);
        assert_eq!(config.overscan, 5);
    }
}
