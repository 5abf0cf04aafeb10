//! Scheduler configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! [validation]
//! latest_end = "21:00"
//! max_name_length = 100
//! default_timezone = "UTC"
//! ```

use std::path::Path;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SlotError};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Limits applied to a draft event before any conflict check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Latest local time an event may end, inclusive.
    #[serde(default = "default_latest_end", with = "hh_mm")]
    pub latest_end: NaiveTime,

    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,

    /// Zone used when a caller does not name one.
    #[serde(default = "default_timezone")]
    pub default_timezone: Tz,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            latest_end: default_latest_end(),
            max_name_length: default_max_name_length(),
            default_timezone: default_timezone(),
        }
    }
}

fn default_latest_end() -> NaiveTime {
    NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default()
}

fn default_max_name_length() -> usize {
    100
}

fn default_timezone() -> Tz {
    Tz::UTC
}

impl SchedulerConfig {
    /// # Errors
    /// Returns `SlotError::Config` if the text is not valid TOML or a value is
    /// out of range.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SchedulerConfig =
            toml::from_str(text).map_err(|e| SlotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `SlotError::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SlotError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded scheduler config from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.validation.max_name_length == 0 {
            return Err(SlotError::Config(
                "validation.max_name_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

mod hh_mm {
    use super::*;

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(
        time: &NaiveTime,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
