//! TOML-based engine configuration.
//!
//! Stores the tunables of the scheduling engine and the write coordinator:
//! - Layout scale and block heights
//! - Sub-timeline canvas
//! - Minimum gap size
//! - Batch size and flush interval
//!
//! Configuration is stored at `~/.config/dayplan/config.toml`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::batch::BatchConfig;
use crate::error::ConfigError;
use crate::schedule::{
    GapFinder, LayoutConfig, LayoutEngine, SubLayoutConfig, DEFAULT_MIN_GAP_MINUTES,
};

/// Gap detection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapConfig {
    #[serde(default = "default_min_gap_minutes")]
    pub min_gap_minutes: i64,
}

fn default_min_gap_minutes() -> i64 {
    DEFAULT_MIN_GAP_MINUTES
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            min_gap_minutes: default_min_gap_minutes(),
        }
    }
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/dayplan/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub sub_layout: SubLayoutConfig,
    #[serde(default)]
    pub gaps: GapConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// `~/.config/dayplan`, or `~/.config/dayplan-dev` when `DAYPLAN_ENV=dev`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config");

    let env = std::env::var("DAYPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    Ok(if env == "dev" {
        base_dir.join("dayplan-dev")
    } else {
        base_dir.join("dayplan")
    })
}

impl EngineConfig {
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing the defaults there if no
    /// file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// `InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("layout.pixels_per_minute", self.layout.pixels_per_minute)?;
        non_negative("layout.min_block_height_px", self.layout.min_block_height_px)?;
        non_negative("layout.inter_block_gap_px", self.layout.inter_block_gap_px)?;
        non_negative("layout.expanded_extra_height", self.layout.expanded_extra_height)?;
        positive("sub_layout.canvas_height_px", self.sub_layout.canvas_height_px)?;
        non_negative("sub_layout.min_block_height_px", self.sub_layout.min_block_height_px)?;
        at_least("sub_layout.marker_interval_minutes", self.sub_layout.marker_interval_minutes, 1)?;
        at_least("gaps.min_gap_minutes", self.gaps.min_gap_minutes, 0)?;
        at_least(
            "batch.batch_size",
            i64::try_from(self.batch.batch_size).unwrap_or(i64::MAX),
            1,
        )
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))
    }

    pub fn gap_finder(&self) -> GapFinder {
        GapFinder::new().with_min_gap(self.gaps.min_gap_minutes)
    }

    /// Layout engine honoring both the layout and gap settings.
    pub fn layout_engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.layout.clone()).with_gap_finder(self.gap_finder())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match get_json_value_by_path(&json, key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, parsed to the type of the current
    /// value. Does not save.
    ///
    /// # Errors
    ///
    /// `UnknownKey` for a key that does not exist, `InvalidValue` when the
    /// value does not parse or does not fit the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            collect_leaves(&json, "", &mut out);
        }
        out
    }
}

fn positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{value} must be greater than 0"),
        })
    }
}

fn non_negative(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{value} must not be negative"),
        })
    }
}

fn at_least(key: &str, value: i64, min: i64) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{value} must be at least {min}"),
        })
    }
}

fn get_json_value_by_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(root: &mut Value, key: &str, value: &str) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        return Err(unknown());
    }

    let mut current = root;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        current = current.get_mut(part).ok_or_else(unknown)?;
    }

    let obj = current.as_object_mut().ok_or_else(unknown)?;
    let existing = obj.get(leaf).ok_or_else(unknown)?;

    let new_value = match existing {
        Value::Bool(_) => Value::Bool(value.parse::<bool>().map_err(|e| invalid(e.to_string()))?),
        Value::Number(_) => {
            if let Ok(n) = value.parse::<i64>() {
                Value::Number(n.into())
            } else {
                value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
            }
        }
        Value::Object(_) | Value::Array(_) => {
            serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
        }
        _ => Value::String(value.into()),
    };

    obj.insert(leaf.to_string(), new_value);
    Ok(())
}

fn collect_leaves(value: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                collect_leaves(v, &key, out);
            }
        }
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
