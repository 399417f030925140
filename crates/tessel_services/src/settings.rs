//! Settings management
//!
//! Engine settings persisted as JSON. Every section defaults, so a file only
//! needs the keys it changes.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use tessel_core::time::{MAX_STEPS_PER_FRAME, TICK_RATE_HZ};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not access settings file: {0}")]
    Io(#[from] io::Error),

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub render: RenderSettings,
    pub time: TimeSettings,
    pub world: WorldSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub min_size: Option<(u32, u32)>,
    pub max_size: Option<(u32, u32)>,
    pub resizable: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Tessel".to_string(),
            width: 1280,
            height: 720,
            min_size: None,
            max_size: None,
            resizable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub max_batches: usize,
    pub max_quads_per_batch: usize,
    /// RGBA, 0.0..=1.0
    pub clear_colour: [f32; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_batches: 32,
            max_quads_per_batch: 1024,
            clear_colour: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSettings {
    pub tick_rate_hz: u32,
    pub max_steps_per_frame: u32,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: TICK_RATE_HZ,
            max_steps_per_frame: MAX_STEPS_PER_FRAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Slots in each component storage.
    pub max_entities: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self { max_entities: 1024 }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json_str(&json)?;
                info!(path = %path.display(), "settings loaded");
                Ok(settings)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        self.validate()?;
        fs::write(path.as_ref(), self.to_json_string()?)?;
        debug!(path = %path.as_ref().display(), "settings saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let checks = [
            (self.window.width == 0, "window.width"),
            (self.window.height == 0, "window.height"),
            (self.render.max_batches == 0, "render.max_batches"),
            (self.render.max_quads_per_batch == 0, "render.max_quads_per_batch"),
            (self.time.tick_rate_hz == 0, "time.tick_rate_hz"),
            (self.time.max_steps_per_frame == 0, "time.max_steps_per_frame"),
            (self.world.max_entities == 0, "world.max_entities"),
        ];
        if let Some((_, field)) = checks.iter().find(|(zero, _)| *zero) {
            return Err(SettingsError::Invalid {
                field,
                reason: "must be greater than zero",
            });
        }
        let bounds = [
            (self.window.min_size, "window.min_size"),
            (self.window.max_size, "window.max_size"),
        ];
        for (size, field) in bounds {
            if matches!(size, Some((w, h)) if w == 0 || h == 0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: "dimensions must be greater than zero",
                });
            }
        }
        if let (Some(min), Some(max)) = (self.window.min_size, self.window.max_size) {
            if min.0 > max.0 || min.1 > max.1 {
                return Err(SettingsError::Invalid {
                    field: "window.min_size",
                    reason: "exceeds window.max_size",
                });
            }
        }
        Ok(())
    }
}
