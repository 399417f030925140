//! Tessel Services Layer
//!
//! Engine-wide configuration

pub mod settings;

pub use settings::{
    RenderSettings, Settings, SettingsError, TimeSettings, WindowSettings, WorldSettings,
};
