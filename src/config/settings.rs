//! Persisted picker defaults
//!
//! Settings live in `<config_dir>/mediapick/config.toml` and can be
//! overridden per variable with `MEDIAPICK_*` environment variables
//! (`MEDIAPICK_THRESHOLD=4`, `MEDIAPICK_CAMERA__ENABLED=true`).
//! They only seed a [`PickerConfigBuilder`]; the host still re-derives the
//! final config on every launch.

use super::{
    CaptureConfig, CropConfig, DEFAULT_QUALITY, InvalidConfig, OutputLocation, PickerConfig,
    PickerConfigBuilder,
};
use ::config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "mediapick";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "MEDIAPICK";

/// Camera defaults
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CameraSettings {
    /// Offer the capture sub-flow
    pub enabled: bool,
    pub quality: u8,
    pub directory: PathBuf,
    pub authority: Option<String>,
    pub max_duration_ms: Option<u64>,
    pub min_duration_ms: Option<u64>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            quality: DEFAULT_QUALITY,
            directory: PathBuf::from("DCIM"),
            authority: None,
            max_duration_ms: Some(15_000),
            min_duration_ms: Some(1_000),
        }
    }
}

/// Crop defaults
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CropSettings {
    /// Offer the crop sub-flow
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub circle: bool,
    pub directory: PathBuf,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 500,
            height: 500,
            quality: DEFAULT_QUALITY,
            circle: false,
            directory: PathBuf::from("crops"),
        }
    }
}

/// Application settings structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PickerSettings {
    /// Default selection threshold
    pub threshold: usize,

    /// Default grid column count
    pub span_count: usize,

    pub pick_gif: bool,
    pub pick_video: bool,

    pub camera: CameraSettings,
    pub crop: CropSettings,

    /// Where suspended sessions are stored (defaults to the data directory)
    pub state_dir: Option<PathBuf>,
}

impl Default for PickerSettings {
    fn default() -> Self {
        let defaults = PickerConfig::default();
        Self {
            threshold: defaults.threshold(),
            span_count: defaults.span_count(),
            pick_gif: defaults.pick_gif(),
            pick_video: defaults.pick_video(),
            camera: CameraSettings::default(),
            crop: CropSettings::default(),
            state_dir: None,
        }
    }
}

impl PickerSettings {
    /// Get the path to the settings file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load settings from the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load settings from `path`, falling back to defaults when it is missing
    ///
    /// Environment variables prefixed with `MEDIAPICK_` take precedence over
    /// the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be parsed or a value has the
    /// wrong type.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Save settings to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the settings
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to `path`
    ///
    /// # Errors
    ///
    /// See [`PickerSettings::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Directory holding the session store
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no `state_dir` is set and the system data
    /// directory cannot be determined.
    pub fn state_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }

        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR).join("sessions"))
            .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))
    }

    /// Seed a picker builder with these defaults
    ///
    /// The sub-configs are built here, so invalid camera or crop values fail
    /// before any session starts.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] if the camera or crop settings are invalid.
    pub fn to_builder(&self) -> Result<PickerConfigBuilder, InvalidConfig> {
        let capture = if self.camera.enabled {
            let mut output = OutputLocation::new(&self.camera.directory);
            output.authority.clone_from(&self.camera.authority);

            Some(
                CaptureConfig::builder()
                    .quality(self.camera.quality)
                    .video_record(self.pick_video)
                    .max_duration_ms(self.camera.max_duration_ms)
                    .min_duration_ms(self.camera.min_duration_ms)
                    .output(output)
                    .build()?,
            )
        } else {
            None
        };

        let crop = if self.crop.enabled {
            Some(
                CropConfig::builder()
                    .size(self.crop.width, self.crop.height)
                    .quality(self.crop.quality)
                    .circle(self.crop.circle)
                    .output(OutputLocation::new(&self.crop.directory))
                    .build()?,
            )
        } else {
            None
        };

        Ok(PickerConfig::builder()
            .threshold(self.threshold)
            .span_count(self.span_count)
            .pick_gif(self.pick_gif)
            .pick_video(self.pick_video)
            .capture(capture)
            .crop(crop))
    }
}
