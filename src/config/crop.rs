//! Crop configuration

use super::{AspectRatio, DEFAULT_QUALITY, InvalidConfig, OutputLocation, Result, validate_quality};
use serde::{Deserialize, Serialize};

/// Configuration handed to the crop service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropConfig {
    width: u32,
    height: u32,
    quality: u8,
    circle: bool,
    aspect: AspectRatio,
    output: OutputLocation,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            quality: DEFAULT_QUALITY,
            circle: false,
            aspect: AspectRatio::square(),
            output: OutputLocation::default(),
        }
    }
}

impl CropConfig {
    #[must_use]
    pub fn builder() -> CropConfigBuilder {
        CropConfigBuilder {
            config: Self::default(),
        }
    }

    /// Builder seeded with every field of this config
    #[must_use]
    pub fn rebuild(&self) -> CropConfigBuilder {
        CropConfigBuilder {
            config: self.clone(),
        }
    }

    /// Output width in pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn quality(&self) -> u8 {
        self.quality
    }

    /// Whether the crop uses a circular mask
    #[must_use]
    pub const fn circle(&self) -> bool {
        self.circle
    }

    #[must_use]
    pub const fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    #[must_use]
    pub const fn output(&self) -> &OutputLocation {
        &self.output
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(InvalidConfig::new(
                "crop.size",
                format!("must be positive, got {}x{}", self.width, self.height),
            ));
        }
        validate_quality("crop.quality", self.quality)?;
        self.aspect.validate("crop.aspect")
    }
}

/// Two-phase builder for [`CropConfig`]
#[derive(Debug, Clone)]
pub struct CropConfigBuilder {
    config: CropConfig,
}

impl CropConfigBuilder {
    /// Set the output size in pixels
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    #[must_use]
    pub const fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality;
        self
    }

    #[must_use]
    pub const fn circle(mut self, circle: bool) -> Self {
        self.config.circle = circle;
        self
    }

    #[must_use]
    pub const fn aspect(mut self, aspect: AspectRatio) -> Self {
        self.config.aspect = aspect;
        self
    }

    #[must_use]
    pub fn output(mut self, output: OutputLocation) -> Self {
        self.config.output = output;
        self
    }

    /// Validate and freeze
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] if a target dimension is zero, quality exceeds
    /// 100 or an aspect component is zero.
    pub fn build(self) -> Result<CropConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
