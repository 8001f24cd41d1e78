//! Camera capture configuration

use super::{AspectRatio, DEFAULT_QUALITY, InvalidConfig, OutputLocation, Result, validate_quality};
use serde::{Deserialize, Serialize};

/// Configuration handed to the capture device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    quality: u8,
    video_record: bool,
    max_duration_ms: Option<u64>,
    min_duration_ms: Option<u64>,
    output: OutputLocation,
    aspect: AspectRatio,
    full_screen: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            video_record: false,
            max_duration_ms: Some(15_000),
            min_duration_ms: Some(1_000),
            output: OutputLocation::default(),
            aspect: AspectRatio::new(16, 9),
            full_screen: false,
        }
    }
}

impl CaptureConfig {
    /// Start from the defaults
    #[must_use]
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder {
            config: Self::default(),
        }
    }

    /// Builder seeded with every field of this config
    #[must_use]
    pub fn rebuild(&self) -> CaptureConfigBuilder {
        CaptureConfigBuilder {
            config: self.clone(),
        }
    }

    #[must_use]
    pub const fn quality(&self) -> u8 {
        self.quality
    }

    /// Whether the device may record video as well as stills
    #[must_use]
    pub const fn video_record(&self) -> bool {
        self.video_record
    }

    #[must_use]
    pub const fn max_duration_ms(&self) -> Option<u64> {
        self.max_duration_ms
    }

    #[must_use]
    pub const fn min_duration_ms(&self) -> Option<u64> {
        self.min_duration_ms
    }

    #[must_use]
    pub const fn output(&self) -> &OutputLocation {
        &self.output
    }

    #[must_use]
    pub const fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    #[must_use]
    pub const fn full_screen(&self) -> bool {
        self.full_screen
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_quality("capture.quality", self.quality)?;
        self.aspect.validate("capture.aspect")?;

        match (self.min_duration_ms, self.max_duration_ms) {
            (Some(min), Some(max)) if min > max => Err(InvalidConfig::new(
                "capture.min_duration_ms",
                format!("must not exceed max_duration_ms ({min} > {max})"),
            )),
            _ => Ok(()),
        }
    }
}

/// Two-phase builder for [`CaptureConfig`]
#[derive(Debug, Clone)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    #[must_use]
    pub const fn quality(mut self, quality: u8) -> Self {
        self.config.quality = quality;
        self
    }

    #[must_use]
    pub const fn video_record(mut self, enabled: bool) -> Self {
        self.config.video_record = enabled;
        self
    }

    #[must_use]
    pub const fn max_duration_ms(mut self, max: Option<u64>) -> Self {
        self.config.max_duration_ms = max;
        self
    }

    #[must_use]
    pub const fn min_duration_ms(mut self, min: Option<u64>) -> Self {
        self.config.min_duration_ms = min;
        self
    }

    #[must_use]
    pub fn output(mut self, output: OutputLocation) -> Self {
        self.config.output = output;
        self
    }

    #[must_use]
    pub const fn aspect(mut self, aspect: AspectRatio) -> Self {
        self.config.aspect = aspect;
        self
    }

    #[must_use]
    pub const fn full_screen(mut self, full_screen: bool) -> Self {
        self.config.full_screen = full_screen;
        self
    }

    /// Validate and freeze
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] if quality exceeds 100, an aspect component is
    /// zero, or the minimum duration exceeds the maximum.
    pub fn build(self) -> Result<CaptureConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CaptureConfig::builder().build().unwrap();
        assert_eq!(config.quality(), 80);
        assert_eq!(config.max_duration_ms(), Some(15_000));
        assert!(!config.video_record());
    }

    #[test]
    fn test_quality_out_of_range() {
        let err = CaptureConfig::builder().quality(120).build().unwrap_err();
        assert_eq!(err.field, "capture.quality");
    }

    #[test]
    fn test_min_duration_above_max() {
        let result = CaptureConfig::builder()
            .min_duration_ms(Some(5_000))
            .max_duration_ms(Some(2_000))
            .build();
        assert!(result.is_err());

        let open_ended = CaptureConfig::builder()
            .min_duration_ms(Some(5_000))
            .max_duration_ms(None)
            .build();
        assert!(open_ended.is_ok());
    }

    #[test]
    fn test_rebuild_overrides_single_field() {
        let original = CaptureConfig::builder()
            .quality(60)
            .output(OutputLocation::new("DCIM/app"))
            .full_screen(true)
            .build()
            .unwrap();

        let rebuilt = original.rebuild().video_record(true).build().unwrap();

        assert!(rebuilt.video_record());
        assert_eq!(rebuilt.quality(), 60);
        assert_eq!(rebuilt.output(), original.output());
        assert!(rebuilt.full_screen());
    }

    #[test]
    fn test_rebuild_identity() {
        let original = CaptureConfig::builder().quality(33).build().unwrap();
        assert_eq!(original.rebuild().build().unwrap(), original);
    }
}
