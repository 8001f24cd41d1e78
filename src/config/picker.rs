//! Picker (session) configuration and the rebuild merge
//!
//! A [`PickerConfigBuilder`] is a base [`PickerConfig`] plus a
//! [`PickerOverrides`] record. `build()` is `base.merge(&overrides)`, so a
//! rebuilt builder with no overrides reproduces its base exactly.

use super::{CaptureConfig, CropConfig, InvalidConfig, Result};
use crate::media::{MediaFilter, MediaItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const DEFAULT_THRESHOLD: usize = 9;
const DEFAULT_SPAN_COUNT: usize = 3;

/// Presentation-only settings
///
/// Passed through to the presentation layer untouched. Colors are ARGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub toolbar_color: u32,
    pub background_color: Option<u32>,
    pub item_background_color: u32,
    pub indicator_text_color: u32,
    pub indicator_solid_color: u32,
    pub indicator_border_checked_color: u32,
    pub indicator_border_unchecked_color: u32,
    pub toolbar_scrollable: bool,
    pub fab_scrollable: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        const ACCENT: u32 = 0xff64_b6f6;
        const WHITE: u32 = 0xffff_ffff;

        Self {
            toolbar_color: ACCENT,
            background_color: None,
            item_background_color: WHITE,
            indicator_text_color: WHITE,
            indicator_solid_color: ACCENT,
            indicator_border_checked_color: ACCENT,
            indicator_border_unchecked_color: WHITE,
            toolbar_scrollable: false,
            fab_scrollable: false,
        }
    }
}

/// Immutable session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerConfig {
    threshold: usize,
    span_count: usize,
    pick_gif: bool,
    pick_video: bool,
    capture: Option<CaptureConfig>,
    crop: Option<CropConfig>,
    picked: Vec<MediaItem>,
    appearance: Appearance,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            span_count: DEFAULT_SPAN_COUNT,
            pick_gif: false,
            pick_video: false,
            capture: None,
            crop: None,
            picked: Vec::new(),
            appearance: Appearance::default(),
        }
    }
}

/// Partial configuration: every `Some` field replaces the base value
///
/// `capture` and `crop` are doubly optional so an override can clear them:
/// `Some(None)` removes the sub-config, `None` keeps the base one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerOverrides {
    pub threshold: Option<usize>,
    pub span_count: Option<usize>,
    pub pick_gif: Option<bool>,
    pub pick_video: Option<bool>,
    pub capture: Option<Option<CaptureConfig>>,
    pub crop: Option<Option<CropConfig>>,
    pub picked: Option<Vec<MediaItem>>,
    pub appearance: Option<Appearance>,
}

impl PickerOverrides {
    /// Whether no field is overridden
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PickerConfig {
    /// Builder over the default configuration
    #[must_use]
    pub fn builder() -> PickerConfigBuilder {
        PickerConfigBuilder::from_base(Self::default())
    }

    /// Builder seeded with every field of this config
    #[must_use]
    pub fn rebuild(&self) -> PickerConfigBuilder {
        PickerConfigBuilder::from_base(self.clone())
    }

    /// Apply `overrides` on top of `self` and validate the result
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] if the merged configuration is invalid.
    pub fn merge(&self, overrides: &PickerOverrides) -> Result<Self> {
        let merged = Self {
            threshold: overrides.threshold.unwrap_or(self.threshold),
            span_count: overrides.span_count.unwrap_or(self.span_count),
            pick_gif: overrides.pick_gif.unwrap_or(self.pick_gif),
            pick_video: overrides.pick_video.unwrap_or(self.pick_video),
            capture: overrides
                .capture
                .clone()
                .unwrap_or_else(|| self.capture.clone()),
            crop: overrides.crop.clone().unwrap_or_else(|| self.crop.clone()),
            picked: overrides
                .picked
                .clone()
                .unwrap_or_else(|| self.picked.clone()),
            appearance: overrides.appearance.unwrap_or(self.appearance),
        };

        merged.validated()
    }

    /// Maximum number of items a session may yield
    #[must_use]
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Grid column count
    #[must_use]
    pub const fn span_count(&self) -> usize {
        self.span_count
    }

    #[must_use]
    pub const fn pick_gif(&self) -> bool {
        self.pick_gif
    }

    #[must_use]
    pub const fn pick_video(&self) -> bool {
        self.pick_video
    }

    #[must_use]
    pub const fn capture(&self) -> Option<&CaptureConfig> {
        self.capture.as_ref()
    }

    #[must_use]
    pub const fn crop(&self) -> Option<&CropConfig> {
        self.crop.as_ref()
    }

    /// Prior selection used to seed the registry
    #[must_use]
    pub fn picked(&self) -> &[MediaItem] {
        &self.picked
    }

    #[must_use]
    pub const fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    #[must_use]
    pub const fn supports_capture(&self) -> bool {
        self.capture.is_some()
    }

    #[must_use]
    pub const fn supports_crop(&self) -> bool {
        self.crop.is_some()
    }

    /// Media filter derived from the gif/video toggles
    #[must_use]
    pub const fn media_filter(&self) -> MediaFilter {
        MediaFilter::new(self.pick_gif, self.pick_video)
    }

    /// Re-check every invariant, e.g. after deserializing a persisted config
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.threshold < 1 {
            return Err(InvalidConfig::new("threshold", "must be at least 1"));
        }
        if self.span_count < 1 {
            return Err(InvalidConfig::new("span_count", "must be at least 1"));
        }
        if let Some(capture) = &self.capture {
            capture.validate()?;
        }
        if let Some(crop) = &self.crop {
            crop.validate()?;
        }

        let distinct: HashSet<_> = self.picked.iter().map(MediaItem::locator).collect();
        if distinct.len() > self.threshold {
            return Err(InvalidConfig::new(
                "picked",
                format!(
                    "holds {} items but threshold is {}",
                    distinct.len(),
                    self.threshold
                ),
            ));
        }

        Ok(())
    }

    fn validated(mut self) -> Result<Self> {
        let mut seen = HashSet::new();
        self.picked.retain(|item| seen.insert(item.locator().clone()));
        self.validate()?;
        Ok(self)
    }
}

/// Builder for [`PickerConfig`]
#[derive(Debug, Clone)]
pub struct PickerConfigBuilder {
    base: PickerConfig,
    overrides: PickerOverrides,
}

impl PickerConfigBuilder {
    fn from_base(base: PickerConfig) -> Self {
        Self {
            base,
            overrides: PickerOverrides::default(),
        }
    }

    #[must_use]
    pub const fn threshold(mut self, threshold: usize) -> Self {
        self.overrides.threshold = Some(threshold);
        self
    }

    #[must_use]
    pub const fn span_count(mut self, span_count: usize) -> Self {
        self.overrides.span_count = Some(span_count);
        self
    }

    #[must_use]
    pub const fn pick_gif(mut self, pick_gif: bool) -> Self {
        self.overrides.pick_gif = Some(pick_gif);
        self
    }

    #[must_use]
    pub const fn pick_video(mut self, pick_video: bool) -> Self {
        self.overrides.pick_video = Some(pick_video);
        self
    }

    /// Set or clear the capture sub-config
    #[must_use]
    pub fn capture(mut self, capture: Option<CaptureConfig>) -> Self {
        self.overrides.capture = Some(capture);
        self
    }

    /// Set or clear the crop sub-config
    #[must_use]
    pub fn crop(mut self, crop: Option<CropConfig>) -> Self {
        self.overrides.crop = Some(crop);
        self
    }

    /// Seed the session with a prior selection
    #[must_use]
    pub fn picked(mut self, picked: Vec<MediaItem>) -> Self {
        self.overrides.picked = Some(picked);
        self
    }

    #[must_use]
    pub const fn appearance(mut self, appearance: Appearance) -> Self {
        self.overrides.appearance = Some(appearance);
        self
    }

    /// Fold another override record into this builder; its `Some` fields win
    #[must_use]
    pub fn overrides(mut self, other: PickerOverrides) -> Self {
        let current = &mut self.overrides;
        if other.threshold.is_some() {
            current.threshold = other.threshold;
        }
        if other.span_count.is_some() {
            current.span_count = other.span_count;
        }
        if other.pick_gif.is_some() {
            current.pick_gif = other.pick_gif;
        }
        if other.pick_video.is_some() {
            current.pick_video = other.pick_video;
        }
        if other.capture.is_some() {
            current.capture = other.capture;
        }
        if other.crop.is_some() {
            current.crop = other.crop;
        }
        if other.picked.is_some() {
            current.picked = other.picked;
        }
        if other.appearance.is_some() {
            current.appearance = other.appearance;
        }
        self
    }

    /// Overrides accumulated so far
    #[must_use]
    pub const fn pending(&self) -> &PickerOverrides {
        &self.overrides
    }

    /// Merge overrides into the base and validate
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] if `threshold` or `span_count` is below 1, a
    /// nested capture or crop config is invalid, or the seeded selection holds
    /// more distinct items than the threshold.
    pub fn build(self) -> Result<PickerConfig> {
        self.base.merge(&self.overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputLocation;
    use crate::media::{MediaKind, MediaMeta};
    use chrono::{TimeZone, Utc};

    fn full_config() -> PickerConfig {
        PickerConfig::builder()
            .threshold(4)
            .span_count(5)
            .pick_gif(true)
            .capture(Some(
                CaptureConfig::builder()
                    .output(OutputLocation::new("DCIM"))
                    .build()
                    .unwrap(),
            ))
            .crop(Some(CropConfig::builder().circle(true).build().unwrap()))
            .picked(vec![MediaItem::image("a.jpg")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = PickerConfig::builder().build().unwrap();
        assert_eq!(config.threshold(), 9);
        assert_eq!(config.span_count(), 3);
        assert!(!config.supports_capture());
        assert!(!config.supports_crop());
    }

    #[test]
    fn test_threshold_zero_rejected() {
        let err = PickerConfig::builder().threshold(0).build().unwrap_err();
        assert_eq!(err.field, "threshold");
    }

    #[test]
    fn test_span_count_zero_rejected() {
        let err = PickerConfig::builder().span_count(0).build().unwrap_err();
        assert_eq!(err.field, "span_count");
    }

    #[test]
    fn test_rebuild_identity() {
        let config = full_config();
        assert_eq!(config.rebuild().build().unwrap(), config);
        assert!(config.rebuild().pending().is_empty());
    }

    fn encoded(config: &PickerConfig) -> Vec<u8> {
        bincode::serde::encode_to_vec(config, bincode::config::standard()).unwrap()
    }

    /// Seeds carrying the fields `MediaItem` equality ignores
    fn seeds() -> Vec<MediaItem> {
        vec![
            MediaItem::image("DCIM/a.jpg")
                .with_thumbnail("thumbs/a.jpg")
                .with_meta(MediaMeta {
                    mime_type: Some("image/jpeg".into()),
                    size_bytes: 2048,
                    duration_ms: 0,
                    date_added: Utc.timestamp_opt(1_700_000_000, 0).single(),
                }),
            MediaItem::new("DCIM/b.gif", MediaKind::Gif).with_thumbnail("thumbs/b.jpg"),
            MediaItem::new("DCIM/c.mp4", MediaKind::Video).with_meta(MediaMeta {
                duration_ms: 1500,
                ..MediaMeta::default()
            }),
        ]
    }

    #[test]
    fn test_rebuild_identity_across_configs() {
        for threshold in 1..=3 {
            for pick_gif in [false, true] {
                for pick_video in [false, true] {
                    for capture in [false, true] {
                        for crop in [false, true] {
                            let config = PickerConfig::builder()
                                .threshold(threshold)
                                .pick_gif(pick_gif)
                                .pick_video(pick_video)
                                .capture(capture.then(|| {
                                    CaptureConfig::builder()
                                        .output(OutputLocation::new("DCIM"))
                                        .quality(60)
                                        .build()
                                        .unwrap()
                                }))
                                .crop(crop.then(|| {
                                    CropConfig::builder().size(320, 240).build().unwrap()
                                }))
                                .picked(seeds().into_iter().take(threshold).collect())
                                .build()
                                .unwrap();

                            let rebuilt = config.rebuild().build().unwrap();
                            let merged = config.merge(&PickerOverrides::default()).unwrap();

                            assert_eq!(encoded(&rebuilt), encoded(&config), "{config:?}");
                            assert_eq!(encoded(&merged), encoded(&config), "{config:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_rebuild_overrides_only_touched_fields() {
        let config = full_config();

        let rebuilt = config.rebuild().threshold(2).pick_video(true).build().unwrap();

        assert_eq!(rebuilt.threshold(), 2);
        assert!(rebuilt.pick_video());
        assert_eq!(rebuilt.span_count(), 5);
        assert_eq!(rebuilt.capture(), config.capture());
        assert_eq!(rebuilt.crop(), config.crop());
        assert_eq!(rebuilt.picked(), config.picked());
    }

    #[test]
    fn test_rebuild_can_clear_sub_config() {
        let config = full_config();
        let rebuilt = config.rebuild().crop(None).build().unwrap();

        assert!(!rebuilt.supports_crop());
        assert!(rebuilt.supports_capture());
    }

    #[test]
    fn test_merge_applies_override_record() {
        let base = full_config();
        let overrides = PickerOverrides {
            span_count: Some(2),
            capture: Some(None),
            ..PickerOverrides::default()
        };

        let merged = base.merge(&overrides).unwrap();

        assert_eq!(merged.span_count(), 2);
        assert!(!merged.supports_capture());
        assert_eq!(merged.threshold(), base.threshold());
    }

    #[test]
    fn test_override_record_is_validated() {
        let mut overrides = PickerOverrides::default();
        overrides.threshold = Some(0);

        let result = PickerConfig::builder().overrides(overrides).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_picked_duplicates_collapsed() {
        let config = PickerConfig::builder()
            .threshold(2)
            .picked(vec![
                MediaItem::image("a.jpg"),
                MediaItem::image("a.jpg"),
                MediaItem::image("b.jpg"),
            ])
            .build()
            .unwrap();

        assert_eq!(config.picked().len(), 2);
    }

    #[test]
    fn test_picked_over_threshold_rejected() {
        let err = PickerConfig::builder()
            .threshold(1)
            .picked(vec![MediaItem::image("a.jpg"), MediaItem::image("b.jpg")])
            .build()
            .unwrap_err();

        assert_eq!(err.field, "picked");
    }

    #[test]
    fn test_lowering_threshold_below_seed_fails_on_rebuild() {
        let config = PickerConfig::builder()
            .picked(vec![MediaItem::image("a.jpg"), MediaItem::image("b.jpg")])
            .build()
            .unwrap();

        assert!(config.rebuild().threshold(1).build().is_err());
    }
}
