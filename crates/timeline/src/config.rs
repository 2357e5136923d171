use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{SnapSettings, TrackType, TimelineError};

/// Hard cap on reserved placeholder bands above and below the real rows.
pub const MAX_PLACEHOLDER_ROWS: u32 = 3;

/// Hard cap on rows padded into each configured family.
pub const MAX_MIN_ROWS_PER_FAMILY: u32 = 16;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub interaction: InteractionConfig,
    pub layout: LayoutConfig,
    pub snap: SnapSettings,
    pub zoom: ZoomConfig,
    pub playback: PlaybackConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, TimelineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zoom and rate ranges that are empty, non-positive or not finite.
    pub fn validate(&self) -> Result<(), TimelineError> {
        let zoom = &self.zoom;
        check_range("zoom", zoom.min_zoom as f64, zoom.max_zoom as f64)?;
        if !(zoom.base_frame_width.is_finite() && zoom.base_frame_width > 0.0) {
            return Err(TimelineError::InvalidConfig(format!(
                "base_frame_width must be positive, got {}",
                zoom.base_frame_width
            )));
        }
        check_range("playback rate", self.playback.min_rate, self.playback.max_rate)
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<(), TimelineError> {
    if min.is_finite() && max.is_finite() && min > 0.0 && min <= max {
        Ok(())
    } else {
        Err(TimelineError::InvalidConfig(format!(
            "{name} range [{min}, {max}] is empty or not positive"
        )))
    }
}

/// Pointer gesture tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Delay before a click on empty space commits its seek
    pub seek_delay_ms: u64,
    pub double_click_ms: u64,
    /// Auto-follow pause after a user seek
    pub follow_suppress_ms: u64,
    pub drag_threshold_px: f32,
    pub resize_handle_px: f32,
    pub auto_scroll_edge_px: f32,
    pub auto_scroll_max_speed_px: f32,
    pub auto_scroll_interval_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            seek_delay_ms: 250,
            double_click_ms: 400,
            follow_suppress_ms: 200,
            drag_threshold_px: 4.0,
            resize_handle_px: 8.0,
            auto_scroll_edge_px: 40.0,
            auto_scroll_max_speed_px: 24.0,
            auto_scroll_interval_ms: 16,
        }
    }
}

impl InteractionConfig {
    pub fn seek_delay(&self) -> Duration {
        Duration::from_millis(self.seek_delay_ms)
    }

    pub fn double_click(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    pub fn follow_suppress(&self) -> Duration {
        Duration::from_millis(self.follow_suppress_ms)
    }

    pub fn auto_scroll_interval(&self) -> Duration {
        Duration::from_millis(self.auto_scroll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Family precedence, top to bottom
    pub family_order: Vec<TrackType>,
    pub min_rows_per_family: u32,
    pub row_height: f32,
    /// Audio rows are drawn taller for waveforms
    pub audio_row_height: f32,
    pub subtitle_row_height: f32,
    pub placeholder_rows: u32,
    pub placeholder_height: f32,
    /// Distance from a row edge that counts as "between rows"
    pub boundary_zone_px: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            family_order: TrackType::all().to_vec(),
            min_rows_per_family: 1,
            row_height: 48.0,
            audio_row_height: 56.0,
            subtitle_row_height: 32.0,
            placeholder_rows: 1,
            placeholder_height: 32.0,
            boundary_zone_px: 6.0,
        }
    }
}

impl LayoutConfig {
    pub fn row_height_for(&self, track_type: TrackType) -> f32 {
        match track_type {
            TrackType::Audio => self.audio_row_height,
            TrackType::Subtitle | TrackType::Text => self.subtitle_row_height,
            TrackType::Video | TrackType::Image => self.row_height,
        }
    }

    pub fn effective_placeholder_rows(&self) -> u32 {
        self.placeholder_rows.min(MAX_PLACEHOLDER_ROWS)
    }

    pub fn effective_min_rows(&self) -> u32 {
        self.min_rows_per_family.min(MAX_MIN_ROWS_PER_FAMILY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Pixels per frame at zoom 1.0
    pub base_frame_width: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            base_frame_width: 2.0,
            min_zoom: 0.05,
            max_zoom: 20.0,
        }
    }
}

impl ZoomConfig {
    /// Never panics, even on a config that skipped validation.
    pub fn clamp(&self, zoom: f32) -> f32 {
        let zoom = if zoom.is_nan() { 1.0 } else { zoom };
        zoom.min(self.max_zoom).max(self.min_zoom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            min_rate: 0.25,
            max_rate: 4.0,
        }
    }
}

impl PlaybackConfig {
    pub fn clamp_rate(&self, rate: f64) -> f64 {
        if rate.is_nan() {
            return 1.0;
        }
        rate.min(self.max_rate).max(self.min_rate)
    }
}
