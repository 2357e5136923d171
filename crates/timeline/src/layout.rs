//! Dynamic row layout: one visual row per `(type, row_index)` pair, plus the
//! reserved placeholder bands used as drop targets for brand-new rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::collision::has_collision;
use crate::config::LayoutConfig;
use crate::{Frame, RowKey, Track, TrackType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicRow {
    pub track_type: TrackType,
    pub row_index: u32,
    pub track_count: usize,
}

impl DynamicRow {
    pub fn key(&self) -> RowKey {
        RowKey::new(self.track_type, self.row_index)
    }

    /// Stable identifier, e.g. `video-1`.
    pub fn id(&self) -> String {
        self.key().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.track_count == 0
    }
}

/// Ordered rows for the current track set: families in configured order,
/// ascending row index inside each family. Families listed in the config
/// always get at least `min_rows_per_family` rows, capped at
/// [`MAX_MIN_ROWS_PER_FAMILY`](crate::config::MAX_MIN_ROWS_PER_FAMILY), so
/// empty timelines still offer drop targets.
pub fn generate_dynamic_rows(tracks: &[Track], config: &LayoutConfig) -> Vec<DynamicRow> {
    let mut order = config.family_order.clone();
    for family in TrackType::all() {
        if !order.contains(&family) && tracks.iter().any(|t| t.track_type == family) {
            order.push(family);
        }
    }

    let mut rows = Vec::new();
    for family in order {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for track in tracks.iter().filter(|t| t.track_type == family) {
            *counts.entry(track.row_index).or_default() += 1;
        }
        if config.family_order.contains(&family) {
            let min_rows = config.effective_min_rows();
            let mut index = 0;
            while (counts.len() as u32) < min_rows {
                counts.entry(index).or_default();
                index += 1;
            }
        }
        rows.extend(counts.into_iter().map(|(row_index, track_count)| DynamicRow {
            track_type: family,
            row_index,
            track_count,
        }));
    }
    rows
}

/// Smallest row index of `track_type` in which a range spanning every frame collides
/// with nothing, i.e. the first completely empty row.
pub fn get_next_available_row_index(tracks: &[Track], track_type: TrackType) -> u32 {
    (0..)
        .find(|&row| !has_collision(0, Frame::MAX, track_type, row, tracks, &[]))
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowSlot {
    Row(RowKey),
    PlaceholderAbove(u32),
    PlaceholderBelow(u32),
}

/// Vertical extent of one slot in content pixels, `top` inclusive, `bottom` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowBounds {
    pub slot: RowSlot,
    pub top: f32,
    pub bottom: f32,
}

impl RowBounds {
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom
    }

    pub fn row_key(&self) -> Option<RowKey> {
        match self.slot {
            RowSlot::Row(key) => Some(key),
            _ => None,
        }
    }
}

pub fn compute_row_bounds(rows: &[DynamicRow], config: &LayoutConfig) -> Vec<RowBounds> {
    let placeholders = config.effective_placeholder_rows();
    let mut bounds = Vec::with_capacity(rows.len() + 2 * placeholders as usize);
    let mut y = 0.0;
    let mut push = |slot: RowSlot, height: f32| {
        bounds.push(RowBounds {
            slot,
            top: y,
            bottom: y + height,
        });
        y += height;
    };

    for i in 0..placeholders {
        push(RowSlot::PlaceholderAbove(i), config.placeholder_height);
    }
    for row in rows {
        push(RowSlot::Row(row.key()), config.row_height_for(row.track_type));
    }
    for i in 0..placeholders {
        push(RowSlot::PlaceholderBelow(i), config.placeholder_height);
    }
    bounds
}

pub fn bounds_for_row(bounds: &[RowBounds], key: RowKey) -> Option<&RowBounds> {
    bounds.iter().find(|b| b.row_key() == Some(key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionKind {
    /// Drop into an existing row
    Inside,
    /// Open a new row at `target_row_index`
    Between,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsertionPoint {
    pub kind: InsertionKind,
    pub target_row_index: u32,
    /// Content y of the row top (inside) or of the insertion line (between)
    pub y_position: f32,
    pub is_valid: bool,
    pub track_type: TrackType,
}

/// Classifies a vertical pointer position against precomputed row bounds for a
/// track of `dragged_type`.
pub fn detect_insertion_point(
    mouse_y: f32,
    bounds: &[RowBounds],
    dragged_type: TrackType,
    tracks: &[Track],
    config: &LayoutConfig,
) -> InsertionPoint {
    let real: Vec<(RowKey, &RowBounds)> = bounds
        .iter()
        .filter_map(|b| b.row_key().map(|key| (key, b)))
        .collect();

    let (Some(first), Some(last)) = (real.first(), real.last()) else {
        return InsertionPoint {
            kind: InsertionKind::Between,
            target_row_index: get_next_available_row_index(tracks, dragged_type),
            y_position: mouse_y,
            is_valid: true,
            track_type: dragged_type,
        };
    };

    if mouse_y < first.1.top {
        return new_family_row(tracks, dragged_type, true, first.1.top);
    }
    if mouse_y >= last.1.bottom {
        return new_family_row(tracks, dragged_type, false, last.1.bottom);
    }

    let Some(pos) = real.iter().position(|(_, b)| b.contains_y(mouse_y)) else {
        return new_family_row(tracks, dragged_type, false, last.1.bottom);
    };
    let (key, row) = real[pos];
    let zone = config.boundary_zone_px.min(row.height() / 2.0);

    if mouse_y - row.top < zone {
        let upper = pos.checked_sub(1).map(|i| real[i].0);
        return between(upper, Some(key), row.top, dragged_type);
    }
    if row.bottom - mouse_y <= zone {
        let lower = real.get(pos + 1).map(|(k, _)| *k);
        return between(Some(key), lower, row.bottom, dragged_type);
    }

    InsertionPoint {
        kind: InsertionKind::Inside,
        target_row_index: key.row_index,
        y_position: row.top,
        is_valid: key.track_type == dragged_type,
        track_type: key.track_type,
    }
}

/// Placeholder bands open a row at the top (index 0) or bottom of the dragged family.
fn new_family_row(
    tracks: &[Track],
    dragged_type: TrackType,
    above: bool,
    y_position: f32,
) -> InsertionPoint {
    let target_row_index = if above {
        0
    } else {
        tracks
            .iter()
            .filter(|t| t.track_type == dragged_type)
            .map(|t| t.row_index + 1)
            .max()
            .unwrap_or(0)
    };
    InsertionPoint {
        kind: InsertionKind::Between,
        target_row_index,
        y_position,
        is_valid: true,
        track_type: dragged_type,
    }
}

fn between(
    upper: Option<RowKey>,
    lower: Option<RowKey>,
    y_position: f32,
    dragged_type: TrackType,
) -> InsertionPoint {
    let (target_row_index, is_valid) = match (upper, lower) {
        (_, Some(lower)) if lower.track_type == dragged_type => (lower.row_index, true),
        (Some(upper), _) if upper.track_type == dragged_type => (upper.row_index + 1, true),
        _ => (0, false),
    };
    let track_type = if is_valid {
        dragged_type
    } else {
        lower.or(upper).map_or(dragged_type, |k| k.track_type)
    };
    InsertionPoint {
        kind: InsertionKind::Between,
        target_row_index,
        y_position,
        is_valid,
        track_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LayoutConfig {
        LayoutConfig {
            family_order: vec![TrackType::Video, TrackType::Audio],
            min_rows_per_family: 1,
            row_height: 40.0,
            audio_row_height: 40.0,
            subtitle_row_height: 40.0,
            placeholder_rows: 1,
            placeholder_height: 20.0,
            boundary_zone_px: 5.0,
        }
    }

    #[test]
    fn empty_timeline_still_has_one_row_per_family() {
        let rows = generate_dynamic_rows(&[], &config());
        let ids: Vec<_> = rows.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["video-0", "audio-0"]);
        assert!(rows.iter().all(|r| r.is_empty()));
    }

    #[test]
    fn row_padding_is_capped() {
        let config = LayoutConfig {
            min_rows_per_family: u32::MAX,
            ..config()
        };
        let rows = generate_dynamic_rows(&[], &config);
        let max = crate::config::MAX_MIN_ROWS_PER_FAMILY as usize;
        assert_eq!(rows.len(), 2 * max);
        assert_eq!(rows[max - 1].id(), format!("video-{}", max - 1));
    }

    #[test]
    fn rows_grouped_by_family_then_index() {
        let tracks = vec![
            Track::new(TrackType::Audio, 0, 0, 10),
            Track::new(TrackType::Video, 2, 0, 10),
            Track::new(TrackType::Video, 0, 0, 10),
            Track::new(TrackType::Video, 0, 20, 30),
            Track::new(TrackType::Image, 0, 0, 10),
        ];
        let rows = generate_dynamic_rows(&tracks, &config());
        let ids: Vec<_> = rows.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["video-0", "video-2", "audio-0", "image-0"]);
        assert_eq!(rows[0].track_count, 2);
    }

    #[test]
    fn next_available_row_skips_occupied_rows() {
        let tracks = vec![
            Track::new(TrackType::Video, 0, 0, 10),
            Track::new(TrackType::Video, 1, 500, 510),
            Track::new(TrackType::Audio, 0, 0, 10),
        ];
        assert_eq!(get_next_available_row_index(&tracks, TrackType::Video), 2);
        assert_eq!(get_next_available_row_index(&tracks, TrackType::Audio), 1);
        assert_eq!(get_next_available_row_index(&tracks, TrackType::Text), 0);
    }

    #[test]
    fn bounds_include_placeholders() {
        let rows = generate_dynamic_rows(&[], &config());
        let bounds = compute_row_bounds(&rows, &config());
        assert_eq!(bounds.len(), 4);
        assert_eq!(bounds[0].slot, RowSlot::PlaceholderAbove(0));
        assert_eq!(bounds[1].top, 20.0);
        assert_eq!(bounds[2].bottom, 100.0);
        assert_eq!(bounds[3].slot, RowSlot::PlaceholderBelow(0));
    }

    #[test]
    fn insertion_inside_compatible_row() {
        let cfg = config();
        let tracks = vec![Track::new(TrackType::Video, 0, 0, 10)];
        let bounds = compute_row_bounds(&generate_dynamic_rows(&tracks, &cfg), &cfg);
        // video-0 spans 20..60
        let point = detect_insertion_point(40.0, &bounds, TrackType::Video, &tracks, &cfg);
        assert_eq!(point.kind, InsertionKind::Inside);
        assert!(point.is_valid);
        assert_eq!(point.target_row_index, 0);
        assert_eq!(point.y_position, 20.0);

        let wrong = detect_insertion_point(80.0, &bounds, TrackType::Video, &tracks, &cfg);
        assert_eq!(wrong.kind, InsertionKind::Inside);
        assert!(!wrong.is_valid);
        assert_eq!(wrong.track_type, TrackType::Audio);
    }

    #[test]
    fn insertion_between_rows_near_boundary() {
        let cfg = config();
        let tracks = vec![
            Track::new(TrackType::Video, 0, 0, 10),
            Track::new(TrackType::Video, 1, 0, 10),
        ];
        let bounds = compute_row_bounds(&generate_dynamic_rows(&tracks, &cfg), &cfg);
        // video-0 20..60, video-1 60..100, audio-0 100..140
        let point = detect_insertion_point(58.0, &bounds, TrackType::Video, &tracks, &cfg);
        assert_eq!(point.kind, InsertionKind::Between);
        assert_eq!(point.target_row_index, 1);
        assert_eq!(point.y_position, 60.0);
        assert!(point.is_valid);

        // Family boundary between video-1 and audio-0 accepts both families
        let video = detect_insertion_point(98.0, &bounds, TrackType::Video, &tracks, &cfg);
        assert_eq!(video.target_row_index, 2);
        let audio = detect_insertion_point(102.0, &bounds, TrackType::Audio, &tracks, &cfg);
        assert_eq!(audio.target_row_index, 0);
        assert!(audio.is_valid);

        let image = detect_insertion_point(58.0, &bounds, TrackType::Image, &tracks, &cfg);
        assert!(!image.is_valid);
        assert_eq!(image.track_type, TrackType::Video);
    }

    #[test]
    fn placeholder_bands_open_new_rows() {
        let cfg = config();
        let tracks = vec![Track::new(TrackType::Audio, 0, 0, 10)];
        let bounds = compute_row_bounds(&generate_dynamic_rows(&tracks, &cfg), &cfg);
        let below = detect_insertion_point(130.0, &bounds, TrackType::Audio, &tracks, &cfg);
        assert_eq!(below.kind, InsertionKind::Between);
        assert_eq!(below.target_row_index, 1);
        assert_eq!(below.y_position, 100.0);

        let above = detect_insertion_point(5.0, &bounds, TrackType::Video, &tracks, &cfg);
        assert_eq!(above.kind, InsertionKind::Between);
        assert_eq!(above.target_row_index, 0);
        assert!(above.is_valid);
    }
}
