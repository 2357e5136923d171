/// Magnetic snapping of dragged and resized clip edges
use serde::{Deserialize, Serialize};

use crate::{Frame, Track, TrackId};

/// Snapping configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Enable snapping
    pub enabled: bool,

    /// Snap to playhead
    pub snap_to_playhead: bool,

    /// Snap to clip edges
    pub snap_to_clips: bool,

    /// Snap to markers and in/out points
    pub snap_to_markers: bool,

    /// Snap tolerance in pixels, independent of zoom
    pub snap_tolerance_px: f32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            snap_to_playhead: true,
            snap_to_clips: true,
            snap_to_markers: true,
            snap_tolerance_px: 10.0,
        }
    }
}

impl SnapSettings {
    /// Toggle snapping on/off
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

/// Everything outside the dragged clips that can attract an edge.
pub struct SnapSources<'a> {
    pub tracks: &'a [Track],
    /// Clips being dragged or resized; their own edges never attract
    pub exclude: &'a [TrackId],
    pub playhead: Frame,
    pub in_point: Option<Frame>,
    pub out_point: Option<Frame>,
    pub markers: &'a [Frame],
}

pub fn collect_snap_targets(sources: &SnapSources<'_>, settings: &SnapSettings) -> Vec<Frame> {
    let mut targets = Vec::new();
    if settings.snap_to_clips {
        for track in sources
            .tracks
            .iter()
            .filter(|t| t.visible && !sources.exclude.contains(&t.id))
        {
            targets.push(track.start_frame);
            targets.push(track.end_frame);
        }
    }
    if settings.snap_to_playhead {
        targets.push(sources.playhead);
    }
    if settings.snap_to_markers {
        targets.extend(sources.in_point);
        targets.extend(sources.out_point);
        targets.extend(sources.markers.iter().copied());
    }
    targets.sort_unstable();
    targets.dedup();
    targets
}

/// Nearest target whose on-screen distance to `frame` is within the tolerance.
pub fn find_snap_frame(
    frame: Frame,
    targets: &[Frame],
    frame_width: f32,
    tolerance_px: f32,
) -> Option<Frame> {
    if frame_width <= 0.0 {
        return None;
    }
    targets
        .iter()
        .copied()
        .map(|t| (t, (t - frame).abs()))
        .filter(|&(_, dist)| dist as f32 * frame_width <= tolerance_px)
        .min_by_key(|&(t, dist)| (dist, t))
        .map(|(t, _)| t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapResult {
    /// Possibly adjusted value (a start frame for moves, an edge for resizes)
    pub frame: Frame,
    /// Target the edge was pulled to
    pub snapped_to: Option<Frame>,
}

impl SnapResult {
    fn unsnapped(frame: Frame) -> Self {
        Self {
            frame,
            snapped_to: None,
        }
    }
}

/// Snaps a single edge (resize).
pub fn snap_edge(
    frame: Frame,
    targets: &[Frame],
    frame_width: f32,
    settings: &SnapSettings,
) -> SnapResult {
    if !settings.enabled {
        return SnapResult::unsnapped(frame);
    }
    match find_snap_frame(frame, targets, frame_width, settings.snap_tolerance_px) {
        Some(target) => SnapResult {
            frame: target,
            snapped_to: Some(target),
        },
        None => SnapResult::unsnapped(frame),
    }
}

/// Snaps a moving clip by whichever of its edges lands closer to a target.
pub fn snap_move(
    start: Frame,
    duration: Frame,
    targets: &[Frame],
    frame_width: f32,
    settings: &SnapSettings,
) -> SnapResult {
    if !settings.enabled {
        return SnapResult::unsnapped(start);
    }
    let tolerance = settings.snap_tolerance_px;
    let by_start = find_snap_frame(start, targets, frame_width, tolerance)
        .map(|t| ((t - start).abs(), t, t));
    let end = start + duration;
    let by_end = find_snap_frame(end, targets, frame_width, tolerance)
        .map(|t| ((t - end).abs(), t - duration, t));

    let best = match (by_start, by_end) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    };
    match best {
        Some((_, new_start, target)) => SnapResult {
            frame: new_start,
            snapped_to: Some(target),
        },
        None => SnapResult::unsnapped(start),
    }
}
