//! Overlap tests and nearest-free-slot search within a single row.

use crate::{Frame, Track, TrackId, TrackType};

/// Two half-open ranges `[s1, e1)` and `[s2, e2)` collide iff they share a frame.
pub fn ranges_overlap(s1: Frame, e1: Frame, s2: Frame, e2: Frame) -> bool {
    s1 < e2 && s2 < e1
}

fn obstacles<'a>(
    tracks: &'a [Track],
    track_type: TrackType,
    row_index: u32,
    exclude: &'a [TrackId],
) -> impl Iterator<Item = &'a Track> {
    tracks
        .iter()
        .filter(move |t| t.is_in_row(track_type, row_index) && !exclude.contains(&t.id))
}

/// Whether `[start, end)` overlaps any non-excluded track of the row.
///
/// Locked tracks are regular obstacles here; they only stop participating when
/// their id is passed in `exclude`.
pub fn has_collision(
    start: Frame,
    end: Frame,
    track_type: TrackType,
    row_index: u32,
    tracks: &[Track],
    exclude: &[TrackId],
) -> bool {
    obstacles(tracks, track_type, row_index, exclude)
        .any(|t| ranges_overlap(start, end, t.start_frame, t.end_frame))
}

/// Finds the collision-free start closest to `desired_start` for a clip of
/// `duration` frames in the given row.
///
/// Free starts form a union of intervals whose edges are either `0`, an
/// obstacle end, or an obstacle start minus the duration, so only those
/// positions need to be checked. Ties go to the later frame. When `playhead`
/// falls inside the search window, slots that put the clip's start or end on
/// the playhead win over plain edge slots.
pub fn find_nearest_available_position(
    desired_start: Frame,
    duration: Frame,
    track_type: TrackType,
    row_index: u32,
    tracks: &[Track],
    exclude: &[TrackId],
    playhead: Option<Frame>,
) -> Frame {
    let duration = duration.max(1);
    let desired = desired_start.max(0);
    let is_free = |start: Frame| {
        let end = start.saturating_add(duration);
        !has_collision(start, end, track_type, row_index, tracks, exclude)
    };

    if is_free(desired) {
        return desired;
    }

    let mut candidates = vec![0];
    let mut last_end: Frame = 0;
    for track in obstacles(tracks, track_type, row_index, exclude) {
        candidates.push(track.end_frame);
        candidates.push(track.start_frame.saturating_sub(duration));
        last_end = last_end.max(track.end_frame);
    }

    if let Some(playhead) = playhead {
        let window_start = desired.saturating_sub(duration);
        let window_end = desired.saturating_add(duration.saturating_mul(2));
        if playhead >= window_start && playhead <= window_end {
            let aligned = [playhead, playhead.saturating_sub(duration)];
            if let Some(start) = nearest_free(aligned, desired, &is_free) {
                return start;
            }
        }
    }

    nearest_free(candidates, desired, &is_free).unwrap_or(last_end)
}

fn nearest_free(
    pool: impl IntoIterator<Item = Frame>,
    desired: Frame,
    is_free: &impl Fn(Frame) -> bool,
) -> Option<Frame> {
    pool.into_iter()
        .filter(|&c| c >= 0 && is_free(c))
        .min_by_key(|&c| (c.abs_diff(desired), std::cmp::Reverse(c)))
}

/// Nearest obstacle edges around `track` in its own row: the largest end at or
/// before its start and the smallest start at or after its end.
pub fn row_neighbors(track: &Track, tracks: &[Track]) -> (Option<Frame>, Option<Frame>) {
    let exclude = [track.id];
    let mut left = None;
    let mut right = None;
    for other in obstacles(tracks, track.track_type, track.row_index, &exclude) {
        if other.end_frame <= track.start_frame {
            left = Some(left.map_or(other.end_frame, |l: Frame| l.max(other.end_frame)));
        }
        if other.start_frame >= track.end_frame {
            right = Some(right.map_or(other.start_frame, |r: Frame| r.min(other.start_frame)));
        }
    }
    (left, right)
}
