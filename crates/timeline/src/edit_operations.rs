//! Geometry-changing edit operations on a track set.
//!
//! None of these fail: impossible requests are clamped, nudged to the nearest
//! free slot, or ignored when they reference missing tracks.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collision::{find_nearest_available_position, row_neighbors};
use crate::{find_track, link_tracks, Frame, Track, TrackId, TrackType};

/// Smallest clip a resize may leave behind, in frames
pub const MIN_RESIZE_FRAMES: Frame = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeEdge {
    Left,
    Right,
}

/// Requested destination for one track of a (multi-)move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub track_id: TrackId,
    pub start_frame: Frame,
    pub row_index: u32,
}

/// Inserts `track`, moving it to the nearest collision-free start in its row.
pub fn place_track(tracks: &mut Vec<Track>, mut track: Track, playhead: Option<Frame>) -> TrackId {
    let duration = track.duration().max(1);
    let start = find_nearest_available_position(
        track.start_frame,
        duration,
        track.track_type,
        track.row_index,
        tracks,
        &[],
        playhead,
    );
    if start != track.start_frame {
        debug!(id = %track.id, from = track.start_frame, to = start, "placement nudged");
    }
    track.start_frame = start;
    track.end_frame = start.saturating_add(duration);
    let id = track.id;
    tracks.push(track);
    id
}

/// Removes tracks by id and unlinks any surviving partners. Returns how many
/// tracks were removed.
pub fn remove_tracks(tracks: &mut Vec<Track>, ids: &[TrackId]) -> usize {
    let before = tracks.len();
    tracks.retain(|t| !ids.contains(&t.id));
    for track in tracks.iter_mut() {
        if track.linked_track_id.map_or(false, |p| ids.contains(&p)) {
            track.is_linked = false;
            track.linked_track_id = None;
        }
    }
    before - tracks.len()
}

/// Applies moves in order. Each member is nudged independently: members that
/// already landed become obstacles for the ones after them, members that have
/// not moved yet are ignored. Locked tracks never move.
pub fn move_tracks(
    tracks: &mut [Track],
    moves: &[PlannedMove],
    playhead: Option<Frame>,
) -> Vec<(TrackId, Frame, u32)> {
    let mut pending: Vec<TrackId> = moves
        .iter()
        .filter(|m| find_track(tracks, &m.track_id).map_or(false, |t| !t.locked))
        .map(|m| m.track_id)
        .collect();
    let mut placed = Vec::with_capacity(pending.len());

    for planned in moves {
        if !pending.contains(&planned.track_id) {
            continue;
        }
        let Some(track) = find_track(tracks, &planned.track_id) else {
            continue;
        };
        let duration = track.duration();
        let start = find_nearest_available_position(
            planned.start_frame,
            duration,
            track.track_type,
            planned.row_index,
            tracks,
            &pending,
            playhead,
        );
        if start != planned.start_frame.max(0) {
            debug!(id = %planned.track_id, wanted = planned.start_frame, got = start, "move nudged");
        }
        if let Some(track) = tracks.iter_mut().find(|t| t.id == planned.track_id) {
            track.start_frame = start;
            track.end_frame = start.saturating_add(duration);
            track.row_index = planned.row_index;
        }
        pending.retain(|id| *id != planned.track_id);
        placed.push((planned.track_id, start, planned.row_index));
    }
    placed
}

/// Opens an empty row at `index` by shifting that row and every row after it
/// (same family only) down by one.
pub fn insert_row(tracks: &mut [Track], track_type: TrackType, index: u32) {
    for track in tracks
        .iter_mut()
        .filter(|t| t.track_type == track_type && t.row_index >= index)
    {
        track.row_index += 1;
    }
}

/// Moves one edge of a track to `frame`, clamped so the clip keeps at least
/// [`MIN_RESIZE_FRAMES`], never starts before 0 and never overlaps its row
/// neighbours. Returns the resulting range.
pub fn resize_track(
    tracks: &mut [Track],
    id: TrackId,
    edge: ResizeEdge,
    frame: Frame,
) -> Option<(Frame, Frame)> {
    let track = find_track(tracks, &id)?;
    if track.locked {
        return None;
    }
    let (left_limit, right_limit) = row_neighbors(track, tracks);
    let (mut start, mut end) = (track.start_frame, track.end_frame);

    match edge {
        ResizeEdge::Left => {
            let lo = left_limit.unwrap_or(0).max(0);
            let hi = end - MIN_RESIZE_FRAMES;
            if lo <= hi {
                start = frame.max(lo).min(hi);
            }
        }
        ResizeEdge::Right => {
            let lo = start + MIN_RESIZE_FRAMES;
            let hi = right_limit.unwrap_or(Frame::MAX);
            if lo <= hi {
                end = frame.max(lo).min(hi);
            }
        }
    }

    let track = tracks.iter_mut().find(|t| t.id == id)?;
    track.start_frame = start;
    track.end_frame = end;
    Some((start, end))
}

/// Replaces a track with `[start, frame)` and `[frame, end)`. The left piece
/// keeps the original id. A linked partner that also spans `frame` is split
/// the same way and the two right pieces are linked to each other. Returns the
/// id of the right piece.
pub fn split_track(tracks: &mut Vec<Track>, id: TrackId, frame: Frame) -> Option<TrackId> {
    let right = split_one(tracks, id, frame)?;

    let partner = find_track(tracks, &id).and_then(|t| t.linked_partner());
    let partner_right = partner
        .filter(|p| find_track(tracks, p).map_or(false, |t| !t.locked))
        .and_then(|p| split_one(tracks, p, frame));

    match partner_right {
        Some(partner_right) => {
            let mut a = take(tracks, right)?;
            let mut b = take(tracks, partner_right)?;
            link_tracks(&mut a, &mut b);
            tracks.push(a);
            tracks.push(b);
        }
        None => {
            if let Some(piece) = tracks.iter_mut().find(|t| t.id == right) {
                piece.is_linked = false;
                piece.linked_track_id = None;
            }
        }
    }
    Some(right)
}

fn split_one(tracks: &mut Vec<Track>, id: TrackId, frame: Frame) -> Option<TrackId> {
    let original = tracks.iter_mut().find(|t| t.id == id)?;
    if frame <= original.start_frame || frame >= original.end_frame {
        return None;
    }
    let mut right = original.clone();
    right.id = TrackId::new();
    right.start_frame = frame;
    original.end_frame = frame;
    let right_id = right.id;
    tracks.push(right);
    Some(right_id)
}

fn take(tracks: &mut Vec<Track>, id: TrackId) -> Option<Track> {
    let idx = tracks.iter().position(|t| t.id == id)?;
    Some(tracks.remove(idx))
}
