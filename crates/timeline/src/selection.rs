/// Multi-clip selection and marquee (rectangle) selection
use std::collections::HashSet;

use crate::geometry::{frame_to_x, Point, Rect};
use crate::layout::{bounds_for_row, RowBounds};
use crate::{find_track, Track, TrackId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    /// Set of selected track IDs
    pub selected: HashSet<TrackId>,
    /// Primary selection (anchor for multi-track drags)
    pub primary: Option<TrackId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a single track (and its linked partner), clearing previous selection
    pub fn select_single(&mut self, id: TrackId, tracks: &[Track]) {
        self.selected.clear();
        self.selected.insert(id);
        self.primary = Some(id);
        self.include_linked(tracks);
    }

    /// Add track to selection (Shift-click)
    pub fn add(&mut self, id: TrackId, tracks: &[Track]) {
        self.selected.insert(id);
        if self.primary.is_none() {
            self.primary = Some(id);
        }
        self.include_linked(tracks);
    }

    /// Remove a track and its linked partner
    pub fn remove(&mut self, id: TrackId, tracks: &[Track]) {
        self.selected.remove(&id);
        if let Some(partner) = find_track(tracks, &id).and_then(|t| t.linked_partner()) {
            self.selected.remove(&partner);
        }
        if let Some(primary) = self.primary {
            if !self.selected.contains(&primary) {
                self.primary = self.selected.iter().min().copied();
            }
        }
    }

    pub fn toggle(&mut self, id: TrackId, tracks: &[Track]) {
        if self.selected.contains(&id) {
            self.remove(id, tracks);
        } else {
            self.add(id, tracks);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.primary = None;
    }

    /// Select all tracks (Cmd/Ctrl + A)
    pub fn select_all(&mut self, tracks: &[Track]) {
        self.selected = tracks.iter().map(|t| t.id).collect();
        self.primary = tracks.first().map(|t| t.id);
    }

    /// Replace the selection wholesale, e.g. from a marquee pass
    pub fn replace(&mut self, ids: HashSet<TrackId>, tracks: &[Track]) {
        self.selected = ids;
        if self.primary.map_or(true, |p| !self.selected.contains(&p)) {
            self.primary = self.selected.iter().min().copied();
        }
        self.include_linked(tracks);
    }

    pub fn is_selected(&self, id: &TrackId) -> bool {
        self.selected.contains(id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drops ids that no longer refer to a track.
    pub fn retain_existing(&mut self, tracks: &[Track]) {
        self.selected.retain(|id| tracks.iter().any(|t| t.id == *id));
        if let Some(primary) = self.primary {
            if !self.selected.contains(&primary) {
                self.primary = self.selected.iter().min().copied();
            }
        }
    }

    fn include_linked(&mut self, tracks: &[Track]) {
        let partners = linked_partners(&self.selected, tracks);
        self.selected.extend(partners);
    }
}

/// Linked partners of `ids` that exist in `tracks`.
pub fn linked_partners(ids: &HashSet<TrackId>, tracks: &[Track]) -> Vec<TrackId> {
    tracks
        .iter()
        .filter(|t| ids.contains(&t.id))
        .filter_map(|t| t.linked_partner())
        .filter(|partner| tracks.iter().any(|t| t.id == *partner))
        .collect()
}

/// Content-space rectangle of a track, or `None` when its row has no bounds.
pub fn track_rect(track: &Track, bounds: &[RowBounds], frame_width: f32) -> Option<Rect> {
    let row = bounds_for_row(bounds, track.row_key())?;
    Some(Rect::from_min_max(
        Point::new(frame_to_x(track.start_frame, frame_width), row.top),
        Point::new(frame_to_x(track.end_frame, frame_width), row.bottom),
    ))
}

/// Ids of visible tracks whose content rectangle intersects `marquee`
/// (touching counts), plus their linked partners.
pub fn find_tracks_in_marquee(
    marquee: Rect,
    tracks: &[Track],
    bounds: &[RowBounds],
    frame_width: f32,
) -> HashSet<TrackId> {
    let mut hits: HashSet<TrackId> = tracks
        .iter()
        .filter(|t| t.visible)
        .filter(|t| track_rect(t, bounds, frame_width).map_or(false, |r| r.intersects(marquee)))
        .map(|t| t.id)
        .collect();
    let partners = linked_partners(&hits, tracks);
    hits.extend(partners);
    hits
}

/// In-progress marquee in content coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct MarqueeSelection {
    pub start_pos: Point,
    pub current_pos: Point,
    /// Selection present when the marquee began (empty unless additive)
    pub base: HashSet<TrackId>,
    pub additive: bool,
}

impl MarqueeSelection {
    pub fn new(start_pos: Point, additive: bool, current: &HashSet<TrackId>) -> Self {
        Self {
            start_pos,
            current_pos: start_pos,
            base: if additive { current.clone() } else { HashSet::new() },
            additive,
        }
    }

    pub fn update(&mut self, current_pos: Point) {
        self.current_pos = current_pos;
    }

    pub fn rect(&self) -> Rect {
        Rect::from_two_pos(self.start_pos, self.current_pos)
    }

    /// Selection implied by the current rectangle.
    pub fn resolve(
        &self,
        tracks: &[Track],
        bounds: &[RowBounds],
        frame_width: f32,
    ) -> HashSet<TrackId> {
        let mut ids = find_tracks_in_marquee(self.rect(), tracks, bounds, frame_width);
        ids.extend(self.base.iter().copied());
        ids
    }
}
