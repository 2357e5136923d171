//! Flat snapshot of a timeline for saving and loading, plus the drag-and-drop
//! payload sent by the media library.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::edit_operations;
use crate::markers::Marker;
use crate::state::{MediaTemplate, Timeline};
use crate::{find_track, Frame, Track, TrackId, TimelineError, MAX_FRAME};

pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

fn default_zoom() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub fps: f64,
    pub total_frames: Frame,
    #[serde(default)]
    pub current_frame: Frame,
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    #[serde(default)]
    pub in_point: Option<Frame>,
    #[serde(default)]
    pub out_point: Option<Frame>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl TimelineSnapshot {
    pub fn from_json(json: &str) -> Result<Self, TimelineError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(TimelineError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, TimelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Timeline {
    pub fn snapshot(&self) -> TimelineSnapshot {
        let state = self.state();
        TimelineSnapshot {
            version: SNAPSHOT_VERSION,
            fps: state.fps,
            total_frames: state.total_frames,
            current_frame: state.current_frame,
            zoom: state.zoom,
            in_point: state.in_point,
            out_point: state.out_point,
            markers: self.markers().markers_sorted().into_iter().cloned().collect(),
            tracks: self.tracks().to_vec(),
        }
    }

    pub fn from_snapshot(config: EngineConfig, snapshot: TimelineSnapshot) -> Self {
        let mut timeline = Timeline::new(config, snapshot.fps, snapshot.total_frames);
        timeline.rehydrate(snapshot);
        timeline
    }

    /// Replaces the whole timeline with `snapshot`. Damaged data is repaired
    /// rather than rejected: frames are bounded by [`MAX_FRAME`], inverted
    /// ranges get one frame, overlapping clips are nudged apart and links to
    /// missing tracks are dropped.
    pub fn rehydrate(&mut self, snapshot: TimelineSnapshot) {
        self.pause();
        self.set_fps(snapshot.fps);
        let tracks = sanitize_tracks(snapshot.tracks);
        self.replace_tracks(tracks);
        self.set_total_frames(snapshot.total_frames.min(MAX_FRAME));

        let markers = self.markers_mut();
        markers.clear();
        for marker in snapshot.markers {
            markers.add_marker(marker);
        }

        self.set_zoom(snapshot.zoom);
        self.set_in_point(snapshot.in_point);
        self.set_out_point(snapshot.out_point);
        self.set_current_frame(snapshot.current_frame);
        info!(
            tracks = self.tracks().len(),
            rows = self.rows().len(),
            end = self.effective_end_frame(),
            "timeline rehydrated"
        );
    }
}

fn sanitize_tracks(mut tracks: Vec<Track>) -> Vec<Track> {
    tracks.sort_by_key(|t| (t.track_type.as_str(), t.row_index, t.start_frame));
    let ids: Vec<TrackId> = tracks.iter().map(|t| t.id).collect();

    let mut placed: Vec<Track> = Vec::with_capacity(tracks.len());
    for mut track in tracks {
        if track.start_frame < 0 {
            warn!(id = %track.id, start = track.start_frame, "negative start clamped");
            let duration = track.duration();
            track.start_frame = 0;
            track.end_frame = duration;
        }
        if track.end_frame > MAX_FRAME {
            warn!(id = %track.id, end = track.end_frame, "track end clamped");
            track.end_frame = MAX_FRAME;
            track.start_frame = track.start_frame.min(MAX_FRAME - 1);
        }
        if track.end_frame <= track.start_frame {
            warn!(id = %track.id, "empty track range repaired");
            track.end_frame = track.start_frame + 1;
        }
        if let Some(partner) = track.linked_track_id {
            if !ids.contains(&partner) || partner == track.id {
                debug!(id = %track.id, "dangling link dropped");
                track.is_linked = false;
                track.linked_track_id = None;
            }
        }
        if find_track(&placed, &track.id).is_some() {
            warn!(id = %track.id, "duplicate track id skipped");
            continue;
        }
        edit_operations::place_track(&mut placed, track, None);
    }
    placed
}

/// Media dragged in from the library, as JSON
/// `{ "mediaId": "...", "targetFrame": 120, "targetRowIndex": 0 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPayload {
    pub media_id: String,
    pub target_frame: Frame,
    #[serde(default)]
    pub target_row_index: Option<u32>,
}

/// Malformed payloads are logged and ignored.
pub fn parse_drop_payload(raw: &str) -> Option<DropPayload> {
    match serde_json::from_str::<DropPayload>(raw) {
        Ok(payload) if !payload.media_id.is_empty() => Some(payload),
        Ok(_) => {
            warn!("drop payload without media id ignored");
            None
        }
        Err(err) => {
            warn!(%err, "malformed drop payload ignored");
            None
        }
    }
}

impl Timeline {
    /// Parses a drop payload, resolves its media through `library` and places
    /// the clip. Returns `None` when the payload or the media is unknown.
    pub fn accept_drop(
        &mut self,
        raw: &str,
        library: impl Fn(&str) -> Option<MediaTemplate>,
    ) -> Option<TrackId> {
        let payload = parse_drop_payload(raw)?;
        let Some(template) = library(&payload.media_id) else {
            warn!(media_id = %payload.media_id, "dropped media not in library");
            return None;
        };
        Some(self.add_from_library(&template, payload.target_frame, payload.target_row_index))
    }
}
