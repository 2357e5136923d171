use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Frame;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TrackId(pub Uuid);

impl TrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row family a track belongs to. Tracks only share rows with their own family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Video,
    Audio,
    Image,
    Subtitle,
    Text,
}

impl TrackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Subtitle => "subtitle",
            Self::Text => "text",
        }
    }

    pub fn all() -> [Self; 5] {
        [
            Self::Subtitle,
            Self::Text,
            Self::Image,
            Self::Video,
            Self::Audio,
        ]
    }

    /// Whether the volume field carries meaning for this family
    pub fn has_audio(&self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleType {
    /// Generated word-timed subtitles
    Karaoke,
    Imported,
}

/// Identifies a single visual row: one family plus a row index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub track_type: TrackType,
    pub row_index: u32,
}

impl RowKey {
    pub fn new(track_type: TrackType, row_index: u32) -> Self {
        Self {
            track_type,
            row_index,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.track_type, self.row_index)
    }
}

/// A clip placed on the timeline grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    #[serde(rename = "type")]
    pub track_type: TrackType,
    #[serde(default)]
    pub row_index: u32,
    pub start_frame: Frame,
    pub end_frame: Frame,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub is_linked: bool,
    #[serde(default)]
    pub linked_track_id: Option<TrackId>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subtitle_type: Option<SubtitleType>,
    #[serde(default)]
    pub media_id: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f32 {
    1.0
}

impl Track {
    pub fn new(track_type: TrackType, row_index: u32, start_frame: Frame, end_frame: Frame) -> Self {
        Self {
            id: TrackId::new(),
            track_type,
            row_index,
            start_frame,
            end_frame,
            visible: true,
            locked: false,
            muted: false,
            volume: 1.0,
            is_linked: false,
            linked_track_id: None,
            source: String::new(),
            name: String::new(),
            subtitle_type: None,
            media_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn duration(&self) -> Frame {
        self.end_frame.saturating_sub(self.start_frame)
    }

    /// Half-open containment; a boundary frame belongs to the track starting there.
    pub fn contains_frame(&self, frame: Frame) -> bool {
        frame >= self.start_frame && frame < self.end_frame
    }

    pub fn overlaps(&self, start: Frame, end: Frame) -> bool {
        crate::collision::ranges_overlap(self.start_frame, self.end_frame, start, end)
    }

    pub fn row_key(&self) -> RowKey {
        RowKey::new(self.track_type, self.row_index)
    }

    pub fn is_in_row(&self, track_type: TrackType, row_index: u32) -> bool {
        self.track_type == track_type && self.row_index == row_index
    }

    pub fn linked_partner(&self) -> Option<TrackId> {
        if self.is_linked {
            self.linked_track_id
        } else {
            None
        }
    }
}

/// Links two tracks so they move and split together.
pub fn link_tracks(a: &mut Track, b: &mut Track) {
    a.is_linked = true;
    a.linked_track_id = Some(b.id);
    b.is_linked = true;
    b.linked_track_id = Some(a.id);
}

/// True project duration: the furthest track edge or the declared minimum.
pub fn effective_end_frame(tracks: &[Track], total_frames: Frame) -> Frame {
    tracks
        .iter()
        .map(|t| t.end_frame)
        .max()
        .map_or(total_frames, |end| end.max(total_frames))
}

pub fn find_track<'a>(tracks: &'a [Track], id: &TrackId) -> Option<&'a Track> {
    tracks.iter().find(|t| t.id == *id)
}

pub fn tracks_in_row(
    tracks: &[Track],
    track_type: TrackType,
    row_index: u32,
) -> impl Iterator<Item = &Track> {
    tracks
        .iter()
        .filter(move |t| t.is_in_row(track_type, row_index))
}
