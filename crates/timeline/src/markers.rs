//! Timeline markers: named frames that act as snap targets

use crate::Frame;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Marker ID
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MarkerId(pub Uuid);

impl MarkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarkerType {
    #[default]
    Standard,

    /// Section boundary, drawn across every row
    Chapter,

    /// Review note attached to a frame
    Comment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    pub frame: Frame,
    pub label: String,
    #[serde(default)]
    pub marker_type: MarkerType,

    /// Color in hex format (e.g., "#FF0000")
    #[serde(default = "default_marker_color")]
    pub color: String,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: i64,
}

fn default_marker_color() -> String {
    "#4A9EFF".to_string()
}

impl Marker {
    pub fn new(frame: Frame, label: impl Into<String>) -> Self {
        Self {
            id: MarkerId::new(),
            frame,
            label: label.into(),
            marker_type: MarkerType::Standard,
            color: default_marker_color(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_type(mut self, marker_type: MarkerType) -> Self {
        self.marker_type = marker_type;
        self.color = match marker_type {
            MarkerType::Chapter => "#FF00FF".to_string(),
            MarkerType::Comment => "#FFFF00".to_string(),
            MarkerType::Standard => default_marker_color(),
        };
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerCollection {
    markers: HashMap<MarkerId, Marker>,
}

impl MarkerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_marker(&mut self, marker: Marker) -> MarkerId {
        let id = marker.id;
        self.markers.insert(id, marker);
        id
    }

    pub fn remove_marker(&mut self, id: &MarkerId) -> Option<Marker> {
        self.markers.remove(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Markers sorted by frame
    pub fn markers_sorted(&self) -> Vec<&Marker> {
        let mut markers: Vec<_> = self.markers.values().collect();
        markers.sort_by_key(|m| m.frame);
        markers
    }

    /// Marker frames, ascending, for snapping
    pub fn frames(&self) -> Vec<Frame> {
        let mut frames: Vec<_> = self.markers.values().map(|m| m.frame).collect();
        frames.sort_unstable();
        frames
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_sorted() {
        let mut markers = MarkerCollection::new();
        markers.add_marker(Marker::new(300, "b"));
        markers.add_marker(Marker::new(10, "a").with_type(MarkerType::Chapter));
        assert_eq!(markers.frames(), vec![10, 300]);
        assert_eq!(markers.markers_sorted()[0].color, "#FF00FF");
    }

    #[test]
    fn remove_marker_by_id() {
        let mut markers = MarkerCollection::new();
        let id = markers.add_marker(Marker::new(5, "x"));
        assert!(markers.remove_marker(&id).is_some());
        assert!(markers.remove_marker(&id).is_none());
        assert!(markers.frames().is_empty());
    }
}
