//! Content-space geometry shared by hit testing, marquee selection and the
//! rendering layer. Content coordinates already include scroll offsets.

use serde::{Deserialize, Serialize};

use crate::timecode::{Timecode, TimecodeFormat};
use crate::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle with inclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn from_min_max(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Normalized rectangle spanning two arbitrary corners.
    pub fn from_two_pos(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Touching edges count as intersecting.
    pub fn intersects(&self, other: Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

pub fn frame_to_x(frame: Frame, frame_width: f32) -> f32 {
    frame as f32 * frame_width
}

/// Frame under a content-space x; floors so a boundary pixel maps to the frame starting there.
pub fn x_to_frame(x: f32, frame_width: f32) -> Frame {
    if frame_width <= 0.0 {
        return 0;
    }
    (x / frame_width).floor() as Frame
}

#[derive(Debug, Clone, PartialEq)]
pub struct RulerTick {
    pub frame: Frame,
    pub x: f32,
    pub major: bool,
    pub label: Option<String>,
}

const TICK_STEPS_SECONDS: [f64; 9] = [0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 300.0];

/// Ruler ticks for the visible span `[scroll_x, scroll_x + viewport_width]`.
///
/// Major ticks land on whole-second steps chosen so labels stay at least
/// `min_label_spacing_px` apart; four minor ticks sit between majors.
pub fn ruler_ticks(
    scroll_x: f32,
    viewport_width: f32,
    frame_width: f32,
    fps: f64,
    min_label_spacing_px: f32,
) -> Vec<RulerTick> {
    if frame_width <= 0.0 || fps <= 0.0 || viewport_width <= 0.0 {
        return Vec::new();
    }
    let px_per_second = frame_width as f64 * fps;
    let step_seconds = TICK_STEPS_SECONDS
        .iter()
        .copied()
        .find(|s| s * px_per_second >= min_label_spacing_px as f64)
        .unwrap_or(600.0);
    let major_frames = ((step_seconds * fps).round() as Frame).max(1);
    let minor_frames = (major_frames / 5).max(1);

    let first = x_to_frame(scroll_x.max(0.0), frame_width);
    let last = x_to_frame(scroll_x + viewport_width, frame_width);
    let mut frame = first - first.rem_euclid(minor_frames);
    let mut ticks = Vec::new();
    while frame <= last {
        let major = frame % major_frames == 0;
        let label =
            major.then(|| Timecode::from_frame(frame, fps, TimecodeFormat::Ruler).to_string());
        ticks.push(RulerTick {
            frame,
            x: frame_to_x(frame, frame_width),
            major,
            label,
        });
        frame += minor_frames;
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_intersect() {
        let a = Rect::from_two_pos(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = Rect::from_two_pos(Point::new(10.0, 10.0), Point::new(20.0, 20.0));
        let c = Rect::from_two_pos(Point::new(10.5, 0.0), Point::new(20.0, 5.0));
        assert!(a.intersects(b));
        assert!(b.intersects(a));
        assert!(!a.intersects(c));
    }

    #[test]
    fn from_two_pos_normalizes() {
        let r = Rect::from_two_pos(Point::new(30.0, 5.0), Point::new(10.0, 25.0));
        assert_eq!(r.min, Point::new(10.0, 5.0));
        assert_eq!(r.max, Point::new(30.0, 25.0));
    }

    #[test]
    fn x_to_frame_floors() {
        assert_eq!(x_to_frame(19.9, 2.0), 9);
        assert_eq!(x_to_frame(20.0, 2.0), 10);
        assert_eq!(x_to_frame(-1.0, 2.0), -1);
    }

    #[test]
    fn ruler_labels_whole_seconds() {
        // 30 fps at 2 px/frame: 60 px per second
        let ticks = ruler_ticks(0.0, 240.0, 2.0, 30.0, 50.0);
        let majors: Vec<_> = ticks.iter().filter(|t| t.major).collect();
        assert_eq!(majors.len(), 5);
        assert_eq!(majors[1].frame, 30);
        assert_eq!(majors[1].label.as_deref(), Some("0:01"));

        // 0.5 s steps when zoomed in
        let ticks = ruler_ticks(0.0, 240.0, 4.0, 30.0, 50.0);
        let labels: Vec<_> = ticks.iter().filter_map(|t| t.label.as_deref()).collect();
        assert_eq!(labels[..3], ["0:00", "0:00.5", "0:01"]);
        assert!(ticks.iter().any(|t| !t.major && t.frame == 6));
    }
}
