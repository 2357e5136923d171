//! Frame to timecode conversion for ruler labels, reports and user input.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Frame, TimelineError};

/// Timecode format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimecodeFormat {
    /// HH:MM:SS:FF
    #[default]
    NonDropFrame,
    /// M:SS, plus tenths off whole seconds (ruler labels)
    Ruler,
    /// Seconds with decimals (SS.mmm)
    Seconds,
}

/// A frame split into clock fields at a whole-frame rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
    /// Frames per second the fields were split with
    pub fps: u32,
    pub format: TimecodeFormat,
}

/// Fractional rates (29.97) count in whole frames, like a non-drop clock.
fn whole_fps(fps: f64) -> u32 {
    if fps.is_finite() && fps >= 1.0 {
        fps.round().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

impl Timecode {
    pub fn from_frame(frame: Frame, fps: f64, format: TimecodeFormat) -> Self {
        let fps = whole_fps(fps);
        let frame = frame.max(0) as u64;
        let total_seconds = frame / fps as u64;
        let hours = (total_seconds / 3600).min(u32::MAX as u64) as u32;

        Self {
            hours,
            minutes: ((total_seconds % 3600) / 60) as u32,
            seconds: (total_seconds % 60) as u32,
            frames: (frame % fps as u64) as u32,
            fps,
            format,
        }
    }

    pub fn to_frame(&self) -> Frame {
        let total_seconds = self.hours as i64 * 3600 + self.minutes as i64 * 60 + self.seconds as i64;
        total_seconds * self.fps as i64 + self.frames as i64
    }

    /// Parses `HH:MM:SS:FF`.
    pub fn parse(s: &str, fps: f64) -> Result<Self, TimelineError> {
        let invalid = |why: &str| TimelineError::InvalidTimecode(format!("{s:?}: {why}"));
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 4 {
            return Err(invalid("expected HH:MM:SS:FF"));
        }
        let field = |i: usize, name: &str| {
            parts[i]
                .parse::<u32>()
                .map_err(|_| invalid(&format!("invalid {name}")))
        };
        let (hours, minutes, seconds, frames) =
            (field(0, "hours")?, field(1, "minutes")?, field(2, "seconds")?, field(3, "frames")?);

        if minutes >= 60 || seconds >= 60 {
            return Err(invalid("minutes and seconds must be < 60"));
        }
        let fps = whole_fps(fps);
        if frames >= fps {
            return Err(invalid(&format!("frames must be < {fps}")));
        }

        Ok(Self {
            hours,
            minutes,
            seconds,
            frames,
            fps,
            format: TimecodeFormat::NonDropFrame,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            TimecodeFormat::NonDropFrame => write!(
                f,
                "{:02}:{:02}:{:02}:{:02}",
                self.hours, self.minutes, self.seconds, self.frames
            ),
            TimecodeFormat::Ruler => {
                let minutes = self.hours as u64 * 60 + self.minutes as u64;
                if self.frames == 0 {
                    write!(f, "{}:{:02}", minutes, self.seconds)
                } else {
                    let tenths = self.frames * 10 / self.fps;
                    write!(f, "{}:{:02}.{}", minutes, self.seconds, tenths)
                }
            }
            TimecodeFormat::Seconds => {
                let whole = self.to_frame() / self.fps as i64;
                write!(f, "{:.3}", whole as f64 + self.frames as f64 / self.fps as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timecode_non_drop_24fps() {
        let tc = Timecode::from_frame(0, 24.0, TimecodeFormat::NonDropFrame);
        assert_eq!(tc.to_string(), "00:00:00:00");

        let tc = Timecode::from_frame(24, 24.0, TimecodeFormat::NonDropFrame);
        assert_eq!(tc.to_string(), "00:00:01:00");

        let tc = Timecode::from_frame(86_400 + 30, 24.0, TimecodeFormat::NonDropFrame);
        assert_eq!(tc.to_string(), "01:00:01:06");
    }

    #[test]
    fn test_ruler_format() {
        assert_eq!(Timecode::from_frame(90, 30.0, TimecodeFormat::Ruler).to_string(), "0:03");
        assert_eq!(Timecode::from_frame(15, 30.0, TimecodeFormat::Ruler).to_string(), "0:00.5");
        assert_eq!(Timecode::from_frame(108_000, 30.0, TimecodeFormat::Ruler).to_string(), "60:00");
    }

    #[test]
    fn test_seconds_format() {
        assert_eq!(Timecode::from_frame(45, 30.0, TimecodeFormat::Seconds).to_string(), "1.500");
    }

    #[test]
    fn test_fractional_rate_counts_whole_frames() {
        let tc = Timecode::from_frame(30, 29.97, TimecodeFormat::NonDropFrame);
        assert_eq!((tc.seconds, tc.frames), (1, 0));
    }

    #[test]
    fn test_timecode_parse() {
        let tc = Timecode::parse("01:23:45:12", 24.0).unwrap();
        assert_eq!((tc.hours, tc.minutes, tc.seconds, tc.frames), (1, 23, 45, 12));
        assert_eq!(tc.to_frame(), ((3600 + 23 * 60 + 45) * 24 + 12) as Frame);

        assert!(Timecode::parse("00:00:01", 24.0).is_err());
        assert!(Timecode::parse("00:61:00:00", 24.0).is_err());
        assert!(Timecode::parse("00:00:00:24", 24.0).is_err());
        assert!(matches!(
            Timecode::parse("aa:00:00:00", 24.0),
            Err(TimelineError::InvalidTimecode(_))
        ));
    }

    #[test]
    fn test_negative_frames_clamp_to_zero() {
        let tc = Timecode::from_frame(-40, 30.0, TimecodeFormat::NonDropFrame);
        assert_eq!(tc.to_frame(), 0);
    }
}
