use std::time::Instant;

use crate::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still playing at the returned frame
    Advanced(Frame),
    /// Reached the end and restarted from frame 0
    Looped(Frame),
    /// Reached the end without looping; playback stopped on the last frame
    Stopped(Frame),
    Idle,
}

/// Real-time frame clock. Every tick derives the frame from one fixed
/// `(anchor_instant, anchor_frame)` pair so the playhead never accumulates drift.
/// Paused is the same as stopped; playing again resumes from the given frame.
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    playing: bool,
    fps: f64,
    rate: f64, // 1.0 = normal
    looping: bool,
    anchor_instant: Option<Instant>,
    anchor_frame: Frame,
}

impl PlaybackScheduler {
    pub fn new(fps: f64) -> Self {
        Self {
            playing: false,
            fps,
            rate: 1.0,
            looping: false,
            anchor_instant: None,
            anchor_frame: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_fps(&mut self, fps: f64) {
        self.fps = fps;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Starts from `current_frame`; from the last frame playback restarts at 0.
    pub fn play(&mut self, now: Instant, current_frame: Frame, effective_end: Frame) {
        let frame = if current_frame >= effective_end - 1 {
            0
        } else {
            current_frame.max(0)
        };
        self.playing = true;
        self.anchor_frame = frame;
        self.anchor_instant = Some(now);
    }

    pub fn pause(&mut self, current_frame: Frame) {
        self.playing = false;
        self.anchor_frame = current_frame;
        self.anchor_instant = None;
    }

    /// Re-anchors at the current frame so a rate change never jumps.
    pub fn set_rate(&mut self, rate: f64, now: Instant, current_frame: Frame) {
        self.anchor_frame = current_frame;
        if self.playing {
            self.anchor_instant = Some(now);
        }
        self.rate = rate;
    }

    pub fn seek_to(&mut self, frame: Frame, now: Instant) {
        self.anchor_frame = frame;
        if self.playing {
            self.anchor_instant = Some(now);
        }
    }

    /// Frame the playhead should show at `now`, without end handling.
    pub fn frame_at(&self, now: Instant) -> Frame {
        match (self.playing, self.anchor_instant) {
            (true, Some(anchor)) => {
                let elapsed = now.saturating_duration_since(anchor).as_secs_f64();
                self.anchor_frame + (elapsed * self.fps * self.rate).floor() as Frame
            }
            _ => self.anchor_frame,
        }
    }

    /// One animation tick. Gaps between clips are played through, never skipped.
    pub fn tick(&mut self, now: Instant, effective_end: Frame) -> TickOutcome {
        if !self.playing {
            return TickOutcome::Idle;
        }
        let frame = self.frame_at(now);
        if frame < effective_end {
            return TickOutcome::Advanced(frame);
        }
        if self.looping {
            self.anchor_frame = 0;
            self.anchor_instant = Some(now);
            TickOutcome::Looped(0)
        } else {
            let last = (effective_end - 1).max(0);
            self.pause(last);
            TickOutcome::Stopped(last)
        }
    }
}
