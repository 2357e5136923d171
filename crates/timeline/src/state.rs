//! The single owned store behind the editing surface. Reads are projections;
//! every write goes through a named mutator that keeps the derived data
//! (effective end frame, dynamic rows, row bounds) and the invariants intact.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::edit_operations::{self, PlannedMove, ResizeEdge};
use crate::geometry::{frame_to_x, ruler_ticks, Rect, RulerTick};
use crate::history::{ActionRecorder, NoopRecorder};
use crate::interaction::DragGhost;
use crate::layout::{
    compute_row_bounds, generate_dynamic_rows, get_next_available_row_index, DynamicRow, RowBounds,
};
use crate::markers::{Marker, MarkerCollection, MarkerId};
use crate::playback::{PlaybackScheduler, TickOutcome};
use crate::selection::{track_rect, SelectionState};
use crate::snapping::SnapSources;
use crate::{effective_end_frame, find_track, link_tracks, Frame, Track, TrackId, TrackType};

/// Minimum label spacing on the ruler, in pixels
const RULER_LABEL_SPACING_PX: f32 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineState {
    pub current_frame: Frame,
    /// Project-declared minimum duration
    pub total_frames: Frame,
    pub zoom: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub fps: f64,
    pub selection: SelectionState,
    pub in_point: Option<Frame>,
    pub out_point: Option<Frame>,
    pub is_split_mode_active: bool,
    pub snap_enabled: bool,
    /// Row identifiers in display order, e.g. `["video-0", "audio-0"]`
    pub visible_track_rows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_looping: bool,
    pub playback_rate: f64,
    pub is_dragging_track: bool,
    pub is_dragging_playhead: bool,
    pub drag_ghost: DragGhost,
    pub magnetic_snap_frame: Option<Frame>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_looping: false,
            playback_rate: 1.0,
            is_dragging_track: false,
            is_dragging_playhead: false,
            drag_ghost: DragGhost::None,
            magnetic_snap_frame: None,
        }
    }
}

/// What the media library resolves a `media_id` to.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTemplate {
    pub media_id: String,
    pub track_type: TrackType,
    pub duration_frames: Frame,
    pub name: String,
    pub source: String,
}

pub struct Timeline {
    tracks: Vec<Track>,
    state: TimelineState,
    playback: PlaybackState,
    markers: MarkerCollection,
    config: EngineConfig,
    scheduler: PlaybackScheduler,
    rows: Vec<DynamicRow>,
    row_bounds: Vec<RowBounds>,
    effective_end: Frame,
    follow_suspended_until: Option<Instant>,
    recorder: Box<dyn ActionRecorder>,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("tracks", &self.tracks.len())
            .field("state", &self.state)
            .field("effective_end", &self.effective_end)
            .finish()
    }
}

impl Timeline {
    pub fn new(config: EngineConfig, fps: f64, total_frames: Frame) -> Self {
        let snap_enabled = config.snap.enabled;
        let mut timeline = Self {
            tracks: Vec::new(),
            state: TimelineState {
                current_frame: 0,
                total_frames: total_frames.max(0),
                zoom: config.zoom.clamp(1.0),
                scroll_x: 0.0,
                scroll_y: 0.0,
                fps,
                selection: SelectionState::new(),
                in_point: None,
                out_point: None,
                is_split_mode_active: false,
                snap_enabled,
                visible_track_rows: Vec::new(),
            },
            playback: PlaybackState::default(),
            markers: MarkerCollection::new(),
            config,
            scheduler: PlaybackScheduler::new(fps),
            rows: Vec::new(),
            row_bounds: Vec::new(),
            effective_end: total_frames.max(0),
            follow_suspended_until: None,
            recorder: Box::new(NoopRecorder),
        };
        timeline.refresh();
        timeline
    }

    pub fn with_recorder(mut self, recorder: Box<dyn ActionRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    // ---- read-only projections ----

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        find_track(&self.tracks, id)
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn markers(&self) -> &MarkerCollection {
        &self.markers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rows(&self) -> &[DynamicRow] {
        &self.rows
    }

    pub fn row_bounds(&self) -> &[RowBounds] {
        &self.row_bounds
    }

    pub fn effective_end_frame(&self) -> Frame {
        self.effective_end
    }

    pub fn current_frame(&self) -> Frame {
        self.state.current_frame
    }

    pub fn selected_ids(&self) -> &HashSet<TrackId> {
        &self.state.selection.selected
    }

    /// Pixels per frame at the current zoom.
    pub fn frame_width(&self) -> f32 {
        self.config.zoom.base_frame_width * self.state.zoom
    }

    pub fn timeline_width(&self) -> f32 {
        frame_to_x(self.effective_end, self.frame_width())
    }

    pub fn content_height(&self) -> f32 {
        self.row_bounds.last().map_or(0.0, |b| b.bottom)
    }

    pub fn track_rect(&self, id: &TrackId) -> Option<Rect> {
        let track = self.track(id)?;
        track_rect(track, &self.row_bounds, self.frame_width())
    }

    pub fn ruler_ticks(&self, viewport_width: f32) -> Vec<RulerTick> {
        ruler_ticks(
            self.state.scroll_x,
            viewport_width,
            self.frame_width(),
            self.state.fps,
            RULER_LABEL_SPACING_PX,
        )
    }

    pub(crate) fn snap_sources<'a>(
        &'a self,
        exclude: &'a [TrackId],
        marker_frames: &'a [Frame],
    ) -> SnapSources<'a> {
        SnapSources {
            tracks: &self.tracks,
            exclude,
            playhead: self.state.current_frame,
            in_point: self.state.in_point,
            out_point: self.state.out_point,
            markers: marker_frames,
        }
    }

    // ---- derived data ----

    /// Recomputes everything derived from the track set. Runs after every
    /// track mutation.
    fn refresh(&mut self) {
        self.effective_end = effective_end_frame(&self.tracks, self.state.total_frames);
        self.rows = generate_dynamic_rows(&self.tracks, &self.config.layout);
        self.row_bounds = compute_row_bounds(&self.rows, &self.config.layout);
        self.state.visible_track_rows = self.rows.iter().map(|r| r.id()).collect();
        self.state.selection.retain_existing(&self.tracks);
        self.state.current_frame = self.clamp_frame(self.state.current_frame);
    }

    fn clamp_frame(&self, frame: Frame) -> Frame {
        frame.clamp(0, (self.effective_end - 1).max(0))
    }

    pub(crate) fn record_action(&mut self, label: &str) {
        self.recorder.record_action(label);
    }

    // ---- track mutations ----

    /// Inserts a track at a collision-free position in its own row.
    pub fn add_track(&mut self, track: Track) -> TrackId {
        self.record_action("Add clip");
        let id = edit_operations::place_track(&mut self.tracks, track, None);
        self.refresh();
        id
    }

    /// Places library media at `target_frame`. Without an explicit row the
    /// first empty row of the family is used.
    pub fn add_from_library(
        &mut self,
        template: &MediaTemplate,
        target_frame: Frame,
        target_row_index: Option<u32>,
    ) -> TrackId {
        let row_index = target_row_index
            .unwrap_or_else(|| get_next_available_row_index(&self.tracks, template.track_type));
        self.record_action("Add clip");
        self.place_media(template, target_frame, row_index, None)
    }

    /// Creates a clip from `template` without notifying history.
    pub(crate) fn place_media(
        &mut self,
        template: &MediaTemplate,
        target_frame: Frame,
        row_index: u32,
        playhead: Option<Frame>,
    ) -> TrackId {
        let start = target_frame.max(0);
        let mut track = Track::new(
            template.track_type,
            row_index,
            start,
            start.saturating_add(template.duration_frames.max(1)),
        );
        track.name = template.name.clone();
        track.source = template.source.clone();
        track.media_id = Some(template.media_id.clone());

        let id = edit_operations::place_track(&mut self.tracks, track, playhead);
        info!(%id, media_id = %template.media_id, row_index, "added clip from library");
        self.refresh();
        id
    }

    pub fn remove_tracks(&mut self, ids: &[TrackId]) -> usize {
        if !ids.iter().any(|id| self.track(id).is_some()) {
            debug!("remove_tracks: no matching tracks");
            return 0;
        }
        self.record_action("Delete clips");
        let removed = edit_operations::remove_tracks(&mut self.tracks, ids);
        self.refresh();
        removed
    }

    /// Moves tracks to planned positions, nudging each member independently to
    /// its nearest free slot.
    pub fn move_tracks(&mut self, moves: &[PlannedMove]) -> Vec<(TrackId, Frame, u32)> {
        if moves.is_empty() {
            return Vec::new();
        }
        self.record_action("Move clips");
        self.apply_moves(moves, None)
    }

    /// Same as [`Timeline::move_tracks`] without notifying history; the drag
    /// gesture records once when it starts.
    pub(crate) fn apply_moves(
        &mut self,
        moves: &[PlannedMove],
        playhead: Option<Frame>,
    ) -> Vec<(TrackId, Frame, u32)> {
        let placed = edit_operations::move_tracks(&mut self.tracks, moves, playhead);
        self.refresh();
        placed
    }

    pub(crate) fn insert_row_raw(&mut self, track_type: TrackType, index: u32) {
        edit_operations::insert_row(&mut self.tracks, track_type, index);
        self.refresh();
    }

    pub fn insert_row(&mut self, track_type: TrackType, index: u32) {
        self.record_action("Insert row");
        self.insert_row_raw(track_type, index);
    }

    pub fn resize_track(&mut self, id: TrackId, edge: ResizeEdge, frame: Frame) -> Option<(Frame, Frame)> {
        if self.track(&id).map_or(true, |t| t.locked) {
            return None;
        }
        self.record_action("Resize clip");
        self.resize_track_raw(id, edge, frame)
    }

    pub(crate) fn resize_track_raw(
        &mut self,
        id: TrackId,
        edge: ResizeEdge,
        frame: Frame,
    ) -> Option<(Frame, Frame)> {
        let result = edit_operations::resize_track(&mut self.tracks, id, edge, frame);
        self.refresh();
        result
    }

    /// Splits a track (and its linked partner) at `frame`. Returns the id of the
    /// new right-hand piece.
    pub fn split_at_position(&mut self, frame: Frame, id: TrackId) -> Option<TrackId> {
        let splittable = self
            .track(&id)
            .map_or(false, |t| !t.locked && frame > t.start_frame && frame < t.end_frame);
        if !splittable {
            debug!(%id, frame, "split ignored");
            return None;
        }
        self.record_action("Split clip");
        let right = edit_operations::split_track(&mut self.tracks, id, frame);
        self.refresh();
        right
    }

    /// Mutes a track together with its linked partner.
    pub fn set_muted(&mut self, id: TrackId, muted: bool) {
        let Some(partner) = self.track(&id).map(|t| t.linked_partner()) else {
            return;
        };
        self.record_action(if muted { "Mute clip" } else { "Unmute clip" });
        for track in self.tracks.iter_mut() {
            if track.id == id || Some(track.id) == partner {
                track.muted = muted;
            }
        }
    }

    pub fn set_visible(&mut self, id: TrackId, visible: bool) {
        self.update_track(id, "Toggle visibility", |t| t.visible = visible);
    }

    pub fn set_locked(&mut self, id: TrackId, locked: bool) {
        self.update_track(id, "Toggle lock", |t| t.locked = locked);
    }

    pub fn set_volume(&mut self, id: TrackId, volume: f32) {
        let volume = if volume.is_nan() { 1.0 } else { volume.clamp(0.0, 1.0) };
        if self.track(&id).map_or(true, |t| !t.track_type.has_audio()) {
            return;
        }
        self.update_track(id, "Change volume", |t| t.volume = volume);
    }

    fn update_track(&mut self, id: TrackId, label: &str, f: impl FnOnce(&mut Track)) {
        if self.track(&id).is_none() {
            debug!(%id, label, "missing track");
            return;
        }
        self.record_action(label);
        if let Some(track) = self.tracks.iter_mut().find(|t| t.id == id) {
            f(track);
        }
    }

    /// Links two tracks so selection, moves, mute and split treat them as one
    /// clip. Any previous partners are unlinked first.
    pub fn link_tracks(&mut self, a: TrackId, b: TrackId) -> bool {
        if a == b || self.track(&a).is_none() || self.track(&b).is_none() {
            debug!(%a, %b, "link ignored");
            return false;
        }
        self.record_action("Link clips");
        self.unlink_raw(a);
        self.unlink_raw(b);
        let (mut first, mut second) = match (self.track(&a), self.track(&b)) {
            (Some(first), Some(second)) => (first.clone(), second.clone()),
            _ => return false,
        };
        link_tracks(&mut first, &mut second);
        for track in self.tracks.iter_mut() {
            if track.id == a {
                *track = first.clone();
            } else if track.id == b {
                *track = second.clone();
            }
        }
        true
    }

    pub fn unlink_track(&mut self, id: TrackId) {
        if self.track(&id).map_or(true, |t| !t.is_linked) {
            return;
        }
        self.record_action("Unlink clips");
        self.unlink_raw(id);
    }

    fn unlink_raw(&mut self, id: TrackId) {
        let partner = self.track(&id).and_then(|t| t.linked_partner());
        for track in self.tracks.iter_mut() {
            if track.id == id || Some(track.id) == partner {
                track.is_linked = false;
                track.linked_track_id = None;
            }
        }
    }

    pub fn set_fps(&mut self, fps: f64) {
        if fps > 0.0 && fps.is_finite() {
            self.state.fps = fps;
            self.scheduler.set_fps(fps);
        }
    }

    pub fn set_total_frames(&mut self, total_frames: Frame) {
        self.state.total_frames = total_frames.max(0);
        self.refresh();
    }

    /// Replaces every track and derived value, e.g. after loading a project.
    pub(crate) fn replace_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.state.selection.clear();
        self.playback.drag_ghost = DragGhost::None;
        self.refresh();
    }

    pub(crate) fn markers_mut(&mut self) -> &mut MarkerCollection {
        &mut self.markers
    }

    pub fn add_marker(&mut self, marker: Marker) -> MarkerId {
        self.markers.add_marker(marker)
    }

    pub fn remove_marker(&mut self, id: &MarkerId) -> Option<Marker> {
        self.markers.remove_marker(id)
    }

    // ---- cursor, viewport and flags ----

    /// Clamps into `[0, effective_end_frame - 1]`.
    pub fn set_current_frame(&mut self, frame: Frame) {
        self.state.current_frame = self.clamp_frame(frame);
    }

    /// A user seek: pauses playback, moves the playhead and briefly suspends
    /// auto-follow scrolling.
    pub fn seek(&mut self, frame: Frame, now: Instant) {
        if self.playback.is_playing {
            self.pause();
        }
        self.set_current_frame(frame);
        self.scheduler.seek_to(self.state.current_frame, now);
        self.follow_suspended_until = Some(now + self.config.interaction.follow_suppress());
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.state.zoom = self.config.zoom.clamp(zoom);
    }

    pub fn set_scroll(&mut self, scroll_x: f32, scroll_y: f32) {
        self.state.scroll_x = scroll_x.max(0.0);
        self.state.scroll_y = scroll_y.max(0.0);
    }

    pub fn set_in_point(&mut self, frame: Option<Frame>) {
        self.state.in_point = frame.map(|f| f.clamp(0, self.effective_end));
        if let (Some(i), Some(o)) = (self.state.in_point, self.state.out_point) {
            if o <= i {
                self.state.out_point = None;
            }
        }
    }

    pub fn set_out_point(&mut self, frame: Option<Frame>) {
        self.state.out_point = frame.map(|f| f.clamp(0, self.effective_end));
        if let (Some(i), Some(o)) = (self.state.in_point, self.state.out_point) {
            if o <= i {
                self.state.in_point = None;
            }
        }
    }

    pub fn set_split_mode(&mut self, active: bool) {
        self.state.is_split_mode_active = active;
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.state.snap_enabled = enabled;
    }

    // ---- selection ----

    pub fn select_track(&mut self, id: TrackId, additive: bool) {
        if self.track(&id).is_none() {
            return;
        }
        if additive {
            self.state.selection.toggle(id, &self.tracks);
        } else {
            self.state.selection.select_single(id, &self.tracks);
        }
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.state.selection.select_all(&self.tracks);
    }

    pub(crate) fn set_selection(&mut self, ids: HashSet<TrackId>) {
        self.state.selection.replace(ids, &self.tracks);
    }

    pub(crate) fn playback_mut(&mut self) -> &mut PlaybackState {
        &mut self.playback
    }

    // ---- playback ----

    pub fn play(&mut self, now: Instant) {
        self.scheduler.set_fps(self.state.fps);
        self.scheduler
            .play(now, self.state.current_frame, self.effective_end);
        self.state.current_frame = self.clamp_frame(self.scheduler.frame_at(now));
        self.playback.is_playing = true;
        info!(frame = self.state.current_frame, "playback started");
    }

    pub fn pause(&mut self) {
        self.scheduler.pause(self.state.current_frame);
        self.playback.is_playing = false;
        debug!(frame = self.state.current_frame, "playback paused");
    }

    pub fn toggle_playback(&mut self, now: Instant) {
        if self.playback.is_playing {
            self.pause();
        } else {
            self.play(now);
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.playback.is_looping = looping;
        self.scheduler.set_looping(looping);
    }

    pub fn set_playback_rate(&mut self, rate: f64, now: Instant) {
        let rate = self.config.playback.clamp_rate(rate);
        self.playback.playback_rate = rate;
        self.scheduler.set_rate(rate, now, self.state.current_frame);
    }

    /// Advances the playhead for one animation frame.
    pub fn tick_playback(&mut self, now: Instant) -> TickOutcome {
        let outcome = self.scheduler.tick(now, self.effective_end);
        match outcome {
            TickOutcome::Advanced(frame) | TickOutcome::Looped(frame) => self.set_current_frame(frame),
            TickOutcome::Stopped(frame) => {
                self.set_current_frame(frame);
                self.playback.is_playing = false;
                info!(frame, "playback reached end");
            }
            TickOutcome::Idle => {}
        }
        outcome
    }

    /// Pages the view to keep the playhead visible while playing. Returns
    /// whether the scroll position changed.
    pub fn auto_follow(&mut self, now: Instant, viewport_width: f32) -> bool {
        if !self.playback.is_playing || self.follow_suspended(now) {
            return false;
        }
        let x = frame_to_x(self.state.current_frame, self.frame_width());
        let left = self.state.scroll_x;
        if x >= left && x <= left + viewport_width {
            return false;
        }
        self.state.scroll_x = (x - viewport_width * 0.1).max(0.0);
        true
    }

    pub fn follow_suspended(&self, now: Instant) -> bool {
        self.follow_suspended_until.map_or(false, |until| now < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ActionLog;
    use std::time::Duration;

    fn timeline() -> (Timeline, ActionLog) {
        let log = ActionLog::new();
        let timeline =
            Timeline::new(EngineConfig::default(), 30.0, 300).with_recorder(Box::new(log.clone()));
        (timeline, log)
    }

    #[test]
    fn effective_end_tracks_mutations() {
        let (mut tl, _) = timeline();
        assert_eq!(tl.effective_end_frame(), 300);
        let id = tl.add_track(Track::new(TrackType::Video, 0, 200, 450));
        assert_eq!(tl.effective_end_frame(), 450);
        tl.add_track(Track::new(TrackType::Audio, 0, 0, 350));
        tl.remove_tracks(&[id]);
        assert_eq!(tl.effective_end_frame(), 350);
    }

    #[test]
    fn current_frame_is_clamped() {
        let (mut tl, _) = timeline();
        tl.set_current_frame(1000);
        assert_eq!(tl.current_frame(), 299);
        tl.set_current_frame(-5);
        assert_eq!(tl.current_frame(), 0);
    }

    #[test]
    fn shrinking_project_pulls_playhead_back() {
        let (mut tl, _) = timeline();
        let id = tl.add_track(Track::new(TrackType::Video, 0, 0, 600));
        tl.set_current_frame(550);
        tl.remove_tracks(&[id]);
        assert_eq!(tl.current_frame(), 299);
    }

    #[test]
    fn add_from_library_avoids_collisions() {
        let (mut tl, log) = timeline();
        tl.add_track(Track::new(TrackType::Video, 0, 0, 100));
        let template = MediaTemplate {
            media_id: "clip-1".into(),
            track_type: TrackType::Video,
            duration_frames: 50,
            name: "Clip".into(),
            source: "clip.mp4".into(),
        };
        let id = tl.add_from_library(&template, 80, Some(0));
        let track = tl.track(&id).unwrap();
        assert_eq!((track.start_frame, track.end_frame), (100, 150));
        assert_eq!(track.media_id.as_deref(), Some("clip-1"));

        let auto = tl.add_from_library(&template, 0, None);
        assert_eq!(tl.track(&auto).unwrap().row_index, 1);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn mute_follows_linked_partner() {
        let (mut tl, _) = timeline();
        let mut video = Track::new(TrackType::Video, 0, 0, 100);
        let mut audio = Track::new(TrackType::Audio, 0, 0, 100);
        crate::link_tracks(&mut video, &mut audio);
        let (v, a) = (video.id, audio.id);
        tl.add_track(video);
        tl.add_track(audio);
        tl.set_muted(v, true);
        assert!(tl.track(&a).unwrap().muted);
    }

    #[test]
    fn volume_only_applies_to_audible_tracks() {
        let (mut tl, _) = timeline();
        let image = tl.add_track(Track::new(TrackType::Image, 0, 0, 100));
        let audio = tl.add_track(Track::new(TrackType::Audio, 0, 0, 100));
        tl.set_volume(image, 0.3);
        tl.set_volume(audio, 1.7);
        assert_eq!(tl.track(&image).unwrap().volume, 1.0);
        assert_eq!(tl.track(&audio).unwrap().volume, 1.0);
        tl.set_volume(audio, 0.25);
        assert_eq!(tl.track(&audio).unwrap().volume, 0.25);
    }

    #[test]
    fn seek_pauses_and_suspends_follow() {
        let (mut tl, _) = timeline();
        let t0 = Instant::now();
        tl.play(t0);
        tl.seek(120, t0);
        assert!(!tl.playback().is_playing);
        assert_eq!(tl.current_frame(), 120);
        assert!(tl.follow_suspended(t0 + Duration::from_millis(100)));
        assert!(!tl.follow_suspended(t0 + Duration::from_millis(250)));
    }

    #[test]
    fn tick_clamps_at_end_without_loop() {
        let (mut tl, _) = timeline();
        let t0 = Instant::now();
        tl.set_current_frame(290);
        tl.play(t0);
        let outcome = tl.tick_playback(t0 + Duration::from_secs(2));
        assert_eq!(outcome, TickOutcome::Stopped(299));
        assert_eq!(tl.current_frame(), 299);
        assert!(!tl.playback().is_playing);
    }

    #[test]
    fn in_out_points_stay_ordered() {
        let (mut tl, _) = timeline();
        tl.set_in_point(Some(100));
        tl.set_out_point(Some(200));
        tl.set_in_point(Some(250));
        assert_eq!(tl.state().in_point, Some(250));
        assert_eq!(tl.state().out_point, None);
    }

    #[test]
    fn auto_follow_pages_when_playhead_leaves_view() {
        let (mut tl, _) = timeline();
        let t0 = Instant::now();
        tl.play(t0);
        tl.set_current_frame(250);
        // 2 px per frame: frame 250 is at x=500, outside a 300 px viewport
        assert!(tl.auto_follow(t0, 300.0));
        assert_eq!(tl.state().scroll_x, 470.0);
        assert!(!tl.auto_follow(t0, 300.0));
    }
}
