//! Pointer gesture state machine for the timeline surface.
//!
//! The host forwards pointer events in viewport coordinates, each stamped with
//! the instant it happened, and calls [`InteractionController::update`] once per
//! animation frame. Timers (debounced seek, double click, auto-scroll) are plain
//! deadlines checked there, so the controller never sleeps or spawns anything.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info};

use crate::edit_operations::{PlannedMove, ResizeEdge};
use crate::geometry::{frame_to_x, x_to_frame, Point};
use crate::layout::{detect_insertion_point, InsertionKind, InsertionPoint};
use crate::playback::TickOutcome;
use crate::selection::MarqueeSelection;
use crate::snapping::{collect_snap_targets, snap_edge, snap_move, SnapSettings};
use crate::state::{MediaTemplate, Timeline};
use crate::{find_track, get_next_available_row_index, tracks_in_row, Frame, Track, TrackId, TrackType};

/// Auto-scroll steps allowed to catch up in a single `update`
const MAX_SCROLL_STEPS_PER_UPDATE: u32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    /// Any of the selection-extending modifiers
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// A pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pos: Point,
    pub modifiers: Modifiers,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, at: Instant) -> Self {
        Self {
            pos: Point::new(x, y),
            modifiers: Modifiers::NONE,
            at,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// What lies under a content-space point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Empty,
    TrackBody(TrackId),
    ResizeHandle(TrackId, ResizeEdge),
}

/// One track carried by a drag, relative to the primary track.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostMember {
    pub track_id: TrackId,
    pub track_type: TrackType,
    pub duration: Frame,
    pub frame_offset: Frame,
    pub row_offset: i64,
    pub original_start: Frame,
    pub original_row: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackDragGhost {
    pub primary_id: TrackId,
    pub primary_type: TrackType,
    /// Primary first, then the rest by position
    pub members: Vec<GhostMember>,
    /// Pointer position inside the primary clip, in frames
    pub pointer_offset_frames: f32,
    /// Snapped start of the primary clip
    pub target_start: Frame,
    pub insertion: Option<InsertionPoint>,
}

impl TrackDragGhost {
    pub fn member_ids(&self) -> Vec<TrackId> {
        self.members.iter().map(|m| m.track_id).collect()
    }

    /// Lowest primary start that keeps every member at frame 0 or later.
    pub fn min_start(&self) -> Frame {
        -self.members.iter().map(|m| m.frame_offset).min().unwrap_or(0)
    }

    /// Where each member lands if dropped now, before collision nudging.
    /// Members of the primary's family follow `target_row` keeping their row
    /// offsets; everything else stays in its current row.
    pub fn planned_moves(&self, target_row: Option<u32>, tracks: &[Track]) -> Vec<PlannedMove> {
        self.members
            .iter()
            .map(|m| {
                let current_row = find_track(tracks, &m.track_id).map_or(m.original_row, |t| t.row_index);
                let row_index = match target_row {
                    Some(row) if m.track_type == self.primary_type => {
                        (row as i64 + m.row_offset).max(0) as u32
                    }
                    _ => current_row,
                };
                PlannedMove {
                    track_id: m.track_id,
                    start_frame: (self.target_start + m.frame_offset).max(0),
                    row_index,
                }
            })
            .collect()
    }
}

/// Preview drawn while a gesture is in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragGhost {
    #[default]
    None,
    Track(TrackDragGhost),
    Playhead { frame: Frame },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Pressed on empty space; a seek is scheduled unless this becomes a marquee
    PendingSeek { origin: Point },
    DraggingTrack { origin: Point, moved: bool },
    ResizingTrack {
        track_id: TrackId,
        edge: ResizeEdge,
        recorded: bool,
    },
    DraggingPlayhead,
    MarqueePending { origin: Point, additive: bool },
    MarqueeActive(MarqueeSelection),
    SplitHover { track_id: TrackId, frame: Frame },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledSeek {
    frame: Frame,
    deadline: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AutoScroll {
    /// Pixels per step
    velocity: Point,
    next_step: Instant,
}

/// Hit test in content coordinates. Hidden tracks are never hit. Resize
/// handles exist only on selected, unlocked tracks; where two clips touch, the
/// right-hand clip wins.
pub fn hit_test(timeline: &Timeline, content: Point) -> Hit {
    let Some(key) = timeline
        .row_bounds()
        .iter()
        .find(|b| b.contains_y(content.y))
        .and_then(|b| b.row_key())
    else {
        return Hit::Empty;
    };
    let fw = timeline.frame_width();
    let handle_px = timeline.config().interaction.resize_handle_px;
    let selection = &timeline.state().selection;
    let row: Vec<&Track> = tracks_in_row(timeline.tracks(), key.track_type, key.row_index)
        .filter(|t| t.visible)
        .collect();

    let handles = row
        .iter()
        .filter(|t| selection.is_selected(&t.id) && !t.locked)
        .map(|t| {
            let left = frame_to_x(t.start_frame, fw);
            let right = frame_to_x(t.end_frame, fw);
            (t.id, left, right, handle_px.min((right - left) / 3.0))
        });
    let mut right_hit = None;
    for (id, left, right, handle) in handles {
        if content.x >= left && content.x < left + handle {
            return Hit::ResizeHandle(id, ResizeEdge::Left);
        }
        if right_hit.is_none() && content.x >= right - handle && content.x < right {
            right_hit = Some(Hit::ResizeHandle(id, ResizeEdge::Right));
        }
    }
    if let Some(hit) = right_hit {
        return hit;
    }

    let frame = x_to_frame(content.x, fw);
    row.iter()
        .find(|t| t.contains_frame(frame))
        .map_or(Hit::Empty, |t| Hit::TrackBody(t.id))
}

/// Drives gestures against a [`Timeline`].
#[derive(Debug)]
pub struct InteractionController {
    state: InteractionState,
    viewport_width: f32,
    viewport_height: f32,
    last_pointer: Option<PointerEvent>,
    last_empty_press: Option<Instant>,
    pending_seek: Option<ScheduledSeek>,
    auto_scroll: Option<AutoScroll>,
}

impl InteractionController {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            state: InteractionState::Idle,
            viewport_width,
            viewport_height,
            last_pointer: None,
            last_empty_press: None,
            pending_seek: None,
            auto_scroll: None,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn has_pending_seek(&self) -> bool {
        self.pending_seek.is_some()
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll.is_some()
    }

    fn to_content(timeline: &Timeline, pos: Point) -> Point {
        let state = timeline.state();
        pos.offset(state.scroll_x, state.scroll_y)
    }

    fn gesture_active(&self) -> bool {
        !matches!(
            self.state,
            InteractionState::Idle | InteractionState::SplitHover { .. }
        )
    }

    // ---- pointer events ----

    pub fn pointer_down(&mut self, timeline: &mut Timeline, ev: PointerEvent) {
        if self.gesture_active() && !matches!(self.state, InteractionState::PendingSeek { .. }) {
            // the release of the previous gesture never reached us
            self.finish(timeline, false);
        }
        self.last_pointer = Some(ev);
        let content = Self::to_content(timeline, ev.pos);
        let hit = hit_test(timeline, content);
        if hit != Hit::Empty {
            // any second press inside the double-click window cancels the deferred seek
            self.pending_seek = None;
            self.last_empty_press = None;
        }

        if timeline.state().is_split_mode_active {
            if let Hit::TrackBody(id) | Hit::ResizeHandle(id, _) = hit {
                let frame = x_to_frame(content.x, timeline.frame_width());
                timeline.split_at_position(frame, id);
            }
            self.state = InteractionState::Idle;
            return;
        }

        match hit {
            Hit::ResizeHandle(track_id, edge) => {
                debug!(%track_id, ?edge, "resize started");
                self.state = InteractionState::ResizingTrack {
                    track_id,
                    edge,
                    recorded: false,
                };
            }
            Hit::TrackBody(id) => self.press_track(timeline, id, ev, content),
            Hit::Empty => self.press_empty(timeline, ev, content),
        }
    }

    /// Pointer-down on the ruler: seek right away and keep following the pointer.
    pub fn ruler_pointer_down(&mut self, timeline: &mut Timeline, ev: PointerEvent) {
        if self.gesture_active() {
            self.finish(timeline, false);
        }
        self.last_pointer = Some(ev);
        self.pending_seek = None;
        self.seek_to_pointer(timeline, ev);
        timeline.playback_mut().is_dragging_playhead = true;
        self.state = InteractionState::DraggingPlayhead;
    }

    pub fn pointer_move(&mut self, timeline: &mut Timeline, ev: PointerEvent) {
        self.last_pointer = Some(ev);
        self.handle_move(timeline, ev);
        self.update_auto_scroll(timeline, ev);
    }

    /// Ends the current gesture. Accepted in every state, including when the
    /// press started somewhere else.
    pub fn pointer_up(&mut self, timeline: &mut Timeline, ev: PointerEvent) {
        self.last_pointer = Some(ev);
        if let InteractionState::DraggingTrack { moved: true, .. } = self.state {
            self.recompute_drag(timeline, ev.pos);
        }
        self.finish(timeline, true);
    }

    /// The pointer left the window mid-gesture; drop the gesture without
    /// committing a drag.
    pub fn pointer_left_window(&mut self, timeline: &mut Timeline) {
        if self.gesture_active() {
            debug!("pointer left window, gesture dropped");
        }
        self.finish(timeline, false);
    }

    pub fn focus_lost(&mut self, timeline: &mut Timeline) {
        if self.gesture_active() {
            debug!("focus lost, gesture dropped");
        }
        self.finish(timeline, false);
    }

    /// Drops library media under the pointer. Inside a compatible row the clip
    /// goes into that row; between rows a new row is opened; anywhere else it
    /// lands in the first empty row of its family.
    pub fn drop_media(
        &mut self,
        timeline: &mut Timeline,
        template: &MediaTemplate,
        ev: PointerEvent,
    ) -> TrackId {
        let content = Self::to_content(timeline, ev.pos);
        let frame = x_to_frame(content.x, timeline.frame_width()).max(0);
        let insertion = detect_insertion_point(
            content.y,
            timeline.row_bounds(),
            template.track_type,
            timeline.tracks(),
            &timeline.config().layout,
        );

        timeline.record_action("Add clip");
        let row_index = match insertion {
            InsertionPoint {
                is_valid: true,
                kind: InsertionKind::Between,
                target_row_index,
                ..
            } => {
                timeline.insert_row_raw(template.track_type, target_row_index);
                target_row_index
            }
            InsertionPoint {
                is_valid: true,
                target_row_index,
                ..
            } => target_row_index,
            _ => get_next_available_row_index(timeline.tracks(), template.track_type),
        };
        let playhead = Some(timeline.current_frame());
        timeline.place_media(template, frame, row_index, playhead)
    }

    /// Runs due timers and advances playback. Call once per animation frame.
    pub fn update(&mut self, timeline: &mut Timeline, now: Instant) -> TickOutcome {
        if let Some(seek) = self.pending_seek {
            if now >= seek.deadline {
                self.pending_seek = None;
                timeline.seek(seek.frame, now);
                debug!(frame = timeline.current_frame(), "seek committed");
            }
        }
        self.step_auto_scroll(timeline, now);

        let outcome = timeline.tick_playback(now);
        if !self.gesture_active() {
            timeline.auto_follow(now, self.viewport_width);
        }
        outcome
    }

    // ---- pointer-down classification ----

    fn press_empty(&mut self, timeline: &mut Timeline, ev: PointerEvent, content: Point) {
        let additive = ev.modifiers.any();
        let double_click = self.last_empty_press.map_or(false, |at| {
            ev.at.saturating_duration_since(at) <= timeline.config().interaction.double_click()
        });

        if double_click {
            self.pending_seek = None;
            self.last_empty_press = None;
            debug!("double click, marquee started");
            let marquee = MarqueeSelection::new(content, additive, timeline.selected_ids());
            self.state = InteractionState::MarqueeActive(marquee);
            return;
        }
        self.last_empty_press = Some(ev.at);

        if additive {
            self.state = InteractionState::MarqueePending {
                origin: content,
                additive: true,
            };
            return;
        }

        timeline.clear_selection();
        let frame = x_to_frame(content.x, timeline.frame_width());
        self.pending_seek = Some(ScheduledSeek {
            frame,
            deadline: ev.at + timeline.config().interaction.seek_delay(),
        });
        self.state = InteractionState::PendingSeek { origin: content };
    }

    fn press_track(&mut self, timeline: &mut Timeline, id: TrackId, ev: PointerEvent, content: Point) {
        let Some(locked) = timeline.track(&id).map(|t| t.locked) else {
            return;
        };
        if ev.modifiers.any() {
            timeline.select_track(id, true);
            if !timeline.state().selection.is_selected(&id) {
                self.state = InteractionState::Idle;
                return;
            }
        } else if !timeline.state().selection.is_selected(&id) {
            timeline.select_track(id, false);
        }
        if locked {
            debug!(%id, "track is locked, not dragging");
            self.state = InteractionState::Idle;
            return;
        }

        let Some(ghost) = Self::build_ghost(timeline, id, content) else {
            return;
        };
        debug!(%id, members = ghost.members.len(), "drag started");
        let playback = timeline.playback_mut();
        playback.drag_ghost = DragGhost::Track(ghost);
        playback.is_dragging_track = true;
        self.state = InteractionState::DraggingTrack {
            origin: ev.pos,
            moved: false,
        };
    }

    /// Collects the primary track, the rest of the selection when the primary
    /// is part of it, and every linked partner. Locked tracks stay behind.
    fn build_ghost(timeline: &Timeline, primary_id: TrackId, content: Point) -> Option<TrackDragGhost> {
        let primary = timeline.track(&primary_id)?;
        let selection = &timeline.state().selection;

        let mut ids: HashSet<TrackId> = HashSet::from([primary_id]);
        if selection.is_selected(&primary_id) {
            ids.extend(selection.selected.iter().copied());
        }
        let partners: Vec<TrackId> = ids
            .iter()
            .filter_map(|id| timeline.track(id).and_then(|t| t.linked_partner()))
            .collect();
        ids.extend(partners);

        let mut others: Vec<&Track> = timeline
            .tracks()
            .iter()
            .filter(|t| t.id != primary_id && ids.contains(&t.id) && !t.locked)
            .collect();
        others.sort_by_key(|t| (t.start_frame, t.row_index));

        let member = |t: &Track| GhostMember {
            track_id: t.id,
            track_type: t.track_type,
            duration: t.duration(),
            frame_offset: t.start_frame - primary.start_frame,
            row_offset: t.row_index as i64 - primary.row_index as i64,
            original_start: t.start_frame,
            original_row: t.row_index,
        };
        let members = std::iter::once(primary).chain(others).map(member).collect();

        Some(TrackDragGhost {
            primary_id,
            primary_type: primary.track_type,
            members,
            pointer_offset_frames: content.x / timeline.frame_width() - primary.start_frame as f32,
            target_start: primary.start_frame,
            insertion: None,
        })
    }

    // ---- movement ----

    fn handle_move(&mut self, timeline: &mut Timeline, ev: PointerEvent) {
        let content = Self::to_content(timeline, ev.pos);
        let threshold = timeline.config().interaction.drag_threshold_px;

        match &mut self.state {
            InteractionState::Idle | InteractionState::SplitHover { .. } => {
                self.state = Self::hover_state(timeline, content);
            }
            InteractionState::PendingSeek { origin } => {
                if content.distance(*origin) > threshold {
                    self.pending_seek = None;
                    let marquee = MarqueeSelection::new(*origin, false, timeline.selected_ids());
                    self.state = InteractionState::MarqueeActive(marquee);
                    self.update_marquee(timeline, content);
                }
            }
            InteractionState::MarqueePending { origin, additive } => {
                if content.distance(*origin) > threshold {
                    self.pending_seek = None;
                    let marquee = MarqueeSelection::new(*origin, *additive, timeline.selected_ids());
                    self.state = InteractionState::MarqueeActive(marquee);
                    self.update_marquee(timeline, content);
                }
            }
            InteractionState::MarqueeActive(_) => self.update_marquee(timeline, content),
            InteractionState::DraggingTrack { origin, moved } => {
                if !*moved {
                    if ev.pos.distance(*origin) <= threshold {
                        return;
                    }
                    *moved = true;
                    timeline.record_action("Move clips");
                }
                self.recompute_drag(timeline, ev.pos);
            }
            InteractionState::ResizingTrack {
                track_id,
                edge,
                recorded,
            } => {
                let (track_id, edge) = (*track_id, *edge);
                if timeline.track(&track_id).is_none() {
                    self.state = InteractionState::Idle;
                    return;
                }
                if !*recorded {
                    *recorded = true;
                    timeline.record_action("Resize clip");
                }
                Self::resize_to_pointer(timeline, track_id, edge, content);
            }
            InteractionState::DraggingPlayhead => self.seek_to_pointer(timeline, ev),
        }
    }

    fn hover_state(timeline: &Timeline, content: Point) -> InteractionState {
        if !timeline.state().is_split_mode_active {
            return InteractionState::Idle;
        }
        match hit_test(timeline, content) {
            Hit::TrackBody(track_id) | Hit::ResizeHandle(track_id, _) => InteractionState::SplitHover {
                track_id,
                frame: x_to_frame(content.x, timeline.frame_width()),
            },
            Hit::Empty => InteractionState::Idle,
        }
    }

    fn update_marquee(&mut self, timeline: &mut Timeline, content: Point) {
        let InteractionState::MarqueeActive(marquee) = &mut self.state else {
            return;
        };
        marquee.update(content);
        let ids = marquee.resolve(timeline.tracks(), timeline.row_bounds(), timeline.frame_width());
        timeline.set_selection(ids);
    }

    fn snap_settings(timeline: &Timeline) -> SnapSettings {
        let mut settings = timeline.config().snap.clone();
        settings.enabled = timeline.state().snap_enabled;
        settings
    }

    /// Re-targets the drag ghost from a viewport position: snapped start frame
    /// of the primary clip and the row insertion point under the pointer.
    fn recompute_drag(&self, timeline: &mut Timeline, pos: Point) {
        let DragGhost::Track(ghost) = &timeline.playback().drag_ghost else {
            return;
        };
        let mut ghost = ghost.clone();
        let content = Self::to_content(timeline, pos);
        let fw = timeline.frame_width();

        let raw = ((content.x / fw - ghost.pointer_offset_frames).round() as Frame).max(ghost.min_start());
        let duration = ghost.members.first().map_or(1, |m| m.duration);
        let exclude = ghost.member_ids();
        let marker_frames = timeline.markers().frames();
        let settings = Self::snap_settings(timeline);
        let targets = collect_snap_targets(&timeline.snap_sources(&exclude, &marker_frames), &settings);
        let snap = snap_move(raw, duration, &targets, fw, &settings);

        ghost.target_start = snap.frame.max(ghost.min_start());
        ghost.insertion = Some(detect_insertion_point(
            content.y,
            timeline.row_bounds(),
            ghost.primary_type,
            timeline.tracks(),
            &timeline.config().layout,
        ));

        let playback = timeline.playback_mut();
        playback.drag_ghost = DragGhost::Track(ghost);
        playback.magnetic_snap_frame = snap.snapped_to;
    }

    fn resize_to_pointer(timeline: &mut Timeline, track_id: TrackId, edge: ResizeEdge, content: Point) {
        let fw = timeline.frame_width();
        let raw = (content.x / fw).round() as Frame;
        let exclude = [track_id];
        let marker_frames = timeline.markers().frames();
        let settings = Self::snap_settings(timeline);
        let targets = collect_snap_targets(&timeline.snap_sources(&exclude, &marker_frames), &settings);
        let snap = snap_edge(raw, &targets, fw, &settings);

        timeline.resize_track_raw(track_id, edge, snap.frame);
        timeline.playback_mut().magnetic_snap_frame = snap.snapped_to;
    }

    fn seek_to_pointer(&self, timeline: &mut Timeline, ev: PointerEvent) {
        let x = ev.pos.x + timeline.state().scroll_x;
        timeline.seek(x_to_frame(x, timeline.frame_width()), ev.at);
        let frame = timeline.current_frame();
        timeline.playback_mut().drag_ghost = DragGhost::Playhead { frame };
    }

    // ---- auto-scroll ----

    fn update_auto_scroll(&mut self, timeline: &Timeline, ev: PointerEvent) {
        let scrolls = matches!(
            self.state,
            InteractionState::DraggingTrack { moved: true, .. }
                | InteractionState::ResizingTrack { .. }
                | InteractionState::MarqueeActive(_)
        );
        let config = &timeline.config().interaction;
        let edge = config.auto_scroll_edge_px;
        let speed = config.auto_scroll_max_speed_px;
        let velocity = Point::new(
            edge_velocity(ev.pos.x, self.viewport_width, edge, speed),
            edge_velocity(ev.pos.y, self.viewport_height, edge, speed),
        );
        if !scrolls || (velocity.x == 0.0 && velocity.y == 0.0) {
            self.auto_scroll = None;
            return;
        }
        let next_step = self
            .auto_scroll
            .map_or(ev.at + config.auto_scroll_interval(), |s| s.next_step);
        self.auto_scroll = Some(AutoScroll { velocity, next_step });
    }

    fn step_auto_scroll(&mut self, timeline: &mut Timeline, now: Instant) {
        let (Some(mut scroll), Some(pointer)) = (self.auto_scroll, self.last_pointer) else {
            return;
        };
        let interval = timeline.config().interaction.auto_scroll_interval();
        let mut steps = 0;
        while now >= scroll.next_step && steps < MAX_SCROLL_STEPS_PER_UPDATE {
            let max_x = timeline.timeline_width().max(0.0);
            let max_y = (timeline.content_height() - self.viewport_height).max(0.0);
            let state = timeline.state();
            let x = (state.scroll_x + scroll.velocity.x).clamp(0.0, max_x);
            let y = (state.scroll_y + scroll.velocity.y).clamp(0.0, max_y);
            timeline.set_scroll(x, y);
            // the pointer is still, but the content under it moved
            self.handle_move(timeline, pointer);
            scroll.next_step += interval;
            steps += 1;
        }
        if now >= scroll.next_step {
            scroll.next_step = now + interval;
        }
        if self.auto_scroll.is_some() {
            self.auto_scroll = Some(scroll);
        }
    }

    // ---- gesture end ----

    fn finish(&mut self, timeline: &mut Timeline, commit: bool) {
        self.auto_scroll = None;
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::DraggingTrack { moved, .. } => {
                let ghost = Self::take_track_ghost(timeline);
                match ghost {
                    Some(ghost) if commit && moved => Self::commit_drag(timeline, ghost),
                    _ => debug!("drag ended without changes"),
                }
            }
            InteractionState::ResizingTrack { track_id, .. } => {
                timeline.playback_mut().magnetic_snap_frame = None;
                if let Some(track) = timeline.track(&track_id) {
                    debug!(%track_id, start = track.start_frame, end = track.end_frame, "resize finished");
                }
            }
            InteractionState::DraggingPlayhead => {
                let playback = timeline.playback_mut();
                playback.is_dragging_playhead = false;
                playback.drag_ghost = DragGhost::None;
            }
            InteractionState::MarqueeActive(_) => {
                debug!(selected = timeline.selected_ids().len(), "marquee finished");
            }
            hover @ InteractionState::SplitHover { .. } => self.state = hover,
            _ => {}
        }
    }

    fn take_track_ghost(timeline: &mut Timeline) -> Option<TrackDragGhost> {
        let playback = timeline.playback_mut();
        playback.is_dragging_track = false;
        playback.magnetic_snap_frame = None;
        match std::mem::take(&mut playback.drag_ghost) {
            DragGhost::Track(ghost) => Some(ghost),
            _ => None,
        }
    }

    /// Resolves the drop row, opens a new row for `Between` drops and moves
    /// every member to its nearest free slot.
    fn commit_drag(timeline: &mut Timeline, ghost: TrackDragGhost) {
        let target_row = match ghost.insertion {
            Some(point) if point.is_valid => {
                if point.kind == InsertionKind::Between {
                    timeline.insert_row_raw(ghost.primary_type, point.target_row_index);
                }
                Some(point.target_row_index)
            }
            Some(point) => {
                debug!(row = point.target_row_index, family = %point.track_type, "incompatible row, moving in time only");
                None
            }
            None => None,
        };

        let moves = ghost.planned_moves(target_row, timeline.tracks());
        let playhead = Some(timeline.current_frame());
        let placed = timeline.apply_moves(&moves, playhead);
        info!(
            primary = %ghost.primary_id,
            members = placed.len(),
            start = ghost.target_start,
            "drag committed"
        );
    }
}

/// Scroll speed for a pointer coordinate, ramping up linearly inside the
/// edge zone on either side.
fn edge_velocity(pos: f32, extent: f32, edge: f32, max_speed: f32) -> f32 {
    if edge <= 0.0 || extent <= 0.0 {
        return 0.0;
    }
    if pos < edge {
        -max_speed * ((edge - pos) / edge).min(1.0)
    } else if pos > extent - edge {
        max_speed * ((pos - (extent - edge)) / edge).min(1.0)
    } else {
        0.0
    }
}
