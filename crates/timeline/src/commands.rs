use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::edit_operations::{PlannedMove, ResizeEdge};
use crate::markers::{Marker, MarkerType};
use crate::state::{MediaTemplate, Timeline};
use crate::{Frame, TimelineError, Track, TrackId, TrackType};

/// A scripted edit, as stored in JSON edit scripts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    AddClip {
        #[serde(rename = "type")]
        track_type: TrackType,
        start_frame: Frame,
        duration: Frame,
        #[serde(default)]
        row_index: Option<u32>,
        /// Fixed id so later commands in the same script can refer to the clip
        #[serde(default)]
        id: Option<TrackId>,
        #[serde(default)]
        name: String,
        #[serde(default)]
        source: String,
        #[serde(default)]
        media_id: Option<String>,
    },
    RemoveTracks {
        track_ids: Vec<TrackId>,
    },
    /// Moves a clip and keeps its linked partner at the same relative offset
    MoveTrack {
        track_id: TrackId,
        start_frame: Frame,
        #[serde(default)]
        row_index: Option<u32>,
    },
    ResizeTrack {
        track_id: TrackId,
        edge: ResizeEdge,
        frame: Frame,
    },
    SplitTrack {
        track_id: TrackId,
        frame: Frame,
    },
    InsertRow {
        #[serde(rename = "type")]
        track_type: TrackType,
        index: u32,
    },
    LinkTracks {
        a: TrackId,
        b: TrackId,
    },
    UnlinkTrack {
        track_id: TrackId,
    },
    SetMuted {
        track_id: TrackId,
        muted: bool,
    },
    SetVisible {
        track_id: TrackId,
        visible: bool,
    },
    SetLocked {
        track_id: TrackId,
        locked: bool,
    },
    SetVolume {
        track_id: TrackId,
        volume: f32,
    },
    SetInPoint {
        frame: Option<Frame>,
    },
    SetOutPoint {
        frame: Option<Frame>,
    },
    Seek {
        frame: Frame,
    },
    AddMarker {
        frame: Frame,
        label: String,
        #[serde(default)]
        marker_type: MarkerType,
    },
    Select {
        track_ids: Vec<TrackId>,
        #[serde(default)]
        additive: bool,
    },
}

/// Applies one command. Returns the id of the clip the command created, if any.
///
/// Unlike the interactive paths, scripts are validated: a command naming a
/// track that does not exist is an error rather than a silent no-op.
pub fn apply_command(
    timeline: &mut Timeline,
    command: EditCommand,
    now: Instant,
) -> Result<Option<TrackId>, TimelineError> {
    match command {
        EditCommand::AddClip {
            track_type,
            start_frame,
            duration,
            row_index,
            id,
            name,
            source,
            media_id,
        } => add_clip(
            timeline, track_type, start_frame, duration, row_index, id, name, source, media_id,
        )
        .map(Some),
        EditCommand::RemoveTracks { track_ids } => {
            for id in &track_ids {
                require(timeline, *id)?;
            }
            timeline.remove_tracks(&track_ids);
            Ok(None)
        }
        EditCommand::MoveTrack {
            track_id,
            start_frame,
            row_index,
        } => move_track(timeline, track_id, start_frame, row_index).map(|_| None),
        EditCommand::ResizeTrack {
            track_id,
            edge,
            frame,
        } => {
            let track = require(timeline, track_id)?;
            if track.locked {
                return Err(TimelineError::TrackLocked(track_id));
            }
            timeline.resize_track(track_id, edge, frame);
            Ok(None)
        }
        EditCommand::SplitTrack { track_id, frame } => {
            let track = require(timeline, track_id)?;
            if frame <= track.start_frame || frame >= track.end_frame {
                return Err(TimelineError::InvalidOp(format!(
                    "split frame {frame} outside track {track_id} [{}, {})",
                    track.start_frame, track.end_frame
                )));
            }
            if track.locked {
                return Err(TimelineError::TrackLocked(track_id));
            }
            Ok(timeline.split_at_position(frame, track_id))
        }
        EditCommand::InsertRow { track_type, index } => {
            timeline.insert_row(track_type, index);
            Ok(None)
        }
        EditCommand::LinkTracks { a, b } => {
            require(timeline, a)?;
            require(timeline, b)?;
            if !timeline.link_tracks(a, b) {
                return Err(TimelineError::InvalidOp(format!("cannot link {a} to itself")));
            }
            Ok(None)
        }
        EditCommand::UnlinkTrack { track_id } => {
            require(timeline, track_id)?;
            timeline.unlink_track(track_id);
            Ok(None)
        }
        EditCommand::SetMuted { track_id, muted } => {
            require(timeline, track_id)?;
            timeline.set_muted(track_id, muted);
            Ok(None)
        }
        EditCommand::SetVisible { track_id, visible } => {
            require(timeline, track_id)?;
            timeline.set_visible(track_id, visible);
            Ok(None)
        }
        EditCommand::SetLocked { track_id, locked } => {
            require(timeline, track_id)?;
            timeline.set_locked(track_id, locked);
            Ok(None)
        }
        EditCommand::SetVolume { track_id, volume } => {
            require(timeline, track_id)?;
            timeline.set_volume(track_id, volume);
            Ok(None)
        }
        EditCommand::SetInPoint { frame } => {
            timeline.set_in_point(frame);
            Ok(None)
        }
        EditCommand::SetOutPoint { frame } => {
            timeline.set_out_point(frame);
            Ok(None)
        }
        EditCommand::Seek { frame } => {
            timeline.seek(frame, now);
            Ok(None)
        }
        EditCommand::AddMarker {
            frame,
            label,
            marker_type,
        } => {
            timeline.add_marker(Marker::new(frame, label).with_type(marker_type));
            Ok(None)
        }
        EditCommand::Select {
            track_ids,
            additive,
        } => {
            if !additive {
                timeline.clear_selection();
            }
            for id in track_ids {
                require(timeline, id)?;
                if !timeline.state().selection.is_selected(&id) {
                    timeline.select_track(id, true);
                }
            }
            Ok(None)
        }
    }
}

/// Parses a JSON array of commands and applies them in order, stopping at the
/// first failure. Returns how many commands were applied.
pub fn apply_script(timeline: &mut Timeline, json: &str, now: Instant) -> Result<usize, TimelineError> {
    let commands: Vec<EditCommand> = serde_json::from_str(json)?;
    let total = commands.len();
    for (index, command) in commands.into_iter().enumerate() {
        apply_command(timeline, command, now).map_err(|err| TimelineError::Script {
            index,
            source: Box::new(err),
        })?;
    }
    debug!(total, "edit script applied");
    Ok(total)
}

fn require(timeline: &Timeline, id: TrackId) -> Result<&Track, TimelineError> {
    timeline.track(&id).ok_or(TimelineError::TrackNotFound(id))
}

#[allow(clippy::too_many_arguments)]
fn add_clip(
    timeline: &mut Timeline,
    track_type: TrackType,
    start_frame: Frame,
    duration: Frame,
    row_index: Option<u32>,
    id: Option<TrackId>,
    name: String,
    source: String,
    media_id: Option<String>,
) -> Result<TrackId, TimelineError> {
    if duration <= 0 {
        return Err(TimelineError::InvalidOp(format!("clip duration must be positive, got {duration}")));
    }
    if let Some(id) = id {
        if timeline.track(&id).is_some() {
            return Err(TimelineError::TrackExists(id));
        }
    }

    match (media_id, id) {
        (Some(media_id), None) => {
            let template = MediaTemplate {
                media_id,
                track_type,
                duration_frames: duration,
                name,
                source,
            };
            Ok(timeline.add_from_library(&template, start_frame, row_index))
        }
        (media_id, id) => {
            let row_index = row_index
                .unwrap_or_else(|| crate::get_next_available_row_index(timeline.tracks(), track_type));
            let start = start_frame.max(0);
            let mut track = Track::new(track_type, row_index, start, start + duration);
            if let Some(id) = id {
                track.id = id;
            }
            track.name = name;
            track.source = source;
            track.media_id = media_id;
            Ok(timeline.add_track(track))
        }
    }
}

fn move_track(
    timeline: &mut Timeline,
    track_id: TrackId,
    start_frame: Frame,
    row_index: Option<u32>,
) -> Result<(), TimelineError> {
    let track = require(timeline, track_id)?;
    if track.locked {
        return Err(TimelineError::TrackLocked(track_id));
    }
    let delta = start_frame.max(0) - track.start_frame;
    let mut moves = vec![PlannedMove {
        track_id,
        start_frame: start_frame.max(0),
        row_index: row_index.unwrap_or(track.row_index),
    }];
    if let Some(partner) = track.linked_partner().and_then(|id| timeline.track(&id)) {
        if partner.id != track_id && !partner.locked {
            moves.push(PlannedMove {
                track_id: partner.id,
                start_frame: (partner.start_frame + delta).max(0),
                row_index: partner.row_index,
            });
        }
    }
    timeline.move_tracks(&moves);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::history::ActionLog;

    fn timeline() -> (Timeline, ActionLog) {
        let log = ActionLog::new();
        let timeline =
            Timeline::new(EngineConfig::default(), 30.0, 300).with_recorder(Box::new(log.clone()));
        (timeline, log)
    }

    #[test]
    fn script_runs_commands_in_order() {
        let (mut tl, log) = timeline();
        let a = TrackId::new();
        let script = serde_json::json!([
            {"command": "add_clip", "type": "video", "start_frame": 0, "duration": 100, "row_index": 0, "id": a},
            {"command": "add_clip", "type": "video", "start_frame": 50, "duration": 40, "row_index": 0},
            {"command": "split_track", "track_id": a, "frame": 60},
            {"command": "set_in_point", "frame": 10},
            {"command": "select", "track_ids": [a]}
        ]);
        let applied = apply_script(&mut tl, &script.to_string(), Instant::now()).unwrap();
        assert_eq!(applied, 5);
        assert_eq!(tl.tracks().len(), 3);
        assert_eq!(tl.track(&a).unwrap().end_frame, 60);
        assert_eq!(tl.state().in_point, Some(10));
        assert!(tl.state().selection.is_selected(&a));
        assert_eq!(log.labels(), vec!["Add clip", "Add clip", "Split clip"]);
    }

    #[test]
    fn unknown_track_fails_with_index() {
        let (mut tl, _) = timeline();
        let script = serde_json::json!([
            {"command": "seek", "frame": 20},
            {"command": "set_muted", "track_id": TrackId::new(), "muted": true}
        ]);
        let err = apply_script(&mut tl, &script.to_string(), Instant::now()).unwrap_err();
        match err {
            TimelineError::Script { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, TimelineError::TrackNotFound(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(tl.current_frame(), 20);
    }

    #[test]
    fn move_keeps_linked_partner_in_sync() {
        let (mut tl, _) = timeline();
        let mut video = Track::new(TrackType::Video, 0, 10, 60);
        let mut audio = Track::new(TrackType::Audio, 2, 20, 70);
        crate::link_tracks(&mut video, &mut audio);
        let (v, a) = (video.id, audio.id);
        tl.add_track(video);
        tl.add_track(audio);

        let command = EditCommand::MoveTrack {
            track_id: v,
            start_frame: 110,
            row_index: Some(1),
        };
        apply_command(&mut tl, command, Instant::now()).unwrap();
        let moved = tl.track(&v).unwrap();
        assert_eq!((moved.start_frame, moved.row_index), (110, 1));
        let partner = tl.track(&a).unwrap();
        assert_eq!((partner.start_frame, partner.row_index), (120, 2));
    }

    #[test]
    fn locked_track_rejects_geometry_edits() {
        let (mut tl, _) = timeline();
        let id = tl.add_track(Track::new(TrackType::Video, 0, 0, 100).with_locked(true));
        let now = Instant::now();
        let resize = EditCommand::ResizeTrack {
            track_id: id,
            edge: ResizeEdge::Right,
            frame: 50,
        };
        assert!(matches!(apply_command(&mut tl, resize, now), Err(TimelineError::TrackLocked(_))));
        let split = EditCommand::SplitTrack { track_id: id, frame: 150 };
        assert!(matches!(apply_command(&mut tl, split, now), Err(TimelineError::InvalidOp(_))));
        assert_eq!(tl.track(&id).unwrap().end_frame, 100);
    }

    #[test]
    fn commands_round_trip_through_json() {
        let command = EditCommand::ResizeTrack {
            track_id: TrackId::new(),
            edge: ResizeEdge::Left,
            frame: 12,
        };
        let json = serde_json::to_string(&command).unwrap();
        assert!(json.contains("\"command\":\"resize_track\""));
        assert!(json.contains("\"edge\":\"left\""));
        let parsed: EditCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, command);
    }
}
