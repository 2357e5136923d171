//! End-to-end editing scenarios against the public timeline API
use std::collections::HashSet;
use std::time::{Duration, Instant};

use timeline::collision::{find_nearest_available_position, has_collision};
use timeline::config::LayoutConfig;
use timeline::geometry::{Point, Rect};
use timeline::selection::find_tracks_in_marquee;
use timeline::*;

fn engine_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.layout = LayoutConfig {
        family_order: vec![TrackType::Video, TrackType::Audio],
        row_height: 40.0,
        audio_row_height: 40.0,
        placeholder_rows: 0,
        ..LayoutConfig::default()
    };
    config.zoom.base_frame_width = 1.0;
    config
}

fn recorded_timeline(total_frames: Frame) -> (Timeline, ActionLog) {
    let log = ActionLog::new();
    let timeline = Timeline::new(engine_config(), 30.0, total_frames).with_recorder(Box::new(log.clone()));
    (timeline, log)
}

#[test]
fn test_collision_is_symmetric() {
    let ranges = [(0, 100), (50, 60), (99, 150), (100, 200), (-10, 0), (150, 151)];
    for &(s1, e1) in &ranges {
        for &(s2, e2) in &ranges {
            let a = vec![Track::new(TrackType::Video, 0, s1, e1)];
            let b = vec![Track::new(TrackType::Video, 0, s2, e2)];
            assert_eq!(
                has_collision(s2, e2, TrackType::Video, 0, &a, &[]),
                has_collision(s1, e1, TrackType::Video, 0, &b, &[]),
                "[{s1}, {e1}) vs [{s2}, {e2})"
            );
        }
    }
}

#[test]
fn test_move_into_occupied_range_is_nudged() {
    let (mut tl, log) = recorded_timeline(300);
    tl.add_track(Track::new(TrackType::Video, 0, 0, 100));
    let b = tl.add_track(Track::new(TrackType::Video, 0, 200, 250));
    log.clear();

    // B has duration 50; desired start 80 collides with A since 80 < 100 && 0 < 130
    assert!(has_collision(80, 130, TrackType::Video, 0, tl.tracks(), &[b]));
    let placed = tl.move_tracks(&[PlannedMove {
        track_id: b,
        start_frame: 80,
        row_index: 0,
    }]);
    assert_eq!(placed, vec![(b, 100, 0)]);

    let track = tl.track(&b).unwrap();
    assert_eq!((track.start_frame, track.end_frame), (100, 150));
    assert!(!has_collision(100, 150, TrackType::Video, 0, tl.tracks(), &[b]));
    assert_eq!(log.labels(), vec!["Move clips"]);
}

#[test]
fn test_placement_never_collides() {
    let mut tracks = vec![
        Track::new(TrackType::Audio, 0, 0, 40),
        Track::new(TrackType::Audio, 0, 60, 90),
        Track::new(TrackType::Audio, 0, 120, 400),
    ];
    for desired in [-20, 0, 35, 41, 55, 100, 119, 200, 399] {
        for duration in [1, 10, 20, 30, 100] {
            for playhead in [None, Some(60), Some(130)] {
                let start = find_nearest_available_position(
                    desired,
                    duration,
                    TrackType::Audio,
                    0,
                    &tracks,
                    &[],
                    playhead,
                );
                assert!(start >= 0);
                assert!(
                    !has_collision(start, start + duration, TrackType::Audio, 0, &tracks, &[]),
                    "desired {desired} duration {duration} landed on {start}"
                );
            }
        }
    }
    // a different row of the same family is unaffected
    tracks.push(Track::new(TrackType::Audio, 1, 0, 500));
    assert_eq!(
        find_nearest_available_position(45, 10, TrackType::Audio, 0, &tracks, &[], None),
        45
    );
}

#[test]
fn test_split_partitions_track_and_linked_partner() {
    let (mut tl, log) = recorded_timeline(300);
    let mut video = Track::new(TrackType::Video, 0, 0, 300);
    let mut audio = Track::new(TrackType::Audio, 0, 0, 300);
    link_tracks(&mut video, &mut audio);
    let (v, a) = (video.id, audio.id);
    tl.add_track(video);
    tl.add_track(audio);
    log.clear();

    let right = tl.split_at_position(120, v).unwrap();
    assert_eq!(tl.tracks().len(), 4);
    assert_eq!(log.labels(), vec!["Split clip"]);

    let ranges = |track_type: TrackType| {
        let mut ranges: Vec<(Frame, Frame)> = tl
            .tracks()
            .iter()
            .filter(|t| t.track_type == track_type)
            .map(|t| (t.start_frame, t.end_frame))
            .collect();
        ranges.sort();
        ranges
    };
    assert_eq!(ranges(TrackType::Video), vec![(0, 120), (120, 300)]);
    assert_eq!(ranges(TrackType::Audio), vec![(0, 120), (120, 300)]);

    // left pieces keep their ids and their link, right pieces are linked to each other
    assert_eq!(tl.track(&v).unwrap().linked_partner(), Some(a));
    let right_partner = tl.track(&right).unwrap().linked_partner().unwrap();
    assert_eq!(tl.track(&right_partner).unwrap().track_type, TrackType::Audio);
    assert_eq!(tl.track(&right_partner).unwrap().start_frame, 120);
}

#[test]
fn test_split_outside_track_is_ignored() {
    let (mut tl, log) = recorded_timeline(300);
    let id = tl.add_track(Track::new(TrackType::Video, 0, 0, 300));
    log.clear();
    assert!(tl.split_at_position(0, id).is_none());
    assert!(tl.split_at_position(300, id).is_none());
    assert_eq!(tl.tracks().len(), 1);
    assert!(log.is_empty());
}

#[test]
fn test_effective_end_frame_follows_furthest_track() {
    let (mut tl, _) = recorded_timeline(300);
    assert_eq!(tl.effective_end_frame(), 300);

    let long = tl.add_track(Track::new(TrackType::Video, 0, 0, 900));
    assert_eq!(tl.effective_end_frame(), 900);
    tl.add_track(Track::new(TrackType::Audio, 0, 0, 500));
    assert_eq!(tl.effective_end_frame(), 900);

    tl.remove_tracks(&[long]);
    assert_eq!(tl.effective_end_frame(), 500);
    tl.remove_tracks(&tl.tracks().iter().map(|t| t.id).collect::<Vec<_>>());
    assert_eq!(tl.effective_end_frame(), 300);
}

#[test]
fn test_marquee_selects_exactly_intersecting_tracks() {
    let (mut tl, _) = recorded_timeline(1000);
    // video-0 spans y 0..40, audio-0 spans y 40..80, 1 px per frame
    let a = tl.add_track(Track::new(TrackType::Video, 0, 0, 100));
    let b = tl.add_track(Track::new(TrackType::Video, 0, 200, 300));
    let c = tl.add_track(Track::new(TrackType::Audio, 0, 100, 150));

    let hits = |rect: Rect| find_tracks_in_marquee(rect, tl.tracks(), tl.row_bounds(), tl.frame_width());
    assert_eq!(
        hits(Rect::from_two_pos(Point::new(100.0, 0.0), Point::new(199.0, 39.0))),
        HashSet::from([a])
    );
    assert_eq!(
        hits(Rect::from_two_pos(Point::new(150.0, 40.0), Point::new(200.0, 40.0))),
        HashSet::from([b, c])
    );
    assert!(hits(Rect::from_two_pos(Point::new(101.0, 0.0), Point::new(199.0, 39.0))).is_empty());
    assert!(hits(Rect::from_two_pos(Point::new(400.0, 0.0), Point::new(500.0, 80.0))).is_empty());
}

#[test]
fn test_playback_stops_on_last_frame() {
    let (mut tl, _) = recorded_timeline(100);
    let mut ctl = InteractionController::new(800.0, 200.0);
    let t0 = Instant::now();
    tl.set_current_frame(90);
    tl.play(t0);

    assert_eq!(ctl.update(&mut tl, t0 + Duration::from_millis(100)), TickOutcome::Advanced(93));
    assert_eq!(ctl.update(&mut tl, t0 + Duration::from_secs(2)), TickOutcome::Stopped(99));
    assert_eq!(tl.current_frame(), 99);
    assert!(!tl.playback().is_playing);
    assert_eq!(ctl.update(&mut tl, t0 + Duration::from_secs(3)), TickOutcome::Idle);
}

#[test]
fn test_playback_wraps_when_looping() {
    let (mut tl, _) = recorded_timeline(100);
    let mut ctl = InteractionController::new(800.0, 200.0);
    let t0 = Instant::now();
    tl.set_looping(true);
    tl.set_current_frame(90);
    tl.play(t0);

    let t1 = t0 + Duration::from_secs(1);
    assert_eq!(ctl.update(&mut tl, t1), TickOutcome::Looped(0));
    assert_eq!(tl.current_frame(), 0);
    assert!(tl.playback().is_playing);
    assert_eq!(ctl.update(&mut tl, t1 + Duration::from_secs(1)), TickOutcome::Advanced(30));
}

#[test]
fn test_playback_rate_and_follow() {
    let (mut tl, _) = recorded_timeline(10_000);
    let mut ctl = InteractionController::new(300.0, 200.0);
    let t0 = Instant::now();
    tl.play(t0);
    tl.set_playback_rate(2.0, t0);
    ctl.update(&mut tl, t0 + Duration::from_secs(10));
    assert_eq!(tl.current_frame(), 600);
    // frame 600 is at x=600, outside the 300 px viewport, so the view pages
    assert!(tl.state().scroll_x > 300.0);

    tl.set_playback_rate(10.0, t0);
    assert_eq!(tl.playback().playback_rate, 4.0);
}

#[test]
fn test_drag_gesture_end_to_end() {
    let (mut tl, log) = recorded_timeline(1000);
    tl.set_snap_enabled(false);
    let a = tl.add_track(Track::new(TrackType::Video, 0, 0, 100));
    let b = tl.add_track(Track::new(TrackType::Video, 0, 400, 450));
    log.clear();

    let mut ctl = InteractionController::new(800.0, 200.0);
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);

    // select both, then drag b far enough left that a would have to start before frame 0
    tl.select_track(a, false);
    tl.select_track(b, true);
    ctl.pointer_down(&mut tl, PointerEvent::new(420.0, 20.0, at(0)));
    ctl.pointer_move(&mut tl, PointerEvent::new(300.0, 20.0, at(16)));
    ctl.pointer_move(&mut tl, PointerEvent::new(100.0, 20.0, at(32)));
    ctl.pointer_up(&mut tl, PointerEvent::new(100.0, 20.0, at(48)));

    // the group stops with a at frame 0 and keeps its spacing
    let (ta, tb) = (tl.track(&a).unwrap(), tl.track(&b).unwrap());
    assert_eq!(ta.start_frame, 0);
    assert_eq!(tb.start_frame - ta.start_frame, 400);
    assert_eq!(log.labels(), vec!["Move clips"]);
    assert_eq!(ctl.state(), &InteractionState::Idle);
}

#[test]
fn test_click_then_grab_does_not_seek_mid_drag() {
    let (mut tl, _) = recorded_timeline(1000);
    tl.set_snap_enabled(false);
    let a = tl.add_track(Track::new(TrackType::Video, 0, 0, 100));
    let mut ctl = InteractionController::new(800.0, 200.0);
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);

    tl.play(at(0));
    ctl.pointer_down(&mut tl, PointerEvent::new(500.0, 20.0, at(0)));
    ctl.pointer_up(&mut tl, PointerEvent::new(500.0, 20.0, at(40)));
    ctl.pointer_down(&mut tl, PointerEvent::new(50.0, 20.0, at(120)));
    ctl.pointer_move(&mut tl, PointerEvent::new(350.0, 20.0, at(200)));
    for ms in [300, 400, 500] {
        ctl.update(&mut tl, at(ms));
    }
    assert!(tl.playback().is_playing);
    assert!(tl.current_frame() < 100);

    ctl.pointer_up(&mut tl, PointerEvent::new(350.0, 20.0, at(520)));
    assert_eq!(tl.track(&a).unwrap().start_frame, 300);
}

#[test]
fn test_inverted_config_ranges_are_rejected() {
    let err = EngineConfig::from_json(r#"{"zoom": {"min_zoom": 5.0, "max_zoom": 1.0}}"#).unwrap_err();
    assert!(matches!(err, TimelineError::InvalidConfig(_)));
    let err = EngineConfig::from_json(r#"{"playback": {"min_rate": 4.0, "max_rate": 0.25}}"#).unwrap_err();
    assert!(err.to_string().contains("playback rate"));
}

#[test]
fn test_drop_payload_to_track() {
    let (mut tl, log) = recorded_timeline(300);
    let library = |id: &str| {
        (id == "interview").then(|| MediaTemplate {
            media_id: id.to_string(),
            track_type: TrackType::Audio,
            duration_frames: 120,
            name: "Interview".into(),
            source: "interview.wav".into(),
        })
    };
    tl.add_track(Track::new(TrackType::Audio, 0, 0, 60));
    log.clear();

    let id = tl
        .accept_drop(r#"{"mediaId":"interview","targetFrame":30,"targetRowIndex":0}"#, library)
        .unwrap();
    let track = tl.track(&id).unwrap();
    assert_eq!((track.row_index, track.start_frame, track.end_frame), (0, 60, 180));
    assert_eq!(track.media_id.as_deref(), Some("interview"));
    assert!(tl.accept_drop("{ broken", library).is_none());
    assert_eq!(log.labels(), vec!["Add clip"]);
}

#[test]
fn test_snapshot_round_trip_through_json() {
    let (mut tl, _) = recorded_timeline(300);
    let mut video = Track::new(TrackType::Video, 0, 10, 200).with_name("A-roll");
    let mut audio = Track::new(TrackType::Audio, 1, 10, 200);
    link_tracks(&mut video, &mut audio);
    tl.add_track(video.clone());
    tl.add_track(audio.clone());
    tl.add_marker(Marker::new(50, "cue"));
    tl.set_out_point(Some(250));

    let json = tl.snapshot().to_json().unwrap();
    let restored = Timeline::from_snapshot(engine_config(), TimelineSnapshot::from_json(&json).unwrap());
    assert_eq!(restored.tracks().len(), 2);
    assert_eq!(restored.track(&video.id).unwrap().linked_partner(), Some(audio.id));
    assert_eq!(restored.state().out_point, Some(250));
    assert_eq!(restored.state().visible_track_rows, tl.state().visible_track_rows);
    assert_eq!(restored.markers().len(), 1);
}
