use ranges::{
    Edge, PlaybackHost, RangeDescriptor, RangeEvent, RangeSpan, RangeTarget, RangesConfig,
    RangesSession, TrackGeometry,
};

/// Deterministic playback host: time only changes through `seek` or direct
/// assignment, every seek is recorded.
struct ManualPlayer {
    duration: f64,
    time: f64,
    playing: bool,
    seeks: Vec<f64>,
}

impl ManualPlayer {
    fn new(duration: f64) -> Self {
        Self {
            duration,
            time: 0.0,
            playing: false,
            seeks: Vec::new(),
        }
    }
}

impl PlaybackHost for ManualPlayer {
    fn duration(&self) -> f64 {
        self.duration
    }
    fn current_time(&self) -> f64 {
        self.time
    }
    fn seek(&mut self, t: f64) {
        self.time = t;
        self.seeks.push(t);
    }
    fn play(&mut self) {
        self.playing = true;
    }
    fn pause(&mut self) {
        self.playing = false;
    }
    fn paused(&self) -> bool {
        !self.playing
    }
}

/// Track mapped 1:1 onto a 100s domain: page X equals seconds.
fn track() -> TrackGeometry {
    TrackGeometry::new(0.0, 100.0, 0.0)
}

fn editable(start: f64, end: f64) -> RangeDescriptor {
    RangeDescriptor::new(start, end).editable(true)
}

#[test]
fn edge_drag_pauses_pins_and_restores() {
    let mut player = ManualPlayer::new(100.0);
    player.playing = true;
    player.time = 12.0;
    let (mut session, rx) = RangesSession::new(player, track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();
    session.add_range(&editable(20.0, 30.0)).unwrap();

    assert!(session.begin_edge_drag(a, Edge::End));
    assert!(session.player().paused());

    // blocked by the touching neighbor: the edge holds at 20
    session.pointer_move(25.0);
    assert_eq!(session.registry().get(&a).unwrap().span, RangeSpan::new(10.0, 20.0));
    // play head stays pinned at the captured time
    assert_eq!(session.player().current_time(), 12.0);

    session.pointer_move(15.0);
    assert_eq!(session.registry().get(&a).unwrap().span, RangeSpan::new(10.0, 15.0));

    session.pointer_up();
    assert!(!session.player().paused());
    assert!(!session.dragging());

    let events: Vec<RangeEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![RangeEvent::MoveStarted { id: a }, RangeEvent::Moved { id: a }]
    );
}

#[test]
fn body_drag_keeps_the_grab_point_and_emits_moving() {
    let (mut session, rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();

    // grabbed 4px into the body
    assert!(session.begin_body_drag(a, 14.0));
    session.pointer_move(34.0);
    assert_eq!(session.registry().get(&a).unwrap().span, RangeSpan::new(30.0, 40.0));
    session.pointer_up();

    let events: Vec<RangeEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            RangeEvent::MoveStarted { id: a },
            RangeEvent::Moving { id: a },
            RangeEvent::Moved { id: a },
        ]
    );
}

#[test]
fn body_drag_reverts_host_seeks() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();
    session.player_mut().time = 50.0;

    assert!(session.begin_body_drag(a, 14.0));
    session.player_mut().seek(70.0);
    session.on_seek_attempted();
    assert_eq!(session.player().current_time(), 50.0);

    session.pointer_up();
    // released: seeks pass through again
    session.player_mut().seek(70.0);
    session.on_seek_attempted();
    assert_eq!(session.player().current_time(), 70.0);
}

#[test]
fn only_one_drag_session_at_a_time() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();
    let b = session.add_range(&editable(30.0, 40.0)).unwrap();

    assert!(session.begin_body_drag(a, 12.0));
    assert!(!session.begin_edge_drag(b, Edge::Start));
    assert!(!session.begin_body_drag(b, 32.0));
    session.pointer_up();
    assert!(session.begin_edge_drag(b, Edge::Start));
}

#[test]
fn stray_pointer_up_is_a_noop() {
    let (mut session, rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    session.pointer_up();
    session.pointer_move(50.0);
    assert!(!session.dragging());
    assert!(rx.try_iter().next().is_none());
}

#[test]
fn non_editable_ranges_refuse_drags() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    let a = session.add_range(&RangeDescriptor::new(10.0, 20.0)).unwrap();
    assert!(!session.begin_edge_drag(a, Edge::End));
    assert!(!session.begin_body_drag(a, 12.0));
}

#[test]
fn loop_wraps_breaks_and_disarms_on_pause() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();

    assert!(session.arm_loop(a));
    assert_eq!(session.player().current_time(), 10.0);

    // advancing into the guard band wraps back to the start
    session.player_mut().time = 19.85;
    session.on_time_advance();
    assert_eq!(session.player().current_time(), 10.0);

    // a user seek past the guard band breaks the loop
    session.player_mut().time = 19.9;
    session.on_seek_attempted();
    assert!(session.loop_span().is_none());

    assert!(session.arm_loop(a));
    session.on_pause();
    assert!(session.loop_span().is_none());
}

#[test]
fn loop_keeps_its_snapshot_when_the_range_moves() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();
    assert!(session.arm_loop(a));

    session.move_body_to(a, 50.0).unwrap();
    let looped = session.loop_span().unwrap();
    assert_eq!((looped.start, looped.end), (10.0, 20.0));
}

#[test]
fn arming_a_loop_on_an_unknown_range_fails() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();
    session.remove_ranges(&[a]);
    assert!(!session.arm_loop(a));
}

#[test]
fn navigation_seeks_and_respects_hysteresis() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    for (s, e) in [(5.0, 9.0), (15.0, 19.0), (25.0, 29.0)] {
        session.add_range(&RangeDescriptor::new(s, e)).unwrap();
    }

    session.player_mut().time = 16.0;
    assert!(session.next().is_some());
    assert_eq!(session.player().current_time(), 25.0);

    // stepping back twice walks through the ranges instead of sticking
    assert!(session.previous().is_some());
    assert_eq!(session.player().current_time(), 15.0);
    assert!(session.previous().is_some());
    assert_eq!(session.player().current_time(), 5.0);
    assert!(session.previous().is_none());
}

#[test]
fn goto_range_by_position_and_id() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    session.add_range(&RangeDescriptor::new(40.0, 45.0)).unwrap();
    let b = session.add_range(&RangeDescriptor::new(10.0, 15.0)).unwrap();

    session.goto_range(RangeTarget::First).unwrap();
    assert_eq!(session.player().current_time(), 10.0);
    session.goto_range(RangeTarget::Last).unwrap();
    assert_eq!(session.player().current_time(), 40.0);
    session.goto_range(RangeTarget::Id(b)).unwrap();
    assert_eq!(session.player().current_time(), 10.0);
}

#[test]
fn config_skips_invalid_descriptors_without_aborting() {
    let config = RangesConfig {
        duration: Some(100.0),
        ranges: vec![
            RangeDescriptor::new(5.0, 10.0),
            RangeDescriptor::new(8.0, 3.0),
            RangeDescriptor::new(9.0, 12.0),
            RangeDescriptor::new(30.0, 40.0),
        ],
    };
    let (session, _rx) = RangesSession::with_config(ManualPlayer::new(100.0), track(), &config);
    let starts: Vec<f64> = session.ranges().map(|r| r.span.start).collect();
    assert_eq!(starts, vec![5.0, 30.0]);
}

#[test]
fn programmatic_body_move_snaps_past_a_blocker_ahead() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(40.0), track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();
    session.add_range(&editable(25.0, 30.0)).unwrap();

    let span = session.move_body_to(a, 22.0).unwrap();
    assert_eq!(span, RangeSpan::new(30.0, 40.0));
    assert_eq!(session.registry().get(&a).unwrap().span, span);
}

#[test]
fn registry_stays_consistent_through_mixed_operations() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(100.0), track());
    let a = session.add_range(&editable(0.0, 10.0)).unwrap();
    let b = session.add_range(&editable(20.0, 30.0)).unwrap();
    let c = session.add_range(&editable(40.0, 55.0)).unwrap();

    session.move_body_to(a, 18.0).unwrap();
    session.move_edge_to(b, Edge::End, 95.0).unwrap();
    session.move_body_to(c, 90.0).unwrap();
    session.move_edge_to(a, Edge::Start, -5.0).unwrap();

    let ranges: Vec<RangeSpan> = session.ranges().map(|r| r.span).collect();
    for r in &ranges {
        assert!(r.start < r.end);
        assert!(r.start >= 0.0 && r.end <= 100.0);
    }
    for (i, r) in ranges.iter().enumerate() {
        for other in &ranges[i + 1..] {
            assert!(!r.overlaps(other), "{r:?} overlaps {other:?}");
        }
    }
}

#[test]
fn drags_hold_position_before_metadata_loads() {
    let (mut session, _rx) = RangesSession::new(ManualPlayer::new(f64::NAN), track());
    let a = session.add_range(&editable(10.0, 20.0)).unwrap();

    assert!(session.begin_body_drag(a, 12.0));
    session.pointer_move(80.0);
    assert_eq!(session.registry().get(&a).unwrap().span, RangeSpan::new(10.0, 20.0));
    session.pointer_up();
}
