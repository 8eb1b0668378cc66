//! Whole-pipeline scenarios driven through the public engine API.

use skel_pointer::action::{Button, IndicatorColor, IndicatorSlot, PointerCommand};
use skel_pointer::body::{
    BodySample, Confidence, Frame, Hand, HandSample, JointSample, Position, RawHandState, TrackingState,
};
use skel_pointer::config::PointerConfig;
use skel_pointer::engine::PointerEngine;
use skel_pointer::gesture::GestureKind;
use skel_pointer::ipc::codec::encode_frame;
use skel_pointer::replay::{self, ReplayOptions};
use skel_pointer::sink::{apply_batch, RecordingSink};

fn tracked(x: f32, y: f32) -> JointSample {
    JointSample::new(Position::new(x, y, 2.0), TrackingState::Tracked)
}

fn hand_at(x: f32, y: f32, state: RawHandState) -> HandSample {
    HandSample {
        joint: tracked(x, y),
        confidence: Confidence::High,
        state,
    }
}

/// Head at (0,0), pelvis at (0,1); both hands raised near the head.
fn body(left: HandSample, right: HandSample) -> Frame {
    Frame::new(vec![BodySample {
        tracked: true,
        head: tracked(0.0, 0.0),
        pelvis: tracked(0.0, 1.0),
        left,
        right,
    }])
}

fn clicking(state: RawHandState) -> Frame {
    body(hand_at(0.0, 0.1, RawHandState::Open), hand_at(0.0, 0.1, state))
}

fn engine() -> PointerEngine {
    PointerEngine::new(PointerConfig::default())
}

fn run_frames(engine: &mut PointerEngine, frames: &[Frame], sink: &mut RecordingSink) {
    for frame in frames {
        let batch = engine.process_frame(frame);
        apply_batch(sink, &batch).unwrap();
    }
}

#[test]
fn test_closed_enters_on_third_frame() {
    let mut e = engine();
    let frame = clicking(RawHandState::Closed);

    let first = e.process_frame(&frame);
    assert!(first.pointer.is_empty());
    let second = e.process_frame(&frame);
    assert!(second.pointer.is_empty());
    assert!(!e.is_active(Hand::Right, GestureKind::Closed));

    let third = e.process_frame(&frame);
    assert!(e.is_active(Hand::Right, GestureKind::Closed));
    assert_eq!(third.pointer, vec![PointerCommand::ButtonDown(Button::Left)]);
    assert_eq!(third.clicking_indicator, IndicatorColor::Active(GestureKind::Closed));
}

#[test]
fn test_button_down_fires_once_while_held() {
    let mut e = engine();
    let mut sink = RecordingSink::new();
    run_frames(&mut e, &vec![clicking(RawHandState::Closed); 12], &mut sink);

    let downs = sink
        .pointer_commands()
        .into_iter()
        .filter(|c| *c == PointerCommand::ButtonDown(Button::Left))
        .count();
    assert_eq!(downs, 1);
    assert!(e.state().latch.is_down(Button::Left));
}

#[test]
fn test_open_hand_exits_and_releases_once() {
    let mut e = engine();
    let mut sink = RecordingSink::new();
    run_frames(&mut e, &vec![clicking(RawHandState::Closed); 3], &mut sink);
    assert!(e.is_active(Hand::Right, GestureKind::Closed));

    let open = clicking(RawHandState::Open);
    assert!(e.process_frame(&open).pointer.is_empty());
    assert!(e.process_frame(&open).pointer.is_empty());
    let third = e.process_frame(&open);
    assert_eq!(third.pointer, vec![PointerCommand::ButtonUp(Button::Left)]);
    assert_eq!(third.button_ups().collect::<Vec<_>>(), vec![Button::Left]);
    assert!(!e.is_active(Hand::Right, GestureKind::Closed));

    run_frames(&mut e, &vec![open; 5], &mut sink);
    assert!(sink.pointer_commands().iter().all(|c| *c != PointerCommand::ButtonUp(Button::Left)));
}

#[test]
fn test_untracked_hand_never_grips() {
    let lost = HandSample {
        joint: JointSample::new(Position::new(0.0, 0.1, 2.0), TrackingState::NotTracked),
        confidence: Confidence::High,
        state: RawHandState::NotTracked,
    };
    let mut e = engine();
    for _ in 0..8 {
        let batch = e.process_frame(&body(hand_at(0.0, 0.1, RawHandState::Open), lost));
        assert!(batch.pointer.is_empty());
        assert_eq!(batch.clicking_indicator, IndicatorColor::Warning);
    }
    assert!(!e.is_active(Hand::Right, GestureKind::Closed));
}

#[test]
fn test_untracked_hand_drops_active_grip() {
    let lost = HandSample {
        joint: JointSample::new(Position::default(), TrackingState::NotTracked),
        confidence: Confidence::Low,
        state: RawHandState::NotTracked,
    };
    let mut e = engine();
    let mut sink = RecordingSink::new();
    run_frames(&mut e, &vec![clicking(RawHandState::Closed); 3], &mut sink);
    run_frames(
        &mut e,
        &vec![body(hand_at(0.0, 0.1, RawHandState::Open), lost); 3],
        &mut sink,
    );
    assert!(!e.is_active(Hand::Right, GestureKind::Closed));
    assert_eq!(
        sink.pointer_commands(),
        vec![
            PointerCommand::ButtonDown(Button::Left),
            PointerCommand::ButtonUp(Button::Left),
        ]
    );
}

#[test]
fn test_horizontal_move_scales_to_screen() {
    let mut e = engine();
    let grip = |x: f32| body(hand_at(x, 0.1, RawHandState::Closed), hand_at(0.0, 0.1, RawHandState::Open));
    for _ in 0..3 {
        e.process_frame(&grip(0.0));
    }
    assert!(e.is_active(Hand::Left, GestureKind::Closed));

    let batch = e.process_frame(&grip(0.1));
    assert_eq!(batch.moves().collect::<Vec<_>>(), vec![(192, 0)]);
    assert_eq!(batch.moving_indicator, IndicatorColor::Active(GestureKind::Closed));
}

#[test]
fn test_vertical_move_is_inverted() {
    let mut e = engine();
    let grip = |y: f32| body(hand_at(0.0, y, RawHandState::Closed), hand_at(0.0, 0.1, RawHandState::Open));
    for _ in 0..3 {
        e.process_frame(&grip(0.1));
    }
    let batch = e.process_frame(&grip(0.2));
    assert_eq!(batch.moves().collect::<Vec<_>>(), vec![(0, -162)]);
}

#[test]
fn test_closed_outranks_lasso() {
    // A longer lasso exit window keeps lasso held while the grip enters.
    let config = PointerConfig::from_sexp("(:lasso-exit 4)").unwrap();
    let mut e = PointerEngine::new(config);
    let mut sink = RecordingSink::new();

    run_frames(&mut e, &vec![clicking(RawHandState::Lasso); 8], &mut sink);
    assert!(e.is_active(Hand::Right, GestureKind::Lasso));
    assert_eq!(sink.pointer_commands(), vec![PointerCommand::ButtonDown(Button::Right)]);

    let closed = clicking(RawHandState::Closed);
    e.process_frame(&closed);
    e.process_frame(&closed);
    let both = e.process_frame(&closed);
    assert!(e.is_active(Hand::Right, GestureKind::Closed));
    assert!(e.is_active(Hand::Right, GestureKind::Lasso));
    assert_eq!(both.pointer, vec![PointerCommand::ButtonDown(Button::Left)]);
    assert!(e.state().latch.is_down(Button::Right));

    let after = e.process_frame(&closed);
    assert!(!e.is_active(Hand::Right, GestureKind::Lasso));
    assert!(after.pointer.is_empty());

    // Both buttons come up together once the grip is let go.
    let open = clicking(RawHandState::Open);
    e.process_frame(&open);
    e.process_frame(&open);
    let released = e.process_frame(&open);
    assert_eq!(
        released.pointer,
        vec![
            PointerCommand::ButtonUp(Button::Left),
            PointerCommand::ButtonUp(Button::Right),
        ]
    );
}

#[test]
fn test_lost_body_releases_everything() {
    let mut e = engine();
    let mut sink = RecordingSink::new();
    run_frames(&mut e, &vec![clicking(RawHandState::Closed); 3], &mut sink);

    let batch = e.process_frame(&Frame::empty());
    assert!(batch.tracking_lost);
    assert_eq!(batch.pointer, vec![PointerCommand::ButtonUp(Button::Left)]);
    assert_eq!(batch.moving_indicator, IndicatorColor::Neutral);
    assert_eq!(batch.clicking_indicator, IndicatorColor::Neutral);
    assert!(!e.is_active(Hand::Right, GestureKind::Closed));
}

#[test]
fn test_lowered_hand_shows_out_of_position() {
    let mut e = engine();
    let batch = e.process_frame(&body(
        hand_at(0.0, 0.9, RawHandState::Open),
        hand_at(0.0, 0.1, RawHandState::Lasso),
    ));
    assert_eq!(batch.moving_indicator, IndicatorColor::OutOfPosition);
    assert_eq!(batch.clicking_indicator, IndicatorColor::Ready(GestureKind::Lasso));
}

#[test]
fn test_replay_script_end_to_end() {
    let closed = clicking(RawHandState::Closed);
    let open = clicking(RawHandState::Open);
    let mut lines: Vec<String> = Vec::new();
    for (id, frame) in [&closed, &closed, &closed, &open, &open, &open].iter().enumerate() {
        lines.push(encode_frame(id as i64, frame));
    }
    lines.push("(:type :status :id 99)".to_string());
    let input = lines.join("\n");

    let mut e = engine();
    let mut sink = RecordingSink::new();
    let mut out = Vec::new();
    let stats = replay::run(&mut e, input.as_bytes(), &mut sink, &mut out, ReplayOptions::default()).unwrap();

    assert_eq!(stats.frames, 6);
    assert_eq!(stats.errors, 0);
    assert_eq!(
        sink.pointer_commands(),
        vec![
            PointerCommand::ButtonDown(Button::Left),
            PointerCommand::ButtonUp(Button::Left),
        ]
    );
    assert_eq!(
        sink.last_indicator(IndicatorSlot::ClickingHand),
        Some(IndicatorColor::Ready(GestureKind::Closed))
    );
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains(":frames 6"));
}
