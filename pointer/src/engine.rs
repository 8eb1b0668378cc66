//! Per-frame pipeline: buffer the tracked body, debounce, dispatch.
//!
//! [`process_frame`] is a pure step from prior state and one frame to the
//! next state plus the commands to emit.  [`PointerEngine`] wraps it for
//! callers that prefer to hold the state in one place.

use tracing::{debug, info, trace};

use crate::action::{self, ButtonLatch, CommandBatch, PointerCommand};
use crate::body::{Frame, Hand};
use crate::config::PointerConfig;
use crate::gesture::{GestureKind, GestureState};
use crate::history::BodyHistory;
use crate::ipc::plist::sexp_bool;

/// Everything carried from one frame to the next.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub history: BodyHistory,
    pub gestures: GestureState,
    pub latch: ButtonLatch,
    /// Hand that drags the pointer; the other one clicks.
    pub moving_hand: Hand,
    pub frames_processed: u64,
}

impl EngineState {
    pub fn new(moving_hand: Hand) -> Self {
        Self {
            history: BodyHistory::new(),
            gestures: GestureState::new(),
            latch: ButtonLatch::default(),
            moving_hand,
            frames_processed: 0,
        }
    }

    pub fn clicking_hand(&self) -> Hand {
        self.moving_hand.other()
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new(Hand::Left)
    }
}

/// Advance `state` by one frame.
///
/// With no tracked body every gesture flag is cleared, held buttons are
/// released and both indicators go neutral; the history is left as is.
/// Otherwise the body is appended to every channel and the moving hand is
/// processed before the clicking hand.
pub fn process_frame(
    mut state: EngineState,
    frame: &Frame,
    config: &PointerConfig,
) -> (EngineState, CommandBatch) {
    state.frames_processed += 1;
    let mut batch = CommandBatch::default();

    let Some(body) = frame.first_tracked() else {
        fail_safe(&mut state, &mut batch);
        return (state, batch);
    };

    state.history.push(body);
    let moving = state.moving_hand;
    let clicking = state.clicking_hand();

    batch.moving_indicator = action::drive_moving_hand(
        &mut state.gestures,
        &state.history,
        moving,
        &config.gesture,
        config.screen,
        config.sensitivity,
        &mut batch.pointer,
    );
    batch.clicking_indicator = action::drive_clicking_hand(
        &mut state.gestures,
        &mut state.latch,
        &state.history,
        clicking,
        &config.gesture,
        &mut batch.pointer,
    );

    trace!(
        frame = state.frames_processed,
        commands = batch.pointer.len(),
        "frame processed"
    );
    (state, batch)
}

fn fail_safe(state: &mut EngineState, batch: &mut CommandBatch) {
    if state.gestures.any_active() || state.latch != ButtonLatch::default() {
        debug!("Tracking lost: releasing gestures and buttons");
    }
    state.gestures.reset();
    state.latch.release_all(&mut batch.pointer);
    batch.tracking_lost = true;
}

// ── Engine ─────────────────────────────────────────────────

/// Stateful wrapper around [`process_frame`].
pub struct PointerEngine {
    config: PointerConfig,
    state: EngineState,
}

impl PointerEngine {
    pub fn new(config: PointerConfig) -> Self {
        info!(
            "Pointer engine: {} hand moves, {} hand clicks",
            config.moving_hand.as_str(),
            config.moving_hand.other().as_str()
        );
        Self {
            state: EngineState::new(config.moving_hand),
            config,
        }
    }

    pub fn config(&self) -> &PointerConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn moving_hand(&self) -> Hand {
        self.state.moving_hand
    }

    pub fn is_active(&self, hand: Hand, kind: GestureKind) -> bool {
        self.state.gestures.is_active(hand, kind)
    }

    /// Process one delivered frame to completion.
    pub fn process_frame(&mut self, frame: &Frame) -> CommandBatch {
        let prior = std::mem::take(&mut self.state);
        let (next, batch) = process_frame(prior, frame, &self.config);
        self.state = next;
        batch
    }

    /// Exchange the moving and clicking roles.
    ///
    /// Held buttons are released and both hands' gestures cleared, so the
    /// returned commands must still be delivered.
    pub fn swap_hands(&mut self) -> Vec<PointerCommand> {
        let next = self.state.moving_hand.other();
        self.set_moving_hand(next)
    }

    /// Make `hand` the moving hand.  A no-op if it already is.
    pub fn set_moving_hand(&mut self, hand: Hand) -> Vec<PointerCommand> {
        let mut out = Vec::new();
        if self.state.moving_hand == hand {
            return out;
        }
        self.state.latch.release_all(&mut out);
        self.state.gestures.reset();
        self.state.moving_hand = hand;
        info!("Moving hand is now {}", hand.as_str());
        out
    }

    /// Clear gestures and release buttons without touching history.
    pub fn reset(&mut self) -> Vec<PointerCommand> {
        let mut out = Vec::new();
        self.state.gestures.reset();
        self.state.latch.release_all(&mut out);
        out
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        let g = &self.state.gestures;
        let latch = &self.state.latch;
        format!(
            "(:moving-hand :{} :clicking-hand :{} :frames {} :buffered {} :left (:closed {} :lasso {}) :right (:closed {} :lasso {}) :buttons (:left {} :right {}))",
            self.state.moving_hand.as_str(),
            self.state.clicking_hand().as_str(),
            self.state.frames_processed,
            self.state.history.len(),
            sexp_bool(g.is_active(Hand::Left, GestureKind::Closed)),
            sexp_bool(g.is_active(Hand::Left, GestureKind::Lasso)),
            sexp_bool(g.is_active(Hand::Right, GestureKind::Closed)),
            sexp_bool(g.is_active(Hand::Right, GestureKind::Lasso)),
            sexp_bool(latch.is_down(action::Button::Left)),
            sexp_bool(latch.is_down(action::Button::Right)),
        )
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn frame(left_y: f32, left: crate::body::RawHandState, right: crate::body::RawHandState) -> Frame {
    use crate::body::{BodySample, Confidence, HandSample, JointSample, Position, TrackingState};

    let at = |x: f32, y: f32| JointSample::new(Position::new(x, y, 2.0), TrackingState::Tracked);
    Frame::new(vec![BodySample {
        tracked: true,
        head: at(0.0, 0.0),
        pelvis: at(0.0, 1.0),
        left: HandSample {
            joint: at(0.0, left_y),
            confidence: Confidence::High,
            state: left,
        },
        right: HandSample {
            joint: at(0.0, 0.1),
            confidence: Confidence::High,
            state: right,
        },
    }])
}

// ── Tests ──────────────────────────────────────────────────
