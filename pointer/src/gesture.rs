//! Gesture debouncing from buffered hand history.
//!
//! Each hand carries two independent hysteresis flags, one for the closed
//! (grip) posture and one for lasso.  A flag turns on only after a full
//! enter window of matching, mostly high-confidence samples taken while the
//! hand is raised, and turns off after an exit window of clearly different
//! samples or of a fully lost hand.  Compiled without any sensor dependency.

use tracing::debug;

use crate::body::{Hand, RawHandState, TrackingState};
use crate::history::{BodyHistory, InsufficientSamples};
use crate::proximity;

// ── Gesture kinds ──────────────────────────────────────────

/// Debounced hand postures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Fist / grip.
    Closed,
    /// Two fingers extended.
    Lasso,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Lasso => "lasso",
        }
    }

    /// The raw sensor state that counts as evidence for this gesture.
    pub fn raw_state(&self) -> RawHandState {
        match self {
            Self::Closed => RawHandState::Closed,
            Self::Lasso => RawHandState::Lasso,
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Minimum share of high-confidence samples in a window, as an exact
/// fraction so the boundary never flickers on rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceRatio {
    pub numerator: usize,
    pub denominator: usize,
}

impl ConfidenceRatio {
    pub const HALF: ConfidenceRatio = ConfidenceRatio {
        numerator: 1,
        denominator: 2,
    };

    /// `high / window >= numerator / denominator`, cross-multiplied in
    /// `u128` so no `usize` pair can overflow.
    pub fn satisfied_by(&self, high: usize, window: usize) -> bool {
        if window == 0 {
            return false;
        }
        high as u128 * self.denominator as u128 >= self.numerator as u128 * window as u128
    }
}

impl Default for ConfidenceRatio {
    fn default() -> Self {
        Self::HALF
    }
}

/// Window lengths, in frames, for switching a gesture on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub enter: usize,
    pub exit: usize,
}

/// Debounce configuration for both gesture kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    pub closed: Thresholds,
    pub lasso: Thresholds,
    pub high_confidence: ConfidenceRatio,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            closed: Thresholds { enter: 3, exit: 3 },
            lasso: Thresholds { enter: 8, exit: 3 },
            high_confidence: ConfidenceRatio::HALF,
        }
    }
}

impl GestureConfig {
    pub fn thresholds(&self, kind: GestureKind) -> Thresholds {
        match kind {
            GestureKind::Closed => self.closed,
            GestureKind::Lasso => self.lasso,
        }
    }
}

// ── Enter / exit predicates ────────────────────────────────

/// Whether an inactive `kind` should switch on for `hand`.
///
/// Needs `enter` samples in every channel; fewer is simply "no".
pub fn should_enter(
    history: &BodyHistory,
    hand: Hand,
    kind: GestureKind,
    config: &GestureConfig,
) -> bool {
    enter_evidence(history, hand, kind, config).unwrap_or(false)
}

fn enter_evidence(
    history: &BodyHistory,
    hand: Hand,
    kind: GestureKind,
    config: &GestureConfig,
) -> Result<bool, InsufficientSamples> {
    let k = config.thresholds(kind).enter;
    let channels = history.hand(hand);

    // Head and pelvis feed the proximity check and must cover the window too.
    history.head.window(k)?;
    history.pelvis.window(k)?;
    channels.joint.window(k)?;

    let states = channels.state.window(k)?;
    if !states.iter().all(|s| *s == kind.raw_state()) {
        return Ok(false);
    }
    let high = channels.high_confidence_count(k)?;
    if !config.high_confidence.satisfied_by(high, k) {
        return Ok(false);
    }
    Ok(proximity::window_closer_to_head(history, hand, k))
}

/// Whether an active `kind` should switch off for `hand`.
///
/// True when either the last `exit` samples are all tracked, mostly high
/// confidence and show neither `kind` nor an unknown/untracked posture, or
/// the hand joint and its posture are both untracked throughout.
pub fn should_exit(
    history: &BodyHistory,
    hand: Hand,
    kind: GestureKind,
    config: &GestureConfig,
) -> bool {
    exit_evidence(history, hand, kind, config).unwrap_or(false)
}

fn exit_evidence(
    history: &BodyHistory,
    hand: Hand,
    kind: GestureKind,
    config: &GestureConfig,
) -> Result<bool, InsufficientSamples> {
    let k = config.thresholds(kind).exit;
    let channels = history.hand(hand);

    let joints = channels.joint.window(k)?;
    let states = channels.state.window(k)?;
    let high = channels.high_confidence_count(k)?;

    let all_tracked = joints.iter().all(|j| j.tracking == TrackingState::Tracked);
    let confident = config.high_confidence.satisfied_by(high, k);
    let clearly_other = states.iter().all(|s| {
        *s != kind.raw_state() && *s != RawHandState::Unknown && *s != RawHandState::NotTracked
    });

    let all_lost = joints.iter().all(|j| j.tracking == TrackingState::NotTracked);
    let all_untracked_states = states.iter().all(|s| *s == RawHandState::NotTracked);

    Ok((all_tracked && confident && clearly_other) || (all_lost && all_untracked_states))
}

/// Next value of one hysteresis flag.
pub fn debounce(
    active: bool,
    history: &BodyHistory,
    hand: Hand,
    kind: GestureKind,
    config: &GestureConfig,
) -> bool {
    if active {
        !should_exit(history, hand, kind, config)
    } else {
        should_enter(history, hand, kind, config)
    }
}

// ── State ──────────────────────────────────────────────────

/// Both gesture flags for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandGestures {
    pub closed: bool,
    pub lasso: bool,
}

impl HandGestures {
    pub fn get(&self, kind: GestureKind) -> bool {
        match kind {
            GestureKind::Closed => self.closed,
            GestureKind::Lasso => self.lasso,
        }
    }

    fn set(&mut self, kind: GestureKind, active: bool) {
        match kind {
            GestureKind::Closed => self.closed = active,
            GestureKind::Lasso => self.lasso = active,
        }
    }
}

/// A flag flip produced by [`GestureState::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Exited,
}

/// Debounced gesture flags for both hands.
///
/// A plain value: the frame pipeline takes it in, updates it and hands it
/// back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureState {
    left: HandGestures,
    right: HandGestures,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hand(&self, hand: Hand) -> HandGestures {
        match hand {
            Hand::Left => self.left,
            Hand::Right => self.right,
        }
    }

    fn hand_mut(&mut self, hand: Hand) -> &mut HandGestures {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    pub fn is_active(&self, hand: Hand, kind: GestureKind) -> bool {
        self.hand(hand).get(kind)
    }

    /// Run one debounce step for `kind` on `hand` against the current history.
    pub fn update(
        &mut self,
        hand: Hand,
        kind: GestureKind,
        history: &BodyHistory,
        config: &GestureConfig,
    ) -> Option<Transition> {
        let was = self.is_active(hand, kind);
        let now = debounce(was, history, hand, kind, config);
        if was == now {
            return None;
        }
        self.hand_mut(hand).set(kind, now);
        debug!(
            "Gesture {} on {} hand: {}",
            kind.as_str(),
            hand.as_str(),
            if now { "active" } else { "inactive" }
        );
        Some(if now {
            Transition::Entered
        } else {
            Transition::Exited
        })
    }

    /// Force every flag off.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Any flag set on either hand.
    pub fn any_active(&self) -> bool {
        self.left != HandGestures::default() || self.right != HandGestures::default()
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn push_hand(
    history: &mut BodyHistory,
    hand_y: f32,
    tracking: TrackingState,
    confidence: crate::body::Confidence,
    state: RawHandState,
) {
    use crate::body::{BodySample, HandSample, JointSample, Position};

    let tracked = |x: f32, y: f32| JointSample::new(Position::new(x, y, 2.0), TrackingState::Tracked);
    let hand = HandSample {
        joint: JointSample::new(Position::new(0.0, hand_y, 2.0), tracking),
        confidence,
        state,
    };
    history.push(&BodySample {
        tracked: true,
        head: tracked(0.0, 0.0),
        pelvis: tracked(0.0, 1.0),
        left: hand,
        right: HandSample::not_tracked(),
    });
}

// ── Tests ──────────────────────────────────────────────────
