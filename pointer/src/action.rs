//! Turning debounced gestures into pointer commands.
//!
//! The moving hand drags the pointer while its grip is held; the clicking
//! hand holds the left button with a grip and the right button with a lasso.
//! Button output is edge-triggered through [`ButtonLatch`], so a held
//! gesture produces exactly one down and one up.

use tracing::{debug, trace};

use crate::body::{Hand, RawHandState, TrackingState};
use crate::gesture::{GestureConfig, GestureKind, GestureState};
use crate::history::BodyHistory;
use crate::proximity;

// ── Commands ───────────────────────────────────────────────

/// Physical pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
}

impl Button {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// One pointer-injection call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerCommand {
    /// Relative motion in target pixels, Y already pointing down.
    Move { dx: i32, dy: i32 },
    ButtonDown(Button),
    ButtonUp(Button),
}

// ── Indicators ─────────────────────────────────────────────

/// Which on-screen indicator a colour is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorSlot {
    MovingHand,
    ClickingHand,
}

impl IndicatorSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MovingHand => "moving-hand",
            Self::ClickingHand => "clicking-hand",
        }
    }
}

/// Feedback colour for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorColor {
    /// Nobody tracked.
    Neutral,
    /// The gesture is held.
    Active(GestureKind),
    /// The hand joint is lost or only inferred.
    Warning,
    /// Hand raised and tracked, gesture not held.
    Ready(GestureKind),
    /// Hand tracked but lowered.
    OutOfPosition,
}

impl IndicatorColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Active(GestureKind::Closed) => "active-closed",
            Self::Active(GestureKind::Lasso) => "active-lasso",
            Self::Warning => "warning",
            Self::Ready(GestureKind::Closed) => "ready-closed",
            Self::Ready(GestureKind::Lasso) => "ready-lasso",
            Self::OutOfPosition => "out-of-position",
        }
    }
}

/// Indicator colour for `hand`, derived from its gesture flag and the
/// newest buffered sample.
pub fn indicator(active: bool, kind: GestureKind, history: &BodyHistory, hand: Hand) -> IndicatorColor {
    if active {
        return IndicatorColor::Active(kind);
    }
    match history.hand(hand).joint.latest() {
        None => IndicatorColor::Warning,
        Some(j) if j.tracking != TrackingState::Tracked => IndicatorColor::Warning,
        Some(_) if proximity::latest_closer_to_head(history, hand) => IndicatorColor::Ready(kind),
        Some(_) => IndicatorColor::OutOfPosition,
    }
}

// ── Command batch ──────────────────────────────────────────

/// Everything one frame asks the outside world to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBatch {
    /// Pointer calls, in emission order.
    pub pointer: Vec<PointerCommand>,
    pub moving_indicator: IndicatorColor,
    pub clicking_indicator: IndicatorColor,
    /// The frame had no tracked body and state was reset.
    pub tracking_lost: bool,
}

impl Default for CommandBatch {
    fn default() -> Self {
        Self {
            pointer: Vec::new(),
            moving_indicator: IndicatorColor::Neutral,
            clicking_indicator: IndicatorColor::Neutral,
            tracking_lost: false,
        }
    }
}

impl CommandBatch {
    /// Both indicators with their slots.
    pub fn indicators(&self) -> [(IndicatorSlot, IndicatorColor); 2] {
        [
            (IndicatorSlot::MovingHand, self.moving_indicator),
            (IndicatorSlot::ClickingHand, self.clicking_indicator),
        ]
    }

    pub fn button_downs(&self) -> impl Iterator<Item = Button> + '_ {
        self.pointer.iter().filter_map(|c| match c {
            PointerCommand::ButtonDown(b) => Some(*b),
            _ => None,
        })
    }

    pub fn button_ups(&self) -> impl Iterator<Item = Button> + '_ {
        self.pointer.iter().filter_map(|c| match c {
            PointerCommand::ButtonUp(b) => Some(*b),
            _ => None,
        })
    }

    pub fn moves(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.pointer.iter().filter_map(|c| match c {
            PointerCommand::Move { dx, dy } => Some((*dx, *dy)),
            _ => None,
        })
    }
}

// ── Button latch ───────────────────────────────────────────

/// Which buttons are currently held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonLatch {
    left: bool,
    right: bool,
}

impl ButtonLatch {
    pub fn is_down(&self, button: Button) -> bool {
        match button {
            Button::Left => self.left,
            Button::Right => self.right,
        }
    }

    fn slot(&mut self, button: Button) -> &mut bool {
        match button {
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
        }
    }

    /// Emit a down only if `button` is not already held.
    pub fn press(&mut self, button: Button, out: &mut Vec<PointerCommand>) {
        let held = self.slot(button);
        if !*held {
            *held = true;
            debug!("Button {} down", button.as_str());
            out.push(PointerCommand::ButtonDown(button));
        }
    }

    /// Emit an up only if `button` is held.
    pub fn release(&mut self, button: Button, out: &mut Vec<PointerCommand>) {
        let held = self.slot(button);
        if *held {
            *held = false;
            debug!("Button {} up", button.as_str());
            out.push(PointerCommand::ButtonUp(button));
        }
    }

    pub fn release_all(&mut self, out: &mut Vec<PointerCommand>) {
        self.release(Button::Left, out);
        self.release(Button::Right, out);
    }
}

// ── Movement ───────────────────────────────────────────────

/// Target surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ScreenSize {
    /// Parse a "WxH" resolution string.
    pub fn parse(s: &str) -> Option<ScreenSize> {
        let (w, h) = s.split_once('x')?;
        let width = w.trim().parse::<u32>().ok()?;
        let height = h.trim().parse::<u32>().ok()?;
        if width > 0 && height > 0 {
            Some(Self { width, height })
        } else {
            None
        }
    }
}

/// Per-axis gain applied to normalized hand motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub x: f32,
    pub y: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self { x: 1.0, y: 1.5 }
    }
}

/// Pixel delta between the two newest hand samples, or `None` with fewer
/// than two buffered.  Y is inverted; both axes truncate toward zero.
pub fn movement_delta(
    history: &BodyHistory,
    hand: Hand,
    screen: ScreenSize,
    sensitivity: Sensitivity,
) -> Option<(i32, i32)> {
    let pair = history.hand(hand).joint.window(2).ok()?;
    let (current, previous) = (pair[0].position, pair[1].position);
    let x = current.x - previous.x;
    let y = current.y - previous.y;
    let dx = (x * screen.width as f32 * sensitivity.x) as i32;
    let dy = (y * -(screen.height as f32) * sensitivity.y) as i32;
    Some((dx, dy))
}

/// Moving-hand step: debounce its grip and, while held, emit motion.
///
/// Returns the hand's indicator colour.
pub fn drive_moving_hand(
    gestures: &mut GestureState,
    history: &BodyHistory,
    hand: Hand,
    config: &GestureConfig,
    screen: ScreenSize,
    sensitivity: Sensitivity,
    out: &mut Vec<PointerCommand>,
) -> IndicatorColor {
    gestures.update(hand, GestureKind::Closed, history, config);
    let active = gestures.is_active(hand, GestureKind::Closed);
    if active {
        if let Some((dx, dy)) = movement_delta(history, hand, screen, sensitivity) {
            trace!(dx, dy, "pointer move");
            out.push(PointerCommand::Move { dx, dy });
        }
    }
    indicator(active, GestureKind::Closed, history, hand)
}

/// Clicking-hand step: grip holds left, lasso holds right, neither releases.
///
/// Grip wins when both are held.  Buttons are only released once neither
/// gesture is held, so a lasso press survives a grip entering on top of it.
/// Returns the hand's indicator colour.
pub fn drive_clicking_hand(
    gestures: &mut GestureState,
    latch: &mut ButtonLatch,
    history: &BodyHistory,
    hand: Hand,
    config: &GestureConfig,
    out: &mut Vec<PointerCommand>,
) -> IndicatorColor {
    gestures.update(hand, GestureKind::Closed, history, config);
    gestures.update(hand, GestureKind::Lasso, history, config);

    if gestures.is_active(hand, GestureKind::Closed) {
        latch.press(Button::Left, out);
        IndicatorColor::Active(GestureKind::Closed)
    } else if gestures.is_active(hand, GestureKind::Lasso) {
        latch.press(Button::Right, out);
        IndicatorColor::Active(GestureKind::Lasso)
    } else {
        latch.release_all(out);
        let kind = match history.hand(hand).state.latest() {
            Some(RawHandState::Lasso) => GestureKind::Lasso,
            _ => GestureKind::Closed,
        };
        indicator(false, kind, history, hand)
    }
}

#[cfg(test)]
fn push_frame(history: &mut BodyHistory, x: f32, y: f32, tracking: TrackingState, state: RawHandState) {
    use crate::body::{BodySample, Confidence, HandSample, JointSample, Position};

    let fixed = |y: f32| JointSample::new(Position::new(0.0, y, 2.0), TrackingState::Tracked);
    let hand = HandSample {
        joint: JointSample::new(Position::new(x, y, 2.0), tracking),
        confidence: Confidence::High,
        state,
    };
    history.push(&BodySample {
        tracked: true,
        head: fixed(0.0),
        pelvis: fixed(1.0),
        left: hand,
        right: hand,
    });
}

// ── Tests ──────────────────────────────────────────────────
