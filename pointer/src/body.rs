//! Skeletal body samples as delivered by the tracking sensor.
//!
//! One `Frame` carries zero or more bodies; each body exposes the head and
//! pelvis joints plus both hands with the sensor's own confidence and
//! per-frame hand-state classification.  Only the first tracked body is
//! ever considered.

// ── Hand ───────────────────────────────────────────────────

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// The opposite hand.
    pub fn other(&self) -> Hand {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Parse "left" or "right".
    pub fn parse(s: &str) -> Option<Hand> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

// ── Per-sample classifications ─────────────────────────────

/// Sensor tracking quality for a single joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingState {
    NotTracked,
    Inferred,
    Tracked,
}

impl TrackingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotTracked => "not-tracked",
            Self::Inferred => "inferred",
            Self::Tracked => "tracked",
        }
    }

    pub fn parse(s: &str) -> Option<TrackingState> {
        match s {
            "not-tracked" => Some(Self::NotTracked),
            "inferred" => Some(Self::Inferred),
            "tracked" => Some(Self::Tracked),
            _ => None,
        }
    }
}

/// Sensor confidence in its hand-state classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    Low,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Confidence> {
        match s {
            "low" => Some(Self::Low),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// The sensor's unfiltered single-frame hand posture.
///
/// Distinct from the debounced gesture state kept by
/// [`crate::gesture::GestureState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawHandState {
    Unknown,
    NotTracked,
    Open,
    Closed,
    Lasso,
}

impl RawHandState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NotTracked => "not-tracked",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Lasso => "lasso",
        }
    }

    pub fn parse(s: &str) -> Option<RawHandState> {
        match s {
            "unknown" => Some(Self::Unknown),
            "not-tracked" => Some(Self::NotTracked),
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "lasso" => Some(Self::Lasso),
            _ => None,
        }
    }
}

// ── Joint and hand samples ─────────────────────────────────

/// Position in sensor-normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One joint in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSample {
    pub position: Position,
    pub tracking: TrackingState,
}

impl JointSample {
    pub fn new(position: Position, tracking: TrackingState) -> Self {
        Self { position, tracking }
    }

    /// A joint the sensor lost entirely.
    pub fn not_tracked() -> Self {
        Self {
            position: Position::default(),
            tracking: TrackingState::NotTracked,
        }
    }
}

/// One hand in one frame: the hand joint plus the sensor's posture guess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSample {
    pub joint: JointSample,
    pub confidence: Confidence,
    pub state: RawHandState,
}

impl HandSample {
    pub fn not_tracked() -> Self {
        Self {
            joint: JointSample::not_tracked(),
            confidence: Confidence::Low,
            state: RawHandState::NotTracked,
        }
    }
}

// ── Body and frame ─────────────────────────────────────────

/// All the joints the pointer pipeline reads from one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySample {
    /// Whether the sensor currently tracks this body slot.
    pub tracked: bool,
    pub head: JointSample,
    /// Spine base.
    pub pelvis: JointSample,
    pub left: HandSample,
    pub right: HandSample,
}

impl BodySample {
    pub fn hand(&self, hand: Hand) -> &HandSample {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }
}

/// One delivered sensor frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub bodies: Vec<BodySample>,
}

impl Frame {
    pub fn new(bodies: Vec<BodySample>) -> Self {
        Self { bodies }
    }

    /// A frame in which the sensor reports nobody.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The first body marked tracked, if any.  Additional bodies are ignored.
    pub fn first_tracked(&self) -> Option<&BodySample> {
        self.bodies.iter().find(|b| b.tracked)
    }
}

#[cfg(test)]
fn test_body(tracked: bool) -> BodySample {
    let joint = JointSample::new(Position::new(0.0, 0.0, 2.0), TrackingState::Tracked);
    let hand = HandSample {
        joint,
        confidence: Confidence::High,
        state: RawHandState::Open,
    };
    BodySample {
        tracked,
        head: joint,
        pelvis: joint,
        left: hand,
        right: hand,
    }
}

// ── Tests ──────────────────────────────────────────────────
