//! Fixed-capacity sample history for the tracked joints.
//!
//! Every channel is a bounded FIFO: pushing past capacity evicts the oldest
//! sample, and that is the only way samples ever leave.  Windows are read
//! newest first.

use std::collections::VecDeque;

use crate::body::{BodySample, Confidence, Hand, JointSample, RawHandState};

/// Number of frames kept per channel.
pub const CHANNEL_CAPACITY: usize = 8;

/// A window query asked for more samples than are buffered.
///
/// Callers inside the pipeline read this as "condition not satisfied".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("window of {requested} samples requested, {available} buffered")]
pub struct InsufficientSamples {
    pub requested: usize,
    pub available: usize,
}

// ── Channel ────────────────────────────────────────────────

/// Bounded sliding window over one sample type.
#[derive(Debug, Clone)]
pub struct Channel<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> Channel<T> {
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append at the tail, then evict from the head while over capacity.
    pub fn push(&mut self, sample: T) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// The last `k` samples, newest first.
    pub fn window(&self, k: usize) -> Result<Vec<T>, InsufficientSamples> {
        if self.samples.len() < k {
            return Err(InsufficientSamples {
                requested: k,
                available: self.samples.len(),
            });
        }
        Ok(self.samples.iter().rev().take(k).copied().collect())
    }

    /// The current frame's sample.
    pub fn latest(&self) -> Option<T> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Copy> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Per-hand channels ──────────────────────────────────────

/// The three channels recorded for each hand.
#[derive(Debug, Clone, Default)]
pub struct HandChannels {
    pub joint: Channel<JointSample>,
    pub confidence: Channel<Confidence>,
    pub state: Channel<RawHandState>,
}

impl HandChannels {
    /// Samples available across all three channels.
    pub fn len(&self) -> usize {
        self.joint
            .len()
            .min(self.confidence.len())
            .min(self.state.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `High` samples among the last `k` confidence samples.
    pub fn high_confidence_count(&self, k: usize) -> Result<usize, InsufficientSamples> {
        Ok(self
            .confidence
            .window(k)?
            .into_iter()
            .filter(|c| *c == Confidence::High)
            .count())
    }
}

// ── Body history ───────────────────────────────────────────

/// All eight channels of one tracked body, appended and trimmed together.
#[derive(Debug, Clone, Default)]
pub struct BodyHistory {
    pub head: Channel<JointSample>,
    pub pelvis: Channel<JointSample>,
    left: HandChannels,
    right: HandChannels,
}

impl BodyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame of the tracked body into every channel.
    pub fn push(&mut self, body: &BodySample) {
        self.head.push(body.head);
        self.pelvis.push(body.pelvis);
        for hand in [Hand::Left, Hand::Right] {
            let sample = body.hand(hand);
            let channels = self.hand_mut(hand);
            channels.joint.push(sample.joint);
            channels.confidence.push(sample.confidence);
            channels.state.push(sample.state);
        }
    }

    pub fn hand(&self, hand: Hand) -> &HandChannels {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    fn hand_mut(&mut self, hand: Hand) -> &mut HandChannels {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    /// Frames currently buffered.
    pub fn len(&self) -> usize {
        self.head.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }
}

#[cfg(test)]
fn test_body(x: f32) -> BodySample {
    use crate::body::{HandSample, Position, TrackingState};

    let joint = JointSample::new(Position::new(x, 0.0, 0.0), TrackingState::Tracked);
    BodySample {
        tracked: true,
        head: joint,
        pelvis: joint,
        left: HandSample {
            joint,
            confidence: Confidence::High,
            state: RawHandState::Closed,
        },
        right: HandSample {
            joint,
            confidence: Confidence::Low,
            state: RawHandState::Lasso,
        },
    }
}

// ── Tests ──────────────────────────────────────────────────
