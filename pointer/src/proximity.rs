//! Hand-near-head heuristic.
//!
//! A hand counts as "raised" when its Manhattan distance to the head on the
//! X/Y plane is smaller than its distance to the pelvis.  Depth is ignored.

use crate::body::{Hand, JointSample, Position};
use crate::history::BodyHistory;

/// Manhattan distance on the X/Y plane.
fn planar_manhattan(a: &Position, b: &Position) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Whether `hand` is strictly nearer to `head` than to `pelvis`.
pub fn closer_to_head(head: &JointSample, pelvis: &JointSample, hand: &JointSample) -> bool {
    planar_manhattan(&hand.position, &head.position)
        < planar_manhattan(&hand.position, &pelvis.position)
}

/// Whether every aligned (head, pelvis, hand) triple satisfies
/// [`closer_to_head`].
///
/// Only the first `min(len)` entries of each slice are compared.  Empty
/// input is vacuously true.
pub fn closer_to_head_all(head: &[JointSample], pelvis: &[JointSample], hand: &[JointSample]) -> bool {
    head.iter()
        .zip(pelvis)
        .zip(hand)
        .all(|((h, p), j)| closer_to_head(h, p, j))
}

/// Window form over the last `k` buffered frames of `hand`.
///
/// Returns false when fewer than `k` frames are buffered.
pub fn window_closer_to_head(history: &BodyHistory, hand: Hand, k: usize) -> bool {
    let (Ok(head), Ok(pelvis), Ok(joint)) = (
        history.head.window(k),
        history.pelvis.window(k),
        history.hand(hand).joint.window(k),
    ) else {
        return false;
    };
    closer_to_head_all(&head, &pelvis, &joint)
}

/// Single-sample form over the newest buffered frame.
pub fn latest_closer_to_head(history: &BodyHistory, hand: Hand) -> bool {
    match (
        history.head.latest(),
        history.pelvis.latest(),
        history.hand(hand).joint.latest(),
    ) {
        (Some(head), Some(pelvis), Some(joint)) => closer_to_head(&head, &pelvis, &joint),
        _ => false,
    }
}

#[cfg(test)]
fn joint(x: f32, y: f32) -> JointSample {
    JointSample::new(Position::new(x, y, 0.0), crate::body::TrackingState::Tracked)
}

// ── Tests ──────────────────────────────────────────────────
