//! Frame wire format.
//!
//! ```text
//! (:type :frame :id 17
//!  :bodies ((:tracked t
//!            :head   (:x 0.0 :y 0.4 :z 2.1 :state :tracked)
//!            :pelvis (:x 0.0 :y -0.3 :z 2.1 :state :tracked)
//!            :left   (:joint (:x -0.2 :y 0.5 :z 1.9) :confidence :high :state :closed)
//!            :right  (:joint (:x 0.2 :y -0.1 :z 2.0) :confidence :low :state :open))))
//! ```
//!
//! A joint's `:z` defaults to 0 and its `:state` to `:tracked`.  A body's
//! `:tracked` defaults to true.  A missing hand decodes as not tracked; a
//! missing head or pelvis is an error.

use lexpr::Value;

use crate::body::{
    BodySample, Confidence, Frame, HandSample, JointSample, Position, RawHandState, TrackingState,
};
use crate::ipc::plist::{get_bool, get_float, get_keyword, get_value, list_items, sexp_bool};

/// A frame message that cannot be turned into a [`Frame`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("missing :{0}")]
    Missing(&'static str),

    #[error("invalid :{key} value {value}")]
    Invalid { key: &'static str, value: String },
}

/// Decode the `:bodies` of a frame message.  No `:bodies` means no bodies.
pub fn decode_frame(value: &Value) -> Result<Frame, CodecError> {
    let Some(bodies) = get_value(value, "bodies") else {
        return Ok(Frame::empty());
    };
    let bodies = list_items(bodies)
        .into_iter()
        .map(decode_body)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Frame::new(bodies))
}

fn decode_body(value: &Value) -> Result<BodySample, CodecError> {
    let head = get_value(value, "head").ok_or(CodecError::Missing("head"))?;
    let pelvis = get_value(value, "pelvis").ok_or(CodecError::Missing("pelvis"))?;
    Ok(BodySample {
        tracked: get_bool(value, "tracked").unwrap_or(true),
        head: decode_joint(head)?,
        pelvis: decode_joint(pelvis)?,
        left: decode_optional_hand(value, "left")?,
        right: decode_optional_hand(value, "right")?,
    })
}

fn decode_optional_hand(value: &Value, key: &str) -> Result<HandSample, CodecError> {
    match get_value(value, key) {
        Some(hand) => decode_hand(hand),
        None => Ok(HandSample::not_tracked()),
    }
}

fn decode_hand(value: &Value) -> Result<HandSample, CodecError> {
    let joint = get_value(value, "joint").ok_or(CodecError::Missing("joint"))?;
    let confidence = get_keyword(value, "confidence").ok_or(CodecError::Missing("confidence"))?;
    let state = get_keyword(value, "state").ok_or(CodecError::Missing("state"))?;
    Ok(HandSample {
        joint: decode_joint(joint)?,
        confidence: Confidence::parse(&confidence).ok_or(CodecError::Invalid {
            key: "confidence",
            value: confidence,
        })?,
        state: RawHandState::parse(&state).ok_or(CodecError::Invalid {
            key: "state",
            value: state,
        })?,
    })
}

fn decode_joint(value: &Value) -> Result<JointSample, CodecError> {
    let x = coordinate(value, "x")?.ok_or(CodecError::Missing("x"))?;
    let y = coordinate(value, "y")?.ok_or(CodecError::Missing("y"))?;
    let z = coordinate(value, "z")?.unwrap_or(0.0);
    let tracking = match get_keyword(value, "state") {
        None => TrackingState::Tracked,
        Some(s) => TrackingState::parse(&s).ok_or(CodecError::Invalid {
            key: "state",
            value: s,
        })?,
    };
    Ok(JointSample::new(Position::new(x, y, z), tracking))
}

/// A present-but-unparseable coordinate is an error, not a default.
fn coordinate(value: &Value, key: &'static str) -> Result<Option<f32>, CodecError> {
    match get_value(value, key) {
        None => Ok(None),
        Some(_) => get_float(value, key)
            .map(|v| Some(v as f32))
            .ok_or_else(|| CodecError::Invalid {
                key,
                value: get_keyword(value, key).unwrap_or_default(),
            }),
    }
}

// ── Encoding ───────────────────────────────────────────────

/// Render a frame as a complete `(:type :frame ...)` message.
pub fn encode_frame(id: i64, frame: &Frame) -> String {
    let bodies: Vec<String> = frame.bodies.iter().map(encode_body).collect();
    format!("(:type :frame :id {} :bodies ({}))", id, bodies.join(" "))
}

fn encode_body(body: &BodySample) -> String {
    format!(
        "(:tracked {} :head {} :pelvis {} :left {} :right {})",
        sexp_bool(body.tracked),
        encode_joint(&body.head),
        encode_joint(&body.pelvis),
        encode_hand(&body.left),
        encode_hand(&body.right),
    )
}

fn encode_hand(hand: &HandSample) -> String {
    format!(
        "(:joint {} :confidence :{} :state :{})",
        encode_joint(&hand.joint),
        hand.confidence.as_str(),
        hand.state.as_str(),
    )
}

fn encode_joint(joint: &JointSample) -> String {
    let p = joint.position;
    format!(
        "(:x {:?} :y {:?} :z {:?} :state :{})",
        p.x,
        p.y,
        p.z,
        joint.tracking.as_str()
    )
}

// ── Tests ──────────────────────────────────────────────────
