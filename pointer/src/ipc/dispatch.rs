//! IPC message dispatch: parse an s-expression line and route by `:type`.

use lexpr::Value;
use tracing::{debug, warn};

use crate::action::{CommandBatch, PointerCommand};
use crate::body::Hand;
use crate::engine::PointerEngine;
use crate::ipc::codec::decode_frame;
use crate::ipc::plist::{escape_string, get_int, get_keyword};

/// What one handled line produced.
#[derive(Debug)]
pub enum Dispatched {
    /// A frame went through the pipeline.  Frames get no response.
    Frame(CommandBatch),
    /// A control message: its response plus any pointer commands it caused
    /// (releases on a hand swap, for instance).
    Control {
        response: String,
        commands: Vec<PointerCommand>,
    },
    /// The line was malformed or refused; carries the error response.
    Rejected(String),
}

impl Dispatched {
    fn reply(response: String) -> Self {
        Self::Control {
            response,
            commands: Vec::new(),
        }
    }

    fn reject(id: i64, reason: &str) -> Self {
        Self::Rejected(error_response(id, reason))
    }

    /// The response line, if any.
    pub fn response(&self) -> Option<&str> {
        match self {
            Self::Frame(_) => None,
            Self::Control { response, .. } | Self::Rejected(response) => Some(response),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Parse and dispatch one message line.
pub fn handle_message(engine: &mut PointerEngine, raw: &str) -> Dispatched {
    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("malformed s-expression: {}", e);
            return Dispatched::reject(0, &format!("malformed s-expression: {e}"));
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);

    match msg_type.as_deref() {
        Some("frame") => handle_frame(engine, msg_id, &value),
        Some("ping") => handle_ping(msg_id, &value),
        Some("status") => Dispatched::reply(format!(
            "(:type :response :id {} :status :ok :engine {})",
            msg_id,
            engine.status_sexp()
        )),
        Some("config") => Dispatched::reply(format!(
            "(:type :response :id {} :status :ok :config {})",
            msg_id,
            engine.config().config_sexp()
        )),
        Some("swap-hands") => {
            let commands = engine.swap_hands();
            control(msg_id, engine.moving_hand(), commands)
        }
        Some("set-moving-hand") => handle_set_moving_hand(engine, msg_id, &value),
        Some("reset") => Dispatched::Control {
            response: ok_response(msg_id),
            commands: engine.reset(),
        },
        Some(other) => {
            debug!("unknown message type: {}", other);
            Dispatched::reject(msg_id, &format!("unknown message type: {other}"))
        }
        None => Dispatched::reject(msg_id, "missing :type"),
    }
}

fn handle_frame(engine: &mut PointerEngine, msg_id: i64, value: &Value) -> Dispatched {
    match decode_frame(value) {
        Ok(frame) => Dispatched::Frame(engine.process_frame(&frame)),
        Err(e) => {
            warn!(msg_id, "dropping frame: {}", e);
            Dispatched::reject(msg_id, &format!("bad frame: {e}"))
        }
    }
}

fn handle_ping(msg_id: i64, value: &Value) -> Dispatched {
    let client_ts = get_int(value, "timestamp").unwrap_or(0);
    Dispatched::reply(format!(
        "(:type :response :id {} :status :ok :client-timestamp {})",
        msg_id, client_ts
    ))
}

fn handle_set_moving_hand(engine: &mut PointerEngine, msg_id: i64, value: &Value) -> Dispatched {
    let Some(name) = get_keyword(value, "hand") else {
        return Dispatched::reject(msg_id, "missing :hand");
    };
    let Some(hand) = Hand::parse(&name) else {
        return Dispatched::reject(msg_id, &format!("unknown hand: {name}"));
    };
    let commands = engine.set_moving_hand(hand);
    control(msg_id, engine.moving_hand(), commands)
}

fn control(msg_id: i64, moving: Hand, commands: Vec<PointerCommand>) -> Dispatched {
    Dispatched::Control {
        response: format!(
            "(:type :response :id {} :status :ok :moving-hand :{})",
            msg_id,
            moving.as_str()
        ),
        commands,
    }
}

// ── Response helpers ───────────────────────────────────────

fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Format an event message (pointer output and indicator feedback).
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

// ── Tests ──────────────────────────────────────────────────
