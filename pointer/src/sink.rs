//! Output seams: pointer injection and indicator feedback.
//!
//! The pipeline only produces [`CommandBatch`] values; whatever drives a
//! real cursor or draws the indicators implements these traits.  Two
//! implementations ship here: an s-expression event writer for headless
//! use and an in-memory recorder.

use std::io::{self, Write};

use crate::action::{Button, CommandBatch, IndicatorColor, IndicatorSlot, PointerCommand};
use crate::ipc::dispatch::format_event;

/// OS-level pointer injection.
pub trait PointerSink {
    fn move_relative(&mut self, dx: i32, dy: i32) -> io::Result<()>;
    fn button_down(&mut self, button: Button) -> io::Result<()>;
    fn button_up(&mut self, button: Button) -> io::Result<()>;
}

/// Per-hand feedback display.
pub trait IndicatorSurface {
    fn set_indicator(&mut self, slot: IndicatorSlot, color: IndicatorColor) -> io::Result<()>;
}

/// Forward pointer commands in order.
pub fn apply_commands<S: PointerSink + ?Sized>(sink: &mut S, commands: &[PointerCommand]) -> io::Result<()> {
    for command in commands {
        match *command {
            PointerCommand::Move { dx, dy } => sink.move_relative(dx, dy)?,
            PointerCommand::ButtonDown(b) => sink.button_down(b)?,
            PointerCommand::ButtonUp(b) => sink.button_up(b)?,
        }
    }
    Ok(())
}

/// Forward a whole frame's output: pointer commands first, then indicators.
pub fn apply_batch<S: PointerSink + IndicatorSurface + ?Sized>(sink: &mut S, batch: &CommandBatch) -> io::Result<()> {
    apply_commands(sink, &batch.pointer)?;
    for (slot, color) in batch.indicators() {
        sink.set_indicator(slot, color)?;
    }
    Ok(())
}

// ── S-expression writer ────────────────────────────────────

/// Writes one `(:type :event ...)` line per call.
///
/// Indicator lines are only written when a slot's colour changes.
pub struct SexpSink<W: Write> {
    out: W,
    indicators: bool,
    last_moving: Option<IndicatorColor>,
    last_clicking: Option<IndicatorColor>,
}

impl<W: Write> SexpSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            indicators: true,
            last_moving: None,
            last_clicking: None,
        }
    }

    /// Suppress indicator events entirely.
    pub fn without_indicators(mut self) -> Self {
        self.indicators = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &str, fields: &[(&str, &str)]) -> io::Result<()> {
        writeln!(self.out, "{}", format_event(event, fields))?;
        self.out.flush()
    }
}

impl<W: Write> PointerSink for SexpSink<W> {
    fn move_relative(&mut self, dx: i32, dy: i32) -> io::Result<()> {
        self.emit("pointer-move", &[("dx", &dx.to_string()), ("dy", &dy.to_string())])
    }

    fn button_down(&mut self, button: Button) -> io::Result<()> {
        self.emit("button-down", &[("button", &format!(":{}", button.as_str()))])
    }

    fn button_up(&mut self, button: Button) -> io::Result<()> {
        self.emit("button-up", &[("button", &format!(":{}", button.as_str()))])
    }
}

impl<W: Write> IndicatorSurface for SexpSink<W> {
    fn set_indicator(&mut self, slot: IndicatorSlot, color: IndicatorColor) -> io::Result<()> {
        if !self.indicators {
            return Ok(());
        }
        let last = match slot {
            IndicatorSlot::MovingHand => &mut self.last_moving,
            IndicatorSlot::ClickingHand => &mut self.last_clicking,
        };
        if *last == Some(color) {
            return Ok(());
        }
        *last = Some(color);
        self.emit(
            "indicator",
            &[
                ("slot", &format!(":{}", slot.as_str())),
                ("color", &format!(":{}", color.as_str())),
            ],
        )
    }
}

// ── Recorder ───────────────────────────────────────────────

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Pointer(PointerCommand),
    Indicator(IndicatorSlot, IndicatorColor),
}

/// Keeps every call in order, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the pointer commands, in order.
    pub fn pointer_commands(&self) -> Vec<PointerCommand> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Pointer(c) => Some(*c),
                SinkEvent::Indicator(..) => None,
            })
            .collect()
    }

    /// The most recent colour set on `slot`.
    pub fn last_indicator(&self, slot: IndicatorSlot) -> Option<IndicatorColor> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::Indicator(s, c) if *s == slot => Some(*c),
            _ => None,
        })
    }
}

impl PointerSink for RecordingSink {
    fn move_relative(&mut self, dx: i32, dy: i32) -> io::Result<()> {
        self.events.push(SinkEvent::Pointer(PointerCommand::Move { dx, dy }));
        Ok(())
    }

    fn button_down(&mut self, button: Button) -> io::Result<()> {
        self.events.push(SinkEvent::Pointer(PointerCommand::ButtonDown(button)));
        Ok(())
    }

    fn button_up(&mut self, button: Button) -> io::Result<()> {
        self.events.push(SinkEvent::Pointer(PointerCommand::ButtonUp(button)));
        Ok(())
    }
}

impl IndicatorSurface for RecordingSink {
    fn set_indicator(&mut self, slot: IndicatorSlot, color: IndicatorColor) -> io::Result<()> {
        self.events.push(SinkEvent::Indicator(slot, color));
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────
