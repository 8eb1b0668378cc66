//! Line-oriented frame source.
//!
//! Reads one s-expression message per line, dispatches it against a
//! [`PointerEngine`], forwards the resulting commands to a sink and writes
//! control responses.  Blank lines and `;` comments are skipped.

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::engine::PointerEngine;
use crate::ipc::dispatch::{handle_message, Dispatched};
use crate::sink::{apply_batch, apply_commands, IndicatorSurface, PointerSink};

/// Counters reported when a replay finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub lines: u64,
    pub frames: u64,
    pub controls: u64,
    pub errors: u64,
}

/// Replay options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Log every message and response at info level.
    pub trace: bool,
}

/// Drain `input` to EOF.
///
/// A malformed or rejected line is answered with an error response and
/// counted; it never stops the replay.  I/O failures do.
pub fn run<R, S, W>(
    engine: &mut PointerEngine,
    input: R,
    sink: &mut S,
    responses: &mut W,
    options: ReplayOptions,
) -> anyhow::Result<ReplayStats>
where
    R: BufRead,
    S: PointerSink + IndicatorSurface + ?Sized,
    W: Write + ?Sized,
{
    let mut stats = ReplayStats::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("reading input line {}", index + 1))?;
        let msg = line.trim();
        if msg.is_empty() || msg.starts_with(';') {
            continue;
        }
        stats.lines += 1;
        if options.trace {
            info!("<< {}", msg);
        }

        match handle_message(engine, msg) {
            Dispatched::Frame(batch) => {
                stats.frames += 1;
                if batch.tracking_lost {
                    debug!(line = index + 1, "no tracked body");
                }
                apply_batch(sink, &batch).context("writing pointer commands")?;
            }
            Dispatched::Control { response, commands } => {
                stats.controls += 1;
                apply_commands(sink, &commands).context("writing pointer commands")?;
                respond(responses, &response, options)?;
            }
            Dispatched::Rejected(response) => {
                stats.errors += 1;
                warn!(line = index + 1, "rejected: {}", msg);
                respond(responses, &response, options)?;
            }
        }
    }

    info!(
        lines = stats.lines,
        frames = stats.frames,
        errors = stats.errors,
        "replay finished"
    );
    Ok(stats)
}

fn respond<W: Write + ?Sized>(responses: &mut W, response: &str, options: ReplayOptions) -> anyhow::Result<()> {
    if options.trace {
        info!(">> {}", response);
    }
    writeln!(responses, "{}", response).context("writing response")?;
    responses.flush().context("flushing responses")?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────
