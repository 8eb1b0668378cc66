//! skel-pointer: drive a pointer from debounced skeletal hand gestures.
//!
//! Reads frame messages from a file or stdin and writes pointer and
//! indicator events plus control responses to stdout.  Logs go to stderr.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use skel_pointer::action::ScreenSize;
use skel_pointer::body::Hand;
use skel_pointer::config::PointerConfig;
use skel_pointer::engine::PointerEngine;
use skel_pointer::replay::{self, ReplayOptions};
use skel_pointer::sink::SexpSink;

#[derive(Parser, Debug)]
#[command(name = "skel-pointer", about = "Skeletal hand-gesture pointer driver")]
struct Cli {
    /// Frame script to replay (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Config plist file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target screen size, e.g. 2560x1440
    #[arg(long)]
    screen: Option<String>,

    /// Hand that moves the pointer: left or right
    #[arg(long)]
    moving_hand: Option<String>,

    /// Do not emit indicator events
    #[arg(long)]
    no_indicators: bool,

    /// Log every message and response to stderr
    #[arg(long)]
    trace: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("skel-pointer {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skel_pointer=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("skel-pointer v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let mut engine = PointerEngine::new(config);

    let stdout = io::stdout();
    let mut sink = SexpSink::new(stdout.lock());
    if cli.no_indicators {
        sink = sink.without_indicators();
    }
    let mut responses = io::stdout();
    let options = ReplayOptions { trace: cli.trace };

    let stats = match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            replay::run(&mut engine, BufReader::new(file), &mut sink, &mut responses, options)?
        }
        None => replay::run(&mut engine, io::stdin().lock(), &mut sink, &mut responses, options)?,
    };

    if stats.errors > 0 {
        info!("{} of {} lines were rejected", stats.errors, stats.lines);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<PointerConfig> {
    let mut config = match &cli.config {
        Some(path) => PointerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => PointerConfig::default(),
    };

    if let Some(screen) = &cli.screen {
        config.screen = ScreenSize::parse(screen)
            .with_context(|| format!("bad --screen {screen}: expected WIDTHxHEIGHT"))?;
    }
    if let Some(hand) = &cli.moving_hand {
        config.moving_hand =
            Hand::parse(hand).with_context(|| format!("bad --moving-hand {hand}: use left or right"))?;
    }
    config.validate()?;
    Ok(config)
}
