//! Replay a recorded touch trace through the recognizer.
//!
//! Traces are JSON lines, one record per input event, e.g.:
//!
//! ```text
//! {"kind":"start","y":0.0,"scroll_offset":0.0}
//! {"kind":"move","y":150.0}
//! {"kind":"move","y":300.0}
//! {"kind":"end"}
//! {"kind":"settle"}
//! ```
//!
//! Every event the engine emits is printed as one JSON line, which makes
//! diffs between configurations easy to eyeball.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;

use overscroll_core::{PullConfig, PullEngine};

#[derive(Args)]
pub struct ReplayArgs {
    /// Path to a JSON-lines touch trace ("-" reads stdin)
    pub trace: String,
    /// TOML configuration file overriding the defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print a full state snapshot after every record
    #[arg(long)]
    pub snapshots: bool,
}

/// One input record of a touch trace.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TraceRecord {
    Start {
        y: f32,
        #[serde(default)]
        scroll_offset: f32,
    },
    Move {
        y: f32,
    },
    End,
    Cancel,
    /// The refresh action settled (for traces captured alongside one).
    Settle,
    /// Poll the engine's refresh bookkeeping.
    Tick,
    /// Forcibly reset the recognizer.
    Reset,
}

pub fn run(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => PullConfig::default(),
    };
    let mut engine = PullEngine::new(config)?;

    let reader: Box<dyn BufRead> = if args.trace == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(io::BufReader::new(fs::File::open(&args.trace)?))
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: TraceRecord = serde_json::from_str(&line)?;
        let event = apply(&mut engine, record);
        if let Some(event) = event {
            println!("{}", serde_json::to_string(&event)?);
        }
        if args.snapshots {
            println!("{}", serde_json::to_string(&engine.snapshot())?);
        }
    }

    Ok(())
}

fn apply(engine: &mut PullEngine, record: TraceRecord) -> Option<overscroll_core::Event> {
    match record {
        TraceRecord::Start { y, scroll_offset } => engine.on_touch_start(y, scroll_offset),
        TraceRecord::Move { y } => engine.on_touch_move(y),
        TraceRecord::End => engine.on_touch_end(),
        TraceRecord::Cancel => engine.on_touch_cancel(),
        TraceRecord::Settle => engine.mark_refresh_settled(),
        TraceRecord::Tick => engine.tick(),
        TraceRecord::Reset => engine.reset(),
    }
}
