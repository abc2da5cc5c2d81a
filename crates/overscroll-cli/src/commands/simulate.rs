//! Synthesize a linear drag for resistance/threshold tuning.
//!
//! Prints a snapshot per sample so the damped pull distance and progress
//! percentage can be eyeballed against the raw finger movement.

use clap::Args;

use overscroll_core::{Event, PullConfig, PullEngine};

#[derive(Args)]
pub struct SimulateArgs {
    /// Drag start coordinate
    #[arg(long, default_value_t = 0.0)]
    pub from: f32,
    /// Drag end coordinate
    #[arg(long, default_value_t = 300.0)]
    pub to: f32,
    /// Number of touch-move samples between start and end
    #[arg(long, default_value_t = 10)]
    pub steps: u32,
    /// Refresh threshold (pull distance units)
    #[arg(long, default_value_t = 80.0)]
    pub threshold: f32,
    /// Resistance divisor applied to the raw drag delta
    #[arg(long, default_value_t = 2.5)]
    pub resistance: f32,
    /// Minimum refresh display window in milliseconds. The simulated
    /// refresh action settles immediately, so this is how long a triggered
    /// refresh stays visible.
    #[arg(long, default_value_t = 0)]
    pub refresh_window_ms: u64,
    /// Cancel the drag at the end instead of releasing it
    #[arg(long)]
    pub cancel: bool,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = PullConfig {
        threshold: args.threshold,
        resistance: args.resistance,
        refreshing_timeout_ms: args.refresh_window_ms,
        enabled: true,
    };
    let mut engine = PullEngine::new(config)?;

    print_event(&engine.on_touch_start(args.from, 0.0))?;
    let steps = args.steps.max(1);
    for i in 1..=steps {
        let y = args.from + (args.to - args.from) * i as f32 / steps as f32;
        print_event(&engine.on_touch_move(y))?;
        println!("{}", serde_json::to_string(&engine.snapshot())?);
    }

    let release = if args.cancel {
        engine.on_touch_cancel()
    } else {
        engine.on_touch_end()
    };
    print_event(&release)?;

    if let Some(Event::RefreshStarted { .. }) = release {
        // The simulated action settles instantly; wait out the window.
        let mut finished = engine.mark_refresh_settled();
        while finished.is_none() {
            std::thread::sleep(std::time::Duration::from_millis(10));
            finished = engine.tick();
        }
        print_event(&finished)?;
    }

    println!("{}", serde_json::to_string(&engine.snapshot())?);
    Ok(())
}

fn print_event(event: &Option<Event>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(event) = event {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_drag_triggers_and_finishes_refresh() {
        let args = SimulateArgs {
            from: 0.0,
            to: 300.0,
            steps: 5,
            threshold: 80.0,
            resistance: 2.5,
            refresh_window_ms: 0,
            cancel: false,
        };
        assert!(run(args).is_ok());
    }

    #[test]
    fn cancelled_drag_snaps_back() {
        let args = SimulateArgs {
            from: 0.0,
            to: 300.0,
            steps: 5,
            threshold: 80.0,
            resistance: 2.5,
            refresh_window_ms: 0,
            cancel: true,
        };
        assert!(run(args).is_ok());
    }
}
