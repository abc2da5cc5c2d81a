use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recognizer::PullPhase;

/// Every state change in the recognizer produces an Event.
/// The rendering layer polls snapshots; the CLI prints events as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A gesture session started tracking (touch-start at scroll offset 0).
    PullStarted {
        start_y: f32,
        at: DateTime<Utc>,
    },
    /// The pull distance changed on a touch-move.
    PullMoved {
        pull_distance: f32,
        progress_pct: f32,
        can_refresh: bool,
        at: DateTime<Utc>,
    },
    /// `can_refresh` transitioned false -> true. The haptic pulse fires on
    /// exactly this event, once per gesture.
    ThresholdCrossed {
        pull_distance: f32,
        at: DateTime<Utc>,
    },
    /// Released past the threshold; the refresh action is about to run.
    /// Pull distance is pinned to the threshold for the duration.
    RefreshStarted {
        pinned_distance: f32,
        at: DateTime<Utc>,
    },
    /// Refresh action settled and the minimum display window elapsed.
    RefreshFinished {
        shown_ms: u64,
        at: DateTime<Utc>,
    },
    /// Released (or cancelled) below the threshold; no refresh fired.
    SnappedBack {
        at: DateTime<Utc>,
    },
    /// The recognizer was forcibly reset (unmount/cleanup).
    RecognizerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: PullPhase,
        pull_distance: f32,
        progress_pct: f32,
        translation_offset: f32,
        can_refresh: bool,
        is_pulling: bool,
        is_refreshing: bool,
        at: DateTime<Utc>,
    },
}
