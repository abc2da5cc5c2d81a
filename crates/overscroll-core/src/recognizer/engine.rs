//! Pull engine implementation.
//!
//! The pull engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller feeds it touch events and, while the
//! refresh indicator is showing, calls `tick()` periodically (or lets the
//! async [`RefreshController`](crate::RefreshController) finish it).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Pulling -> (Refreshing | Idle) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PullEngine::new(PullConfig::default())?;
//! engine.on_touch_start(0.0, 0.0);
//! engine.on_touch_move(150.0);
//! if let Some(Event::RefreshStarted { .. }) = engine.on_touch_end() {
//!     // run the refresh action, then:
//!     engine.mark_refresh_settled();
//!     // In a loop:
//!     engine.tick(); // Returns Some(Event::RefreshFinished) when done
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::PullConfig;
use crate::error::ConfigError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullPhase {
    Idle,
    Pulling,
    Refreshing,
}

/// Transient tracking state for a single drag. Created on touch-start,
/// discarded on touch-end/cancel.
#[derive(Debug, Clone)]
struct GestureSession {
    /// Vertical coordinate where the drag began.
    start_y: f32,
    /// Latest vertical coordinate seen.
    current_y: f32,
}

/// Metadata for the Refreshing phase.
#[derive(Debug, Clone)]
pub struct RefreshingState {
    /// When the refreshing display window opened (epoch milliseconds).
    pub since_epoch_ms: u64,
    /// Whether the refresh action has settled (success or failure).
    pub settled: bool,
}

/// Core pull-to-refresh state machine.
///
/// Operates on wall-clock deltas -- no internal thread. Converts raw
/// vertical touch movement into a resisted pull distance, hard-capped at
/// `threshold * 1.5`, and holds the Refreshing phase until the refresh
/// action has settled AND the minimum display window has elapsed.
#[derive(Debug, Clone)]
pub struct PullEngine {
    config: PullConfig,
    /// The active drag, if any. At most one session exists at a time.
    session: Option<GestureSession>,
    /// Resisted pull distance, `0 ..= threshold * 1.5`.
    pull_distance: f32,
    /// True iff `pull_distance >= threshold`.
    can_refresh: bool,
    /// True once the current drag moved past the scroll dead zone, telling
    /// the host to suppress default scroll handling.
    scroll_suppressed: bool,
    /// Metadata for the Refreshing phase (only set while refreshing).
    refreshing: Option<RefreshingState>,
}

impl PullEngine {
    /// Create a new engine with the given configuration.
    ///
    /// Starts in the `Idle` phase. Rejects configurations the resistance
    /// math cannot operate on (threshold <= 0, resistance <= 1).
    pub fn new(config: PullConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            session: None,
            pull_distance: 0.0,
            can_refresh: false,
            scroll_suppressed: false,
            refreshing: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> PullPhase {
        if self.refreshing.is_some() {
            PullPhase::Refreshing
        } else if self.session.is_some() {
            PullPhase::Pulling
        } else {
            PullPhase::Idle
        }
    }

    pub fn config(&self) -> &PullConfig {
        &self.config
    }

    pub fn pull_distance(&self) -> f32 {
        self.pull_distance
    }

    pub fn can_refresh(&self) -> bool {
        self.can_refresh
    }

    /// True while a drag is in progress, before release.
    pub fn is_pulling(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.is_some()
    }

    /// True once the current drag exceeded the dead zone; the host should
    /// suppress default scroll handling while this holds.
    pub fn suppresses_scroll(&self) -> bool {
        self.scroll_suppressed
    }

    /// 0.0 .. 100.0 progress toward the refresh threshold.
    pub fn progress_pct(&self) -> f32 {
        (self.pull_distance / self.config.threshold * 100.0).min(100.0)
    }

    /// Vertical translation for the rendering layer, capped at the
    /// threshold so the indicator never travels past its rest position.
    pub fn translation_offset(&self) -> f32 {
        self.pull_distance.min(self.config.threshold)
    }

    /// Get the refreshing metadata if in the Refreshing phase.
    pub fn refreshing_state(&self) -> Option<&RefreshingState> {
        self.refreshing.as_ref()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase(),
            pull_distance: self.pull_distance,
            progress_pct: self.progress_pct(),
            translation_offset: self.translation_offset(),
            can_refresh: self.can_refresh,
            is_pulling: self.is_pulling(),
            is_refreshing: self.is_refreshing(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin tracking a drag.
    ///
    /// No-op unless the recognizer is enabled, idle (not refreshing, no
    /// active session), and the page is scrolled to the very top. A
    /// touch-start while a session is already active never overwrites
    /// `start_y`; the first touch-end/cancel is authoritative.
    pub fn on_touch_start(&mut self, y: f32, scroll_offset: f32) -> Option<Event> {
        if !self.config.enabled
            || !y.is_finite()
            || scroll_offset != 0.0
            || self.refreshing.is_some()
            || self.session.is_some()
        {
            return None;
        }
        self.session = Some(GestureSession {
            start_y: y,
            current_y: y,
        });
        self.pull_distance = 0.0;
        self.can_refresh = false;
        self.scroll_suppressed = false;
        Some(Event::PullStarted {
            start_y: y,
            at: Utc::now(),
        })
    }

    /// Track a drag movement.
    ///
    /// Upward movement (`y` above the start point) leaves the pull distance
    /// unchanged. Downward movement is damped by the resistance divisor and
    /// clamped to `threshold * 1.5`. Emits `ThresholdCrossed` exactly on
    /// the false -> true `can_refresh` transition.
    pub fn on_touch_move(&mut self, y: f32) -> Option<Event> {
        if !y.is_finite() {
            return None;
        }
        let session = self.session.as_mut()?;
        session.current_y = y;
        let delta_y = y - session.start_y;

        if delta_y > PullConfig::SCROLL_DEAD_ZONE {
            self.scroll_suppressed = true;
        }
        if delta_y < 0.0 {
            return None;
        }

        let raw_pull = delta_y / self.config.resistance;
        self.pull_distance = raw_pull.clamp(0.0, self.config.max_pull());
        let was_armed = self.can_refresh;
        self.can_refresh = self.pull_distance >= self.config.threshold;

        if self.can_refresh && !was_armed {
            Some(Event::ThresholdCrossed {
                pull_distance: self.pull_distance,
                at: Utc::now(),
            })
        } else {
            Some(Event::PullMoved {
                pull_distance: self.pull_distance,
                progress_pct: self.progress_pct(),
                can_refresh: self.can_refresh,
                at: Utc::now(),
            })
        }
    }

    /// Finish the drag.
    ///
    /// Past the threshold this opens the Refreshing phase with the pull
    /// distance pinned to the threshold; the caller is now expected to run
    /// the refresh action and report back via [`mark_refresh_settled`]
    /// (polling) or [`finish_refresh`] (driver). Below the threshold the
    /// state snaps back to Idle and no refresh fires.
    ///
    /// [`mark_refresh_settled`]: Self::mark_refresh_settled
    /// [`finish_refresh`]: Self::finish_refresh
    pub fn on_touch_end(&mut self) -> Option<Event> {
        self.session.take()?;
        self.scroll_suppressed = false;

        if self.can_refresh && self.refreshing.is_none() {
            self.pull_distance = self.config.threshold;
            self.refreshing = Some(RefreshingState {
                since_epoch_ms: now_ms(),
                settled: false,
            });
            Some(Event::RefreshStarted {
                pinned_distance: self.pull_distance,
                at: Utc::now(),
            })
        } else {
            self.pull_distance = 0.0;
            self.can_refresh = false;
            Some(Event::SnappedBack { at: Utc::now() })
        }
    }

    /// Abort the drag (multi-touch, system interruption).
    ///
    /// Always snaps back, even past the threshold -- a cancelled gesture
    /// never fires the refresh action.
    pub fn on_touch_cancel(&mut self) -> Option<Event> {
        self.session.take()?;
        self.scroll_suppressed = false;
        self.pull_distance = 0.0;
        self.can_refresh = false;
        Some(Event::SnappedBack { at: Utc::now() })
    }

    /// Record that the refresh action settled (success or failure).
    ///
    /// Returns `Some(Event::RefreshFinished)` immediately if the minimum
    /// display window has already elapsed; otherwise the next `tick()` past
    /// the window completes the phase.
    pub fn mark_refresh_settled(&mut self) -> Option<Event> {
        if let Some(refreshing) = &mut self.refreshing {
            refreshing.settled = true;
        }
        self.tick()
    }

    /// Call periodically while refreshing. Returns
    /// `Some(Event::RefreshFinished)` once the action has settled AND the
    /// minimum display window has elapsed -- both must hold, so a fast
    /// refresh still shows a full animation.
    pub fn tick(&mut self) -> Option<Event> {
        let refreshing = self.refreshing.as_ref()?;
        let elapsed = now_ms().saturating_sub(refreshing.since_epoch_ms);
        if refreshing.settled && elapsed >= self.config.refreshing_timeout_ms {
            self.finish(elapsed)
        } else {
            None
        }
    }

    /// Close the Refreshing phase unconditionally.
    ///
    /// For drivers that enforce the minimum display window themselves (the
    /// [`RefreshController`](crate::RefreshController) joins the action
    /// with its own sleep before calling this). No-op when not refreshing.
    pub fn finish_refresh(&mut self) -> Option<Event> {
        let refreshing = self.refreshing.as_ref()?;
        let elapsed = now_ms().saturating_sub(refreshing.since_epoch_ms);
        self.finish(elapsed)
    }

    /// Forcibly discard any active session and zero all state.
    /// Used on unmount/cleanup.
    pub fn reset(&mut self) -> Option<Event> {
        self.session = None;
        self.refreshing = None;
        self.pull_distance = 0.0;
        self.can_refresh = false;
        self.scroll_suppressed = false;
        Some(Event::RecognizerReset { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, shown_ms: u64) -> Option<Event> {
        self.refreshing = None;
        self.pull_distance = 0.0;
        self.can_refresh = false;
        Some(Event::RefreshFinished {
            shown_ms,
            at: Utc::now(),
        })
    }
}

impl Default for PullEngine {
    fn default() -> Self {
        Self {
            config: PullConfig::default(),
            session: None,
            pull_distance: 0.0,
            can_refresh: false,
            scroll_suppressed: false,
            refreshing: None,
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> PullEngine {
        PullEngine::new(PullConfig::default()).unwrap()
    }

    fn engine_with(config: PullConfig) -> PullEngine {
        PullEngine::new(config).unwrap()
    }

    #[test]
    fn starts_only_at_scroll_top() {
        let mut engine = engine();
        assert!(engine.on_touch_start(0.0, 42.0).is_none());
        assert_eq!(engine.phase(), PullPhase::Idle);
        assert!(!engine.is_pulling());

        assert!(engine.on_touch_start(0.0, 0.0).is_some());
        assert_eq!(engine.phase(), PullPhase::Pulling);
        assert!(engine.is_pulling());
    }

    #[test]
    fn resistance_curve_and_hard_cap() {
        // threshold=80, resistance=2.5: drag 150 -> 60; drag 300 -> 120 (cap).
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);

        engine.on_touch_move(150.0);
        assert_eq!(engine.pull_distance(), 60.0);
        assert!(!engine.can_refresh());
        assert_eq!(engine.progress_pct(), 75.0);

        engine.on_touch_move(300.0);
        assert_eq!(engine.pull_distance(), 120.0);
        assert!(engine.can_refresh());
        assert_eq!(engine.progress_pct(), 100.0);
        // Indicator translation never exceeds the threshold.
        assert_eq!(engine.translation_offset(), 80.0);
    }

    #[test]
    fn upward_drag_leaves_pull_distance_unchanged() {
        let mut engine = engine();
        engine.on_touch_start(100.0, 0.0);
        engine.on_touch_move(200.0);
        assert_eq!(engine.pull_distance(), 40.0);

        assert!(engine.on_touch_move(50.0).is_none());
        assert_eq!(engine.pull_distance(), 40.0);
    }

    #[test]
    fn dead_zone_gates_scroll_suppression() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);

        engine.on_touch_move(8.0);
        assert!(!engine.suppresses_scroll());

        engine.on_touch_move(11.0);
        assert!(engine.suppresses_scroll());

        // Released: the host gets its scroll handling back.
        engine.on_touch_end();
        assert!(!engine.suppresses_scroll());
    }

    #[test]
    fn threshold_crossing_emitted_once() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);

        assert!(matches!(
            engine.on_touch_move(100.0),
            Some(Event::PullMoved { .. })
        ));
        assert!(matches!(
            engine.on_touch_move(200.0),
            Some(Event::ThresholdCrossed { .. })
        ));
        assert!(matches!(
            engine.on_touch_move(250.0),
            Some(Event::PullMoved {
                can_refresh: true,
                ..
            })
        ));
    }

    #[test]
    fn release_below_threshold_snaps_back() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(150.0);

        assert!(matches!(
            engine.on_touch_end(),
            Some(Event::SnappedBack { .. })
        ));
        assert_eq!(engine.phase(), PullPhase::Idle);
        assert_eq!(engine.pull_distance(), 0.0);
        assert!(!engine.can_refresh());
        assert!(!engine.is_refreshing());
    }

    #[test]
    fn release_past_threshold_pins_and_opens_refresh() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(300.0);
        assert_eq!(engine.pull_distance(), 120.0);

        assert!(matches!(
            engine.on_touch_end(),
            Some(Event::RefreshStarted {
                pinned_distance,
                ..
            }) if pinned_distance == 80.0
        ));
        assert_eq!(engine.phase(), PullPhase::Refreshing);
        assert_eq!(engine.pull_distance(), 80.0);
        assert!(!engine.is_pulling());

        // No active session: a second release is a no-op.
        assert!(engine.on_touch_end().is_none());
    }

    #[test]
    fn touch_start_ignored_while_refreshing() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(300.0);
        engine.on_touch_end();
        assert!(engine.is_refreshing());

        assert!(engine.on_touch_start(0.0, 0.0).is_none());
        assert!(!engine.is_pulling());
    }

    #[test]
    fn second_touch_start_never_overwrites_start_y() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(50.0);

        // A stray second finger down must not re-anchor the gesture.
        assert!(engine.on_touch_start(200.0, 0.0).is_none());
        engine.on_touch_move(150.0);
        assert_eq!(engine.pull_distance(), 60.0);
    }

    #[test]
    fn cancel_never_fires_refresh() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(300.0);
        assert!(engine.can_refresh());

        assert!(matches!(
            engine.on_touch_cancel(),
            Some(Event::SnappedBack { .. })
        ));
        assert_eq!(engine.phase(), PullPhase::Idle);
        assert!(!engine.is_refreshing());
        assert_eq!(engine.pull_distance(), 0.0);
    }

    #[test]
    fn tick_requires_settle_and_window() {
        let mut engine = engine_with(PullConfig {
            refreshing_timeout_ms: 0,
            ..Default::default()
        });
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(300.0);
        engine.on_touch_end();

        // Window elapsed (0ms) but the action hasn't settled.
        assert!(engine.tick().is_none());
        assert!(engine.is_refreshing());

        assert!(matches!(
            engine.mark_refresh_settled(),
            Some(Event::RefreshFinished { .. })
        ));
        assert_eq!(engine.phase(), PullPhase::Idle);
        assert_eq!(engine.pull_distance(), 0.0);
        assert!(!engine.can_refresh());
    }

    #[test]
    fn settled_refresh_holds_until_window_elapses() {
        let mut engine = engine_with(PullConfig {
            refreshing_timeout_ms: 50,
            ..Default::default()
        });
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(300.0);
        engine.on_touch_end();

        // Instant settle: still held open by the minimum display window.
        assert!(engine.mark_refresh_settled().is_none());
        assert!(engine.is_refreshing());

        std::thread::sleep(std::time::Duration::from_millis(60));
        assert!(matches!(
            engine.tick(),
            Some(Event::RefreshFinished { shown_ms, .. }) if shown_ms >= 50
        ));
        assert_eq!(engine.phase(), PullPhase::Idle);
    }

    #[test]
    fn finish_refresh_trusts_the_driver() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(300.0);
        engine.on_touch_end();

        assert!(matches!(
            engine.finish_refresh(),
            Some(Event::RefreshFinished { .. })
        ));
        assert_eq!(engine.phase(), PullPhase::Idle);

        // Not refreshing: no-op.
        assert!(engine.finish_refresh().is_none());
    }

    #[test]
    fn disabled_recognizer_is_inert() {
        let mut engine = engine_with(PullConfig {
            enabled: false,
            ..Default::default()
        });
        assert!(engine.on_touch_start(0.0, 0.0).is_none());
        assert!(engine.on_touch_move(300.0).is_none());
        assert!(engine.on_touch_end().is_none());
        assert_eq!(engine.phase(), PullPhase::Idle);
        assert_eq!(engine.pull_distance(), 0.0);
    }

    #[test]
    fn reset_discards_everything() {
        let mut engine = engine();
        engine.on_touch_start(0.0, 0.0);
        engine.on_touch_move(300.0);
        engine.on_touch_end();
        assert!(engine.is_refreshing());

        assert!(matches!(
            engine.reset(),
            Some(Event::RecognizerReset { .. })
        ));
        assert_eq!(engine.phase(), PullPhase::Idle);
        assert_eq!(engine.pull_distance(), 0.0);
        assert!(!engine.can_refresh());
        assert!(!engine.suppresses_scroll());
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(PullEngine::new(PullConfig {
            resistance: 0.5,
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = engine();
        match engine.snapshot() {
            Event::StateSnapshot {
                phase,
                pull_distance,
                progress_pct,
                ..
            } => {
                assert_eq!(phase, PullPhase::Idle);
                assert_eq!(pull_distance, 0.0);
                assert_eq!(progress_pct, 0.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    proptest! {
        #[test]
        fn pull_distance_matches_resistance_formula(delta in 0.0f32..1000.0) {
            let mut engine = engine();
            engine.on_touch_start(0.0, 0.0);
            engine.on_touch_move(delta);

            let expected = (delta / 2.5).min(120.0);
            prop_assert!(engine.pull_distance() >= 0.0);
            prop_assert!((engine.pull_distance() - expected).abs() < 1e-4);
            prop_assert_eq!(engine.can_refresh(), engine.pull_distance() >= 80.0);
        }

        #[test]
        fn upward_moves_never_change_pull_distance(
            down in 0.0f32..1000.0,
            up in -1000.0f32..0.0,
        ) {
            let mut engine = engine();
            engine.on_touch_start(0.0, 0.0);
            engine.on_touch_move(down);
            let before = engine.pull_distance();

            engine.on_touch_move(up);
            prop_assert_eq!(engine.pull_distance(), before);
        }

        #[test]
        fn progress_is_monotone_and_clamped(a in 0.0f32..1000.0, b in 0.0f32..1000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

            let mut engine = engine();
            engine.on_touch_start(0.0, 0.0);
            engine.on_touch_move(lo);
            let p_lo = engine.progress_pct();
            engine.on_touch_move(hi);
            let p_hi = engine.progress_pct();

            prop_assert!((0.0..=100.0).contains(&p_lo));
            prop_assert!((0.0..=100.0).contains(&p_hi));
            prop_assert!(p_lo <= p_hi);
        }
    }
}
