//! Async driver around the pull engine.
//!
//! The controller owns a [`PullEngine`] behind a mutex and wires it to the
//! two external effects the engine itself never performs: the
//! caller-supplied async refresh action and the haptic pulse. On a release
//! past the threshold it spawns a detached follow-up that joins the action
//! with the minimum display window (`tokio::join!` -- both must finish,
//! not a race) and only then returns the engine to Idle.
//!
//! Construct = attach, drop = detach: the controller owns all of its
//! state, nothing is registered globally, so dropping it cannot leak a
//! listener. A `reset()` bumps the generation counter, which makes any
//! still-running follow-up discard its settlement instead of touching the
//! engine -- the action itself always runs to completion.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::PullConfig;
use crate::error::{ConfigError, RefreshError};
use crate::events::Event;
use crate::haptics::{HapticFeedback, NoopHaptics};
use crate::recognizer::engine::PullEngine;

type BoxRefreshFuture = Pin<Box<dyn Future<Output = Result<(), RefreshError>> + Send>>;

/// The caller-supplied refresh operation.
///
/// Implemented for free by any `Fn() -> impl Future<Output = Result<(),
/// RefreshError>>` closure. Invoked at most once per completed gesture;
/// errors are logged and swallowed at this boundary, never surfaced to the
/// touch handlers.
pub trait RefreshAction: Send + Sync {
    fn run(&self) -> BoxRefreshFuture;
}

impl<F, Fut> RefreshAction for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), RefreshError>> + Send + 'static,
{
    fn run(&self) -> BoxRefreshFuture {
        Box::pin(self())
    }
}

struct Inner {
    engine: PullEngine,
    /// Bumped on every refresh start and on reset; a follow-up only
    /// finishes the engine if its generation is still current.
    generation: u64,
}

/// Pull-to-refresh recognizer with an async refresh pipeline.
///
/// Cheap to clone; clones share the same engine. Each touch handler locks,
/// runs to completion, and unlocks -- transitions stay strictly ordered by
/// the sequence of calls.
#[derive(Clone)]
pub struct RefreshController {
    inner: Arc<Mutex<Inner>>,
    action: Arc<dyn RefreshAction>,
    haptics: Arc<dyn HapticFeedback>,
}

impl RefreshController {
    /// Create a controller without a haptic sink.
    pub fn new(config: PullConfig, action: impl RefreshAction + 'static) -> Result<Self, ConfigError> {
        Self::with_haptics(config, action, NoopHaptics)
    }

    /// Create a controller with a haptic sink for threshold crossings.
    pub fn with_haptics(
        config: PullConfig,
        action: impl RefreshAction + 'static,
        haptics: impl HapticFeedback + 'static,
    ) -> Result<Self, ConfigError> {
        let engine = PullEngine::new(config)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                engine,
                generation: 0,
            })),
            action: Arc::new(action),
            haptics: Arc::new(haptics),
        })
    }

    // ── Touch handlers ───────────────────────────────────────────────

    pub async fn on_touch_start(&self, y: f32, scroll_offset: f32) -> Option<Event> {
        self.inner.lock().await.engine.on_touch_start(y, scroll_offset)
    }

    /// Track a movement. Fires the haptic pulse when the move crosses the
    /// refresh threshold; pulse failures are logged and swallowed.
    pub async fn on_touch_move(&self, y: f32) -> Option<Event> {
        let event = self.inner.lock().await.engine.on_touch_move(y);
        if let Some(Event::ThresholdCrossed { .. }) = &event {
            if let Err(e) = self.haptics.pulse() {
                debug!(error = %e, "haptic pulse failed");
            }
        }
        event
    }

    /// Finish the gesture. Past the threshold this kicks off the detached
    /// refresh follow-up and returns immediately with `RefreshStarted`.
    pub async fn on_touch_end(&self) -> Option<Event> {
        let (event, generation, min_window_ms) = {
            let mut inner = self.inner.lock().await;
            let event = inner.engine.on_touch_end()?;
            if !matches!(event, Event::RefreshStarted { .. }) {
                return Some(event);
            }
            inner.generation += 1;
            let min_window_ms = inner.engine.config().refreshing_timeout_ms;
            (event, inner.generation, min_window_ms)
        };

        let inner = Arc::clone(&self.inner);
        let action = Arc::clone(&self.action);
        tokio::spawn(async move {
            let (result, _) = tokio::join!(
                action.run(),
                tokio::time::sleep(Duration::from_millis(min_window_ms)),
            );
            if let Err(e) = result {
                warn!(error = %e, "refresh action failed");
            }
            let mut inner = inner.lock().await;
            if inner.generation == generation {
                inner.engine.finish_refresh();
            } else {
                debug!("discarding settlement of superseded refresh");
            }
        });

        Some(event)
    }

    pub async fn on_touch_cancel(&self) -> Option<Event> {
        self.inner.lock().await.engine.on_touch_cancel()
    }

    /// Forcibly return to Idle. An in-flight refresh action keeps running,
    /// but its settlement is discarded.
    pub async fn reset(&self) -> Option<Event> {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.engine.reset()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> Event {
        self.inner.lock().await.engine.snapshot()
    }

    pub async fn is_pulling(&self) -> bool {
        self.inner.lock().await.engine.is_pulling()
    }

    pub async fn is_refreshing(&self) -> bool {
        self.inner.lock().await.engine.is_refreshing()
    }

    pub async fn can_refresh(&self) -> bool {
        self.inner.lock().await.engine.can_refresh()
    }

    pub async fn pull_distance(&self) -> f32 {
        self.inner.lock().await.engine.pull_distance()
    }

    pub async fn progress_pct(&self) -> f32 {
        self.inner.lock().await.engine.progress_pct()
    }

    pub async fn suppresses_scroll(&self) -> bool {
        self.inner.lock().await.engine.suppresses_scroll()
    }
}
