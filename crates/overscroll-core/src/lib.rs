//! # Overscroll Core Library
//!
//! This library provides the core logic for Overscroll, a pull-to-refresh
//! gesture recognizer. It converts raw vertical touch movement into a
//! bounded, resisted pull metric, decides when a refresh should fire, and
//! manages the minimum-duration "refreshing" display window.
//!
//! ## Architecture
//!
//! - **Pull Engine**: A wall-clock-based state machine that requires the
//!   caller to feed it touch events and, while refreshing, to periodically
//!   invoke `tick()` for progress updates
//! - **Refresh Controller**: A tokio-backed driver that owns an engine,
//!   runs the caller-supplied async refresh action, and enforces the
//!   minimum display window as a two-party join (action settled AND
//!   timeout elapsed)
//! - **Haptics**: Trait seam for the best-effort vibration sink
//!
//! ## Key Components
//!
//! - [`PullEngine`]: Core gesture state machine
//! - [`RefreshController`]: Async driver around the engine
//! - [`PullConfig`]: Recognizer configuration
//! - [`HapticFeedback`]: Trait for haptic pulse sinks

pub mod config;
pub mod error;
pub mod events;
pub mod haptics;
pub mod recognizer;

pub use config::PullConfig;
pub use error::{ConfigError, CoreError, RefreshError};
pub use events::Event;
pub use haptics::{HapticError, HapticFeedback, NoopHaptics};
pub use recognizer::{PullEngine, PullPhase, RefreshAction, RefreshController};
