//! Haptic feedback seam.
//!
//! The recognizer fires a single haptic pulse when the pull crosses the
//! refresh threshold. The capability may not exist on the host platform at
//! all, so the sink is best-effort: the controller logs pulse failures at
//! debug level and moves on.

use thiserror::Error;

/// Haptic sink errors. Never propagated past the controller.
#[derive(Error, Debug)]
pub enum HapticError {
    /// The platform has no vibration capability.
    #[error("Haptic capability unavailable")]
    Unavailable,
    /// The platform refused the pulse.
    #[error("Haptic pulse failed: {0}")]
    PulseFailed(String),
}

/// A sink for threshold-crossing haptic pulses.
pub trait HapticFeedback: Send + Sync {
    /// Fire a short pulse. Called at most once per gesture.
    fn pulse(&self) -> Result<(), HapticError>;
}

/// Sink for platforms without a vibration capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHaptics;

impl HapticFeedback for NoopHaptics {
    fn pulse(&self) -> Result<(), HapticError> {
        Ok(())
    }
}
