mod controller;
mod engine;

pub use controller::{RefreshAction, RefreshController};
pub use engine::{PullEngine, PullPhase, RefreshingState};
