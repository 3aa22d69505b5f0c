//! # Coach-Motion
//!
//! Real-time exercise analysis over a stream of 2D pose keypoints.
//!
//! ## Pipeline
//!
//! For every frame the [`AnalysisEngine`]:
//!
//! 1. Pushes the primary pose into a 30-frame history ring
//! 2. Advances the exercise phase latch and counts repetitions
//! 3. Builds coded form feedback for the configured exercise
//! 4. Computes movement metrics (velocity, stability, symmetry and, while
//!    running, cadence, footstrike and lean)
//!
//! ## Exercises
//!
//! - **Squat** / **Push-up**: phase tracking with repetition counting
//! - **Plank**: body alignment feedback
//! - **Running**: cadence, footstrike and forward lean
//! - **General**: detection quality only
//!
//! Results and lifecycle changes are delivered as [`AnalysisEvent`]s to the
//! sinks registered on the engine.

pub mod config;
pub mod engine;
pub mod events;
pub mod exercise;
pub mod feedback;
pub mod gait;
pub mod metrics;
pub mod phase;
pub mod shared;

#[cfg(test)]
mod test_support;

pub use self::config::*;
pub use engine::*;
pub use events::*;
pub use exercise::*;
pub use feedback::*;
pub use gait::*;
pub use metrics::*;
pub use phase::*;
pub use shared::*;
