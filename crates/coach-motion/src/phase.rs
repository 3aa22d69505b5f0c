//! Repetition phase tracking.
//!
//! Counting uses a one-sided latch: the phase only moves to `Up` (and the
//! count only increments) from `Down`, so a signal oscillating around the
//! threshold while up never double-counts.

use coach_core::{KeypointName, Pose};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Neutral,
    Down,
    Up,
}

/// Phase and repetition count for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseState {
    pub current_phase: Phase,
    pub repetition_count: u32,
}

impl PhaseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a transition, returning true when it completed a repetition
    pub fn apply(&mut self, transition: PhaseTransition) -> bool {
        self.current_phase = transition.phase;
        if transition.repetition_completed {
            self.repetition_count += 1;
        }
        transition.repetition_completed
    }
}

/// Outcome of observing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub phase: Phase,
    pub repetition_completed: bool,
}

impl PhaseTransition {
    /// Stay in the current phase
    pub fn hold(state: &PhaseState) -> Self {
        Self {
            phase: state.current_phase,
            repetition_completed: false,
        }
    }
}

/// Advance the latch for one depth-signal sample.
///
/// `signal > threshold` enters `Down`; `signal < threshold` while `Down`
/// completes a repetition and enters `Up`. A signal exactly on the threshold
/// leaves the phase unchanged.
pub fn latch_transition(signal: f64, threshold: f64, state: &PhaseState) -> PhaseTransition {
    if signal > threshold && state.current_phase != Phase::Down {
        PhaseTransition {
            phase: Phase::Down,
            repetition_completed: false,
        }
    } else if signal < threshold && state.current_phase == Phase::Down {
        PhaseTransition {
            phase: Phase::Up,
            repetition_completed: true,
        }
    } else {
        PhaseTransition::hold(state)
    }
}

/// `avg(lower.y) - avg(upper.y)` over left/right pairs.
///
/// All four keypoints are required; the signal is unavailable otherwise.
pub fn vertical_offset(
    pose: &Pose,
    lower: (KeypointName, KeypointName),
    upper: (KeypointName, KeypointName),
) -> Option<f64> {
    let lower_left = pose.get(lower.0)?;
    let lower_right = pose.get(lower.1)?;
    let upper_left = pose.get(upper.0)?;
    let upper_right = pose.get(upper.1)?;

    let lower_y = (lower_left.y + lower_right.y) / 2.0;
    let upper_y = (upper_left.y + upper_right.y) / 2.0;
    Some(lower_y - upper_y)
}
