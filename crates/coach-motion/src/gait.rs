//! Running gait metrics: cadence, footstrike and forward lean.
//!
//! ## Cadence
//!
//! Each foot's ankle height is read across the buffered frames. An ankle `y`
//! lower than both neighbours marks the top of that foot's swing, which
//! happens once per step. Steps from both feet over the elapsed time span
//! give steps per minute.
//!
//! ## Footstrike
//!
//! The 17-point vocabulary has no toe landmark, so the strike is read from the
//! grounded (lowest in image) ankle's vertical travel into the current frame:
//! still dropping hard means the heel lands first, rising means the runner is
//! already on the forefoot, anything within the dead band is a midfoot strike.

use coach_core::{body_lean_angle, KeypointName, Pose, PoseFrame, PoseHistory};
use serde::{Deserialize, Serialize};

use crate::exercise::RunningParameters;

/// Frames required before cadence is reported
pub const MIN_CADENCE_FRAMES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Footstrike {
    Heel,
    Midfoot,
    Forefoot,
}

/// Gait metrics for the latest frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitMetrics {
    /// Steps per minute, 0 until enough frames are buffered
    pub cadence: f64,
    pub footstrike: Option<Footstrike>,
    /// Forward lean in degrees
    pub lean_angle: Option<f64>,
}

impl GaitMetrics {
    pub fn from_history(pose: &Pose, history: &PoseHistory, params: &RunningParameters) -> Self {
        Self {
            cadence: cadence(history),
            footstrike: footstrike(history, params.footstrike_deadband_px),
            lean_angle: lean_angle(pose),
        }
    }
}

/// Steps per minute over the buffered history
pub fn cadence(history: &PoseHistory) -> f64 {
    if history.len() < MIN_CADENCE_FRAMES {
        return 0.0;
    }

    let (Some(first), Some(last)) = (history.get(0), history.latest()) else {
        return 0.0;
    };
    let span_secs = last.timestamp.secs_since(first.timestamp);
    if span_secs <= 0.0 {
        return 0.0;
    }

    let steps = count_local_minima(&ankle_series(history, KeypointName::LeftAnkle))
        + count_local_minima(&ankle_series(history, KeypointName::RightAnkle));

    steps as f64 / span_secs * 60.0
}

fn ankle_series(history: &PoseHistory, ankle: KeypointName) -> Vec<f64> {
    history
        .iter()
        .filter_map(|frame| frame.primary()?.get(ankle).map(|kp| kp.y))
        .collect()
}

fn count_local_minima(values: &[f64]) -> usize {
    values
        .windows(3)
        .filter(|w| w[1] < w[0] && w[1] < w[2])
        .count()
}

/// Footstrike type from the latest two frames
pub fn footstrike(history: &PoseHistory, deadband_px: f64) -> Option<Footstrike> {
    let current = history.latest().and_then(PoseFrame::primary)?;
    let previous = history.previous().and_then(PoseFrame::primary)?;

    let grounded = match (
        current.get(KeypointName::LeftAnkle),
        current.get(KeypointName::RightAnkle),
    ) {
        (Some(l), Some(r)) => {
            if l.y >= r.y {
                l
            } else {
                r
            }
        }
        (Some(kp), None) | (None, Some(kp)) => kp,
        (None, None) => return None,
    };
    let before = previous.get(grounded.name)?;

    Some(classify_footstrike(grounded.y - before.y, deadband_px))
}

/// Classify a downward-positive vertical offset with a symmetric dead band
pub fn classify_footstrike(offset: f64, deadband_px: f64) -> Footstrike {
    if offset > deadband_px {
        Footstrike::Heel
    } else if offset < -deadband_px {
        Footstrike::Forefoot
    } else {
        Footstrike::Midfoot
    }
}

/// Forward lean of the head over the hips, in degrees
pub fn lean_angle(pose: &Pose) -> Option<f64> {
    let head = pose
        .point(KeypointName::Nose)
        .or_else(|| pose.midpoint(KeypointName::LeftEar, KeypointName::RightEar))?;
    let hip = pose.midpoint(KeypointName::LeftHip, KeypointName::RightHip)?;
    Some(body_lean_angle(&head, &hip))
}
