//! Derived movement metrics computed from the frame history.

use coach_core::{KeypointName, Pose, PoseFrame, PoseHistory};
use serde::{Deserialize, Serialize};

use crate::config::AnalyzerModules;
use crate::exercise::RunningParameters;
use crate::gait::{Footstrike, GaitMetrics};

/// Frames averaged for the stability score
pub const STABILITY_WINDOW: usize = 5;

/// Mean displacement (px) of keypoints present in both poses.
///
/// Keypoints without a name match in `previous` are skipped; zero when
/// nothing matches.
pub fn pose_velocity(current: &Pose, previous: &Pose) -> f64 {
    let displacements: Vec<f64> = current
        .keypoints
        .iter()
        .filter_map(|kp| previous.get(kp.name).map(|prev| kp.distance_to(prev)))
        .collect();

    if displacements.is_empty() {
        return 0.0;
    }
    displacements.iter().sum::<f64>() / displacements.len() as f64
}

/// Velocity between the two most recent frames
pub fn velocity(history: &PoseHistory) -> f64 {
    let current = history.latest().and_then(PoseFrame::primary);
    let previous = history.previous().and_then(PoseFrame::primary);
    match (current, previous) {
        (Some(current), Some(previous)) => pose_velocity(current, previous),
        _ => 0.0,
    }
}

/// `max(0, 100 - 10 * v)` over the mean velocity of the last few frames
pub fn stability(history: &PoseHistory) -> f64 {
    let poses: Vec<&Pose> = history
        .recent(STABILITY_WINDOW)
        .filter_map(PoseFrame::primary)
        .collect();

    let velocities: Vec<f64> = poses
        .windows(2)
        .map(|pair| pose_velocity(pair[1], pair[0]))
        .collect();

    let mean_velocity = if velocities.is_empty() {
        0.0
    } else {
        velocities.iter().sum::<f64>() / velocities.len() as f64
    };

    (100.0 - 10.0 * mean_velocity).clamp(0.0, 100.0)
}

/// Left/right balance of shoulders and hips, 100 when level
pub fn symmetry(pose: &Pose) -> Option<f64> {
    use KeypointName::*;

    let shoulder_dy = (pose.get(LeftShoulder)?.y - pose.get(RightShoulder)?.y).abs();
    let hip_dy = (pose.get(LeftHip)?.y - pose.get(RightHip)?.y).abs();

    Some((100.0 - (shoulder_dy + hip_dy) / 2.0).clamp(0.0, 100.0))
}

/// Mean keypoint score as a rounded percentage
pub fn confidence(pose: &Pose) -> u32 {
    pose.mean_score()
        .map(|score| (score * 100.0).round().clamp(0.0, 100.0) as u32)
        .unwrap_or(0)
}

/// Metrics for one analyzed frame.
///
/// Fields are absent when their module is disabled, when they do not apply to
/// the current exercise, or when the keypoints they need are missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    pub velocity: Option<f64>,
    pub stability: Option<f64>,
    pub symmetry: Option<f64>,
    pub cadence: Option<f64>,
    pub footstrike: Option<Footstrike>,
    pub lean_angle: Option<f64>,
}

impl FrameMetrics {
    /// `history` must already contain the frame of `pose`
    pub fn compute(
        pose: &Pose,
        history: &PoseHistory,
        modules: &AnalyzerModules,
        running: Option<&RunningParameters>,
    ) -> Self {
        let mut metrics = Self::default();

        if modules.kinematics {
            metrics.velocity = Some(velocity(history));
            metrics.stability = Some(stability(history));
            metrics.symmetry = symmetry(pose);
        }

        if let (true, Some(params)) = (modules.running_gait, running) {
            let gait = GaitMetrics::from_history(pose, history, params);
            metrics.cadence = Some(gait.cadence);
            metrics.footstrike = gait.footstrike;
            metrics.lean_angle = gait.lean_angle;
        }

        metrics
    }
}

/// Session-level metrics accumulated across frames
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementMetrics {
    pub velocity: f64,
    pub stability: f64,
    /// Last available symmetry score
    pub symmetry: f64,
    /// Running blend `(previous + current) / 2` of per-frame confidence
    pub average_confidence: f64,
    pub total_frames: u64,
    /// Frames whose primary pose kept at least one keypoint
    pub valid_frames: u64,
    /// Last running cadence (steps per minute)
    pub cadence: f64,
}

impl MovementMetrics {
    pub fn record(&mut self, frame: &FrameMetrics, confidence: u32, valid: bool) {
        self.total_frames += 1;
        if valid {
            self.valid_frames += 1;
        }

        if let Some(velocity) = frame.velocity {
            self.velocity = velocity;
        }
        if let Some(stability) = frame.stability {
            self.stability = stability;
        }
        if let Some(symmetry) = frame.symmetry {
            self.symmetry = symmetry;
        }
        if let Some(cadence) = frame.cadence {
            self.cadence = cadence;
        }

        self.average_confidence = (self.average_confidence + confidence as f64) / 2.0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
