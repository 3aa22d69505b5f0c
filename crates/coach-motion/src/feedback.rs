//! Exercise-specific form feedback.
//!
//! Every rule reads named keypoints from the current pose. Missing keypoints
//! never produce an error: the rule set returns a single
//! [`FeedbackCode::IncompleteKeypoints`] message instead of guessing geometry.

use coach_core::{
    alignment_deviation, angle_at_vertex, body_lean_angle, KeypointName, Pose, PoseHistory,
};
use serde::{Deserialize, Serialize};

use crate::exercise::{PlankParameters, PushupParameters, RunningParameters, SquatParameters};
use crate::gait::{self, Footstrike};

/// Frames required before running form is assessed
pub const MIN_RUNNING_FRAMES: usize = 5;

const LOW_QUALITY_SCORE: f64 = 0.5;
const HIGH_QUALITY_SCORE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCode {
    IncompleteKeypoints,
    SquatNotDeepEnough,
    SquatTooDeep,
    KneesCavingIn,
    ExcessiveForwardLean,
    GoodSquatForm,
    BodyNotStraight,
    DescendFurther,
    GoodPushupForm,
    HipsTooHigh,
    HipsSagging,
    GoodPlankForm,
    AnalyzingRunningForm,
    CadenceTooLow,
    CadenceTooHigh,
    CadenceOnTarget,
    Footstrike,
    LeanTooUpright,
    LeanTooFar,
    LowDetectionQuality,
    FairDetectionQuality,
    HighDetectionQuality,
}

impl FeedbackCode {
    pub fn severity(&self) -> Severity {
        use FeedbackCode::*;
        match self {
            IncompleteKeypoints | LowDetectionQuality => Severity::Error,
            SquatNotDeepEnough | SquatTooDeep | KneesCavingIn | ExcessiveForwardLean
            | BodyNotStraight | DescendFurther | HipsTooHigh | HipsSagging | CadenceTooLow
            | CadenceTooHigh | LeanTooUpright | LeanTooFar => Severity::Warning,
            AnalyzingRunningForm | FeedbackCode::Footstrike | FairDetectionQuality => Severity::Info,
            GoodSquatForm | GoodPushupForm | GoodPlankForm | CadenceOnTarget
            | HighDetectionQuality => Severity::Success,
        }
    }

    pub fn default_message(&self) -> &'static str {
        use FeedbackCode::*;
        match self {
            IncompleteKeypoints => "incomplete keypoint detection",
            SquatNotDeepEnough => "squat not deep enough, lower your hips",
            SquatTooDeep => "squat too deep, protect your knees",
            KneesCavingIn => "knees caving in, push them outward",
            ExcessiveForwardLean => "excessive forward lean, keep your chest up",
            GoodSquatForm => "good squat form",
            BodyNotStraight => "keep your body in a straight line",
            DescendFurther => "descend further",
            GoodPushupForm => "good push-up form",
            HipsTooHigh => "hips too high, lower them in line with your body",
            HipsSagging => "hips sagging, lift them in line with your body",
            GoodPlankForm => "good form, hold steady",
            AnalyzingRunningForm => "analyzing running form...",
            CadenceTooLow => "cadence too low, take quicker steps",
            CadenceTooHigh => "cadence too high, lengthen your stride",
            CadenceOnTarget => "cadence on target",
            FeedbackCode::Footstrike => "footstrike detected",
            LeanTooUpright => "lean slightly forward from the ankles",
            LeanTooFar => "too much forward lean",
            LowDetectionQuality => "low detection quality, improve lighting or framing",
            FairDetectionQuality => "acceptable detection quality",
            HighDetectionQuality => "high detection quality",
        }
    }
}

/// One coded, human-readable feedback item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub code: FeedbackCode,
    pub severity: Severity,
    pub message: String,
}

impl FeedbackMessage {
    pub fn new(code: FeedbackCode) -> Self {
        Self::with_message(code, code.default_message())
    }

    pub fn with_message(code: FeedbackCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning | Severity::Error)
    }
}

fn incomplete() -> Vec<FeedbackMessage> {
    vec![FeedbackMessage::new(FeedbackCode::IncompleteKeypoints)]
}

/// Mean of the available values, `None` when none are
fn mean_of(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

pub fn squat_feedback(pose: &Pose, params: &SquatParameters) -> Vec<FeedbackMessage> {
    use KeypointName::*;

    let (Some(lh), Some(rh), Some(lk), Some(rk), Some(la), Some(ra)) = (
        pose.get(LeftHip),
        pose.get(RightHip),
        pose.get(LeftKnee),
        pose.get(RightKnee),
        pose.get(LeftAnkle),
        pose.get(RightAnkle),
    ) else {
        return incomplete();
    };

    let mut feedback = Vec::new();

    let knee_angle = mean_of(&[
        angle_at_vertex(&lh.position(), &lk.position(), &la.position()),
        angle_at_vertex(&rh.position(), &rk.position(), &ra.position()),
    ]);
    if let Some(angle) = knee_angle {
        if angle > params.max_depth_angle {
            feedback.push(FeedbackMessage::new(FeedbackCode::SquatNotDeepEnough));
        } else if angle < params.min_depth_angle {
            feedback.push(FeedbackMessage::new(FeedbackCode::SquatTooDeep));
        }
    }

    let hip_width = (lh.x - rh.x).abs();
    let knee_width = (lk.x - rk.x).abs();
    if hip_width > 0.0 && knee_width < params.knee_alignment_threshold * hip_width {
        feedback.push(FeedbackMessage::new(FeedbackCode::KneesCavingIn));
    }

    let shoulders = pose.midpoint(LeftShoulder, RightShoulder);
    let hips = pose.midpoint(LeftHip, RightHip);
    if let (Some(shoulders), Some(hips)) = (shoulders, hips) {
        if body_lean_angle(&shoulders, &hips) > params.max_back_angle {
            feedback.push(FeedbackMessage::new(FeedbackCode::ExcessiveForwardLean));
        }
    }

    if feedback.is_empty() {
        feedback.push(FeedbackMessage::new(FeedbackCode::GoodSquatForm));
    }
    feedback
}

pub fn pushup_feedback(pose: &Pose, params: &PushupParameters) -> Vec<FeedbackMessage> {
    use KeypointName::*;

    let (Some(shoulder), Some(elbow), Some(wrist), Some(hip), Some(ankle)) = (
        pose.midpoint(LeftShoulder, RightShoulder),
        pose.midpoint(LeftElbow, RightElbow),
        pose.midpoint(LeftWrist, RightWrist),
        pose.midpoint(LeftHip, RightHip),
        pose.midpoint(LeftAnkle, RightAnkle),
    ) else {
        return incomplete();
    };

    let mut feedback = Vec::new();

    if alignment_deviation(&shoulder, &[hip], &ankle) > params.body_alignment_threshold {
        feedback.push(FeedbackMessage::new(FeedbackCode::BodyNotStraight));
    }

    if let Some(elbow_angle) = angle_at_vertex(&shoulder, &elbow, &wrist) {
        if elbow_angle < params.min_arm_angle {
            feedback.push(FeedbackMessage::new(FeedbackCode::DescendFurther));
        }
    }

    if feedback.is_empty() {
        feedback.push(FeedbackMessage::new(FeedbackCode::GoodPushupForm));
    }
    feedback
}

pub fn plank_feedback(pose: &Pose, params: &PlankParameters) -> Vec<FeedbackMessage> {
    use KeypointName::*;

    let (Some(shoulder), Some(hip), Some(ankle)) = (
        pose.midpoint(LeftShoulder, RightShoulder),
        pose.midpoint(LeftHip, RightHip),
        pose.midpoint(LeftAnkle, RightAnkle),
    ) else {
        return incomplete();
    };

    if alignment_deviation(&shoulder, &[hip], &ankle) <= params.alignment_threshold {
        return vec![FeedbackMessage::new(FeedbackCode::GoodPlankForm)];
    }

    // Image y grows downwards: a hip above the shoulders has the smaller y
    let dy = hip.y - shoulder.y;
    let code = if dy < -params.hip_position_tolerance {
        FeedbackCode::HipsTooHigh
    } else if dy > params.hip_position_tolerance {
        FeedbackCode::HipsSagging
    } else {
        FeedbackCode::BodyNotStraight
    };
    vec![FeedbackMessage::new(code)]
}

pub fn running_feedback(
    pose: &Pose,
    history: &PoseHistory,
    params: &RunningParameters,
) -> Vec<FeedbackMessage> {
    if history.len() < MIN_RUNNING_FRAMES {
        return vec![FeedbackMessage::new(FeedbackCode::AnalyzingRunningForm)];
    }

    let mut feedback = Vec::new();

    let cadence = gait::cadence(history);
    if cadence > 0.0 {
        let (low, high) = params.cadence_bounds();
        let code = if cadence < low {
            FeedbackCode::CadenceTooLow
        } else if cadence > high {
            FeedbackCode::CadenceTooHigh
        } else {
            FeedbackCode::CadenceOnTarget
        };
        feedback.push(FeedbackMessage::with_message(
            code,
            format!(
                "{} ({:.0} steps/min, target {:.0}-{:.0})",
                code.default_message(),
                cadence,
                low,
                high
            ),
        ));
    }

    if let Some(strike) = gait::footstrike(history, params.footstrike_deadband_px) {
        let message = match strike {
            Footstrike::Heel => "heel strike, land closer to your midfoot",
            Footstrike::Midfoot => "midfoot strike",
            Footstrike::Forefoot => "forefoot strike",
        };
        feedback.push(FeedbackMessage::with_message(FeedbackCode::Footstrike, message));
    }

    if let Some(lean) = gait::lean_angle(pose) {
        if lean < params.min_lean_angle {
            feedback.push(FeedbackMessage::new(FeedbackCode::LeanTooUpright));
        } else if lean > params.max_lean_angle {
            feedback.push(FeedbackMessage::with_message(
                FeedbackCode::LeanTooFar,
                format!("too much forward lean ({lean:.1} degrees)"),
            ));
        }
    }

    feedback
}

pub fn general_feedback(pose: &Pose) -> Vec<FeedbackMessage> {
    let code = match pose.mean_score() {
        None => return incomplete(),
        Some(score) if score < LOW_QUALITY_SCORE => FeedbackCode::LowDetectionQuality,
        Some(score) if score >= HIGH_QUALITY_SCORE => FeedbackCode::HighDetectionQuality,
        Some(_) => FeedbackCode::FairDetectionQuality,
    };
    vec![FeedbackMessage::new(code)]
}
