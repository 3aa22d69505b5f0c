//! Exercise definitions and the per-exercise analyzer registry.
//!
//! Each exercise kind carries its own threshold struct. The analyzers
//! implement [`ExerciseAnalyzer`], which is the only surface the engine
//! dispatches through.

use coach_core::{Error, KeypointName, Pose, PoseHistory, Result};
use serde::{Deserialize, Serialize};

use crate::feedback::{self, FeedbackMessage};
use crate::phase::{self, PhaseState, PhaseTransition};

/// Exercise tag used in results and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Squat,
    Pushup,
    Plank,
    Running,
    General,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::Pushup => "pushup",
            ExerciseKind::Plank => "plank",
            ExerciseKind::Running => "running",
            ExerciseKind::General => "general",
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Squat thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatParameters {
    /// Knee angle below which the squat is too deep (degrees)
    pub min_depth_angle: f64,
    /// Knee angle above which the squat is not deep enough (degrees)
    pub max_depth_angle: f64,
    /// Minimum knee width as a fraction of hip width
    pub knee_alignment_threshold: f64,
    /// Maximum torso lean from vertical (degrees)
    pub max_back_angle: f64,
    /// Knee-minus-hip vertical offset that latches the down phase (px)
    pub rep_threshold_px: f64,
}

impl Default for SquatParameters {
    fn default() -> Self {
        Self {
            min_depth_angle: 70.0,
            max_depth_angle: 120.0,
            knee_alignment_threshold: 0.8,
            max_back_angle: 30.0,
            rep_threshold_px: 30.0,
        }
    }
}

/// Push-up thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushupParameters {
    /// Elbow angle limit (degrees)
    pub min_arm_angle: f64,
    /// Maximum hip deviation from the shoulder-ankle line (px)
    pub body_alignment_threshold: f64,
    /// Elbow-minus-shoulder vertical offset that latches the down phase (px)
    pub rep_threshold_px: f64,
}

impl Default for PushupParameters {
    fn default() -> Self {
        Self {
            min_arm_angle: 70.0,
            body_alignment_threshold: 15.0,
            rep_threshold_px: 20.0,
        }
    }
}

/// Plank thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlankParameters {
    /// Maximum hip deviation from the shoulder-ankle line (px)
    pub alignment_threshold: f64,
    /// Vertical band around shoulder height where the hip direction is ambiguous (px)
    pub hip_position_tolerance: f64,
}

impl Default for PlankParameters {
    fn default() -> Self {
        Self {
            alignment_threshold: 10.0,
            hip_position_tolerance: 10.0,
        }
    }
}

/// Running thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningParameters {
    /// Target cadence (steps per minute)
    pub target_cadence: f64,
    /// Accepted deviation either side of the target (steps per minute)
    pub cadence_range: f64,
    /// Minimum forward lean of head over hips (degrees)
    pub min_lean_angle: f64,
    /// Maximum forward lean of head over hips (degrees)
    pub max_lean_angle: f64,
    /// Vertical dead band for footstrike classification (px)
    pub footstrike_deadband_px: f64,
}

impl RunningParameters {
    pub fn cadence_bounds(&self) -> (f64, f64) {
        (
            self.target_cadence - self.cadence_range,
            self.target_cadence + self.cadence_range,
        )
    }
}

impl Default for RunningParameters {
    fn default() -> Self {
        Self {
            target_cadence: 180.0,
            cadence_range: 20.0,
            min_lean_angle: 2.0,
            max_lean_angle: 8.0,
            footstrike_deadband_px: 10.0,
        }
    }
}

/// An exercise together with its configured thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Exercise {
    Squat(SquatParameters),
    Pushup(PushupParameters),
    Plank(PlankParameters),
    Running(RunningParameters),
    General,
}

impl Exercise {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            Exercise::Squat(_) => ExerciseKind::Squat,
            Exercise::Pushup(_) => ExerciseKind::Pushup,
            Exercise::Plank(_) => ExerciseKind::Plank,
            Exercise::Running(_) => ExerciseKind::Running,
            Exercise::General => ExerciseKind::General,
        }
    }

    /// The exercise with default thresholds
    pub fn with_defaults(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Squat => Exercise::Squat(SquatParameters::default()),
            ExerciseKind::Pushup => Exercise::Pushup(PushupParameters::default()),
            ExerciseKind::Plank => Exercise::Plank(PlankParameters::default()),
            ExerciseKind::Running => Exercise::Running(RunningParameters::default()),
            ExerciseKind::General => Exercise::General,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Exercise::Squat(p) => {
                require_non_negative("squat.min_depth_angle", p.min_depth_angle)?;
                require_non_negative("squat.knee_alignment_threshold", p.knee_alignment_threshold)?;
                require_non_negative("squat.max_back_angle", p.max_back_angle)?;
                require_finite("squat.rep_threshold_px", p.rep_threshold_px)?;
                if p.min_depth_angle > p.max_depth_angle {
                    return Err(Error::Config(format!(
                        "squat depth range inverted: {} > {}",
                        p.min_depth_angle, p.max_depth_angle
                    )));
                }
            }
            Exercise::Pushup(p) => {
                require_non_negative("pushup.min_arm_angle", p.min_arm_angle)?;
                require_non_negative("pushup.body_alignment_threshold", p.body_alignment_threshold)?;
                require_finite("pushup.rep_threshold_px", p.rep_threshold_px)?;
            }
            Exercise::Plank(p) => {
                require_non_negative("plank.alignment_threshold", p.alignment_threshold)?;
                require_non_negative("plank.hip_position_tolerance", p.hip_position_tolerance)?;
            }
            Exercise::Running(p) => {
                require_non_negative("running.target_cadence", p.target_cadence)?;
                require_non_negative("running.cadence_range", p.cadence_range)?;
                require_non_negative("running.footstrike_deadband_px", p.footstrike_deadband_px)?;
                require_non_negative("running.min_lean_angle", p.min_lean_angle)?;
                if p.min_lean_angle > p.max_lean_angle {
                    return Err(Error::Config(format!(
                        "running lean range inverted: {} > {}",
                        p.min_lean_angle, p.max_lean_angle
                    )));
                }
            }
            Exercise::General => {}
        }
        Ok(())
    }
}

impl Default for Exercise {
    fn default() -> Self {
        Exercise::General
    }
}

fn require_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::Config(format!("{field} must be finite")))
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(Error::Config(format!("{field} must be non-negative, got {value}")));
    }
    Ok(())
}

/// Per-exercise capability: form feedback and (optionally) phase tracking
pub trait ExerciseAnalyzer: Send + Sync {
    fn kind(&self) -> ExerciseKind;

    /// Coded feedback for the current pose; `history` already contains it
    fn form_feedback(&self, pose: &Pose, history: &PoseHistory) -> Vec<FeedbackMessage>;

    /// Next phase for this pose. Continuous exercises never transition.
    fn advance_phase(&self, _pose: &Pose, state: &PhaseState) -> PhaseTransition {
        PhaseTransition::hold(state)
    }

    fn counts_repetitions(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
pub struct SquatAnalyzer {
    pub params: SquatParameters,
}

impl ExerciseAnalyzer for SquatAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Squat
    }

    fn form_feedback(&self, pose: &Pose, _history: &PoseHistory) -> Vec<FeedbackMessage> {
        feedback::squat_feedback(pose, &self.params)
    }

    fn advance_phase(&self, pose: &Pose, state: &PhaseState) -> PhaseTransition {
        let signal = phase::vertical_offset(
            pose,
            (KeypointName::LeftKnee, KeypointName::RightKnee),
            (KeypointName::LeftHip, KeypointName::RightHip),
        );
        match signal {
            Some(signal) => phase::latch_transition(signal, self.params.rep_threshold_px, state),
            None => PhaseTransition::hold(state),
        }
    }

    fn counts_repetitions(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct PushupAnalyzer {
    pub params: PushupParameters,
}

impl ExerciseAnalyzer for PushupAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Pushup
    }

    fn form_feedback(&self, pose: &Pose, _history: &PoseHistory) -> Vec<FeedbackMessage> {
        feedback::pushup_feedback(pose, &self.params)
    }

    fn advance_phase(&self, pose: &Pose, state: &PhaseState) -> PhaseTransition {
        let signal = phase::vertical_offset(
            pose,
            (KeypointName::LeftElbow, KeypointName::RightElbow),
            (KeypointName::LeftShoulder, KeypointName::RightShoulder),
        );
        match signal {
            Some(signal) => phase::latch_transition(signal, self.params.rep_threshold_px, state),
            None => PhaseTransition::hold(state),
        }
    }

    fn counts_repetitions(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlankAnalyzer {
    pub params: PlankParameters,
}

impl ExerciseAnalyzer for PlankAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Plank
    }

    fn form_feedback(&self, pose: &Pose, _history: &PoseHistory) -> Vec<FeedbackMessage> {
        feedback::plank_feedback(pose, &self.params)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunningAnalyzer {
    pub params: RunningParameters,
}

impl ExerciseAnalyzer for RunningAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Running
    }

    fn form_feedback(&self, pose: &Pose, history: &PoseHistory) -> Vec<FeedbackMessage> {
        feedback::running_feedback(pose, history, &self.params)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneralAnalyzer;

impl ExerciseAnalyzer for GeneralAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::General
    }

    fn form_feedback(&self, pose: &Pose, _history: &PoseHistory) -> Vec<FeedbackMessage> {
        feedback::general_feedback(pose)
    }
}

/// Holds the configured analyzer for every exercise kind
#[derive(Debug, Clone, Default)]
pub struct AnalyzerRegistry {
    squat: SquatAnalyzer,
    pushup: PushupAnalyzer,
    plank: PlankAnalyzer,
    running: RunningAnalyzer,
    general: GeneralAnalyzer,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the thresholds of the exercise's kind
    pub fn configure(&mut self, exercise: &Exercise) {
        match exercise {
            Exercise::Squat(params) => self.squat.params = *params,
            Exercise::Pushup(params) => self.pushup.params = *params,
            Exercise::Plank(params) => self.plank.params = *params,
            Exercise::Running(params) => self.running.params = *params,
            Exercise::General => {}
        }
    }

    pub fn analyzer(&self, kind: ExerciseKind) -> &dyn ExerciseAnalyzer {
        match kind {
            ExerciseKind::Squat => &self.squat,
            ExerciseKind::Pushup => &self.pushup,
            ExerciseKind::Plank => &self.plank,
            ExerciseKind::Running => &self.running,
            ExerciseKind::General => &self.general,
        }
    }

    /// Currently configured thresholds for `kind`
    pub fn exercise(&self, kind: ExerciseKind) -> Exercise {
        match kind {
            ExerciseKind::Squat => Exercise::Squat(self.squat.params),
            ExerciseKind::Pushup => Exercise::Pushup(self.pushup.params),
            ExerciseKind::Plank => Exercise::Plank(self.plank.params),
            ExerciseKind::Running => Exercise::Running(self.running.params),
            ExerciseKind::General => Exercise::General,
        }
    }

    pub fn running_parameters(&self) -> &RunningParameters {
        &self.running.params
    }
}
