//! Analysis engine: owns the history, phase state and metrics of one session.
//!
//! Per frame the engine pushes the primary pose into the history, advances
//! the phase latch, builds form feedback, computes metrics and emits an
//! `analysis:result` event. Calls must be serialized by the caller (see
//! [`crate::SharedEngine`] for a locked handle).

use coach_core::{Error, PoseFrame, PoseHistory, Result, SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::events::{AnalysisEvent, EventSink};
use crate::exercise::{AnalyzerRegistry, Exercise, ExerciseKind};
use crate::feedback::FeedbackMessage;
use crate::metrics::{self, FrameMetrics, MovementMetrics};
use crate::phase::{Phase, PhaseState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Uninitialized,
    Ready,
    Disposed,
}

/// Output of one `analyze` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub session_id: SessionId,
    pub exercise_type: ExerciseKind,
    pub repetition_count: u32,
    pub current_phase: Phase,
    pub form_feedback: Vec<FeedbackMessage>,
    pub movement_metrics: FrameMetrics,
    /// Mean keypoint score as a percentage
    pub confidence: u32,
    pub timestamp: Timestamp,
}

pub struct AnalysisEngine {
    session_id: SessionId,
    state: EngineState,
    config: EngineConfig,
    registry: AnalyzerRegistry,
    history: PoseHistory,
    phase: PhaseState,
    metrics: MovementMetrics,
    sinks: Vec<Box<dyn EventSink>>,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self {
            session_id: SessionId::new(),
            state: EngineState::Uninitialized,
            config: EngineConfig::default(),
            registry: AnalyzerRegistry::new(),
            history: PoseHistory::new(),
            phase: PhaseState::new(),
            metrics: MovementMetrics::default(),
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Register a callback for every emitted event
    pub fn on_event<F>(&mut self, callback: F)
    where
        F: Fn(&AnalysisEvent) + Send + Sync + 'static,
    {
        self.sinks.push(Box::new(callback));
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn exercise_kind(&self) -> ExerciseKind {
        self.config.exercise.kind()
    }

    pub fn phase(&self) -> PhaseState {
        self.phase
    }

    pub fn history(&self) -> &PoseHistory {
        &self.history
    }

    /// Apply `config` and start a fresh session state
    pub fn initialize(&mut self, config: EngineConfig) -> Result<()> {
        if self.state == EngineState::Disposed {
            return Err(Error::Disposed);
        }
        config.validate()?;

        self.registry = AnalyzerRegistry::new();
        self.registry.configure(&config.exercise);
        self.config = config;
        self.clear_session();
        self.state = EngineState::Ready;

        info!(
            session = %self.session_id.0,
            exercise = %self.exercise_kind(),
            "Analysis engine initialized"
        );
        self.emit(AnalysisEvent::Initialized {
            session_id: self.session_id,
            exercise: self.exercise_kind(),
        });
        Ok(())
    }

    /// Analyze one frame.
    ///
    /// Failures are emitted as `analysis:error` before being returned.
    pub fn analyze(&mut self, frame: &PoseFrame) -> Result<AnalysisResult> {
        match self.try_analyze(frame) {
            Ok(result) => {
                self.emit(AnalysisEvent::Result(result.clone()));
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "Frame analysis failed");
                self.emit(AnalysisEvent::Error {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn try_analyze(&mut self, frame: &PoseFrame) -> Result<AnalysisResult> {
        self.ensure_ready()?;

        let pose = frame.primary().ok_or(Error::NoPoseDetected)?;
        pose.validate()?;
        let pose = pose.confident(self.config.min_keypoint_score);

        self.history.push(PoseFrame::new(
            vec![pose.clone()],
            frame.timestamp,
            frame.input_dimensions,
        ));

        let kind = self.exercise_kind();
        let modules = self.config.modules;
        let analyzer = self.registry.analyzer(kind);

        if modules.repetition_counting && analyzer.counts_repetitions() {
            let transition = analyzer.advance_phase(&pose, &self.phase);
            if transition.phase != self.phase.current_phase {
                debug!(from = ?self.phase.current_phase, to = ?transition.phase, "Phase change");
            }
            if self.phase.apply(transition) {
                info!(count = self.phase.repetition_count, exercise = %kind, "Repetition completed");
                self.emit(AnalysisEvent::Repetition {
                    count: self.phase.repetition_count,
                    exercise: kind,
                });
            }
        }

        let form_feedback = if modules.posture {
            analyzer.form_feedback(&pose, &self.history)
        } else {
            Vec::new()
        };

        let running = (kind == ExerciseKind::Running).then(|| self.registry.running_parameters());
        let movement_metrics = FrameMetrics::compute(&pose, &self.history, &modules, running);
        let confidence = metrics::confidence(&pose);
        self.metrics
            .record(&movement_metrics, confidence, !pose.keypoints.is_empty());

        debug!(
            frames = self.history.len(),
            confidence,
            feedback = form_feedback.len(),
            "Frame analyzed"
        );

        Ok(AnalysisResult {
            session_id: self.session_id,
            exercise_type: kind,
            repetition_count: self.phase.repetition_count,
            current_phase: self.phase.current_phase,
            form_feedback,
            movement_metrics,
            confidence,
            timestamp: frame.timestamp,
        })
    }

    /// Switch exercise and thresholds; clears history and phase.
    ///
    /// `analysis:exercise-changed` is only emitted when the kind changes.
    pub fn set_exercise(&mut self, exercise: Exercise) -> Result<()> {
        self.ensure_ready()?;
        exercise.validate()?;

        let previous = self.exercise_kind();
        self.registry.configure(&exercise);
        self.config.exercise = exercise;
        self.history.clear();
        self.phase.reset();

        let current = self.exercise_kind();
        if previous != current {
            info!(from = %previous, to = %current, "Exercise changed");
            self.emit(AnalysisEvent::ExerciseChanged {
                previous,
                exercise: current,
            });
        }
        Ok(())
    }

    /// Switch to `kind` using its currently configured thresholds
    pub fn set_exercise_type(&mut self, kind: ExerciseKind) -> Result<()> {
        let exercise = self.registry.exercise(kind);
        self.set_exercise(exercise)
    }

    pub fn reset(&mut self) -> Result<()> {
        if self.state == EngineState::Disposed {
            return Err(Error::Disposed);
        }
        self.clear_session();
        info!(session = %self.session_id.0, "Analysis engine reset");
        self.emit(AnalysisEvent::Reset);
        Ok(())
    }

    /// Snapshot of the accumulated session metrics
    pub fn get_metrics(&self) -> Result<MovementMetrics> {
        self.ensure_ready()?;
        Ok(self.metrics.clone())
    }

    /// Reset, drop the configuration and refuse further calls
    pub fn dispose(&mut self) -> Result<()> {
        self.reset()?;
        self.config = EngineConfig::default();
        self.registry = AnalyzerRegistry::new();
        self.state = EngineState::Disposed;
        info!(session = %self.session_id.0, "Analysis engine disposed");
        self.emit(AnalysisEvent::Disposed);
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            EngineState::Ready => Ok(()),
            EngineState::Uninitialized => Err(Error::NotInitialized),
            EngineState::Disposed => Err(Error::Disposed),
        }
    }

    fn clear_session(&mut self) {
        self.history.clear();
        self.phase.reset();
        self.metrics.reset();
    }

    fn emit(&self, event: AnalysisEvent) {
        for sink in &self.sinks {
            sink.emit(&event);
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("exercise", &self.exercise_kind())
            .field("frames", &self.history.len())
            .field("phase", &self.phase)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
