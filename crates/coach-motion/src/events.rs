//! Lifecycle and result events emitted by the analysis engine.
//!
//! Events serialize as `{"event": "analysis:<name>", "payload": ...}`.
//! Sinks are injected into the engine; there is no global bus.

use coach_core::SessionId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::engine::AnalysisResult;
use crate::exercise::ExerciseKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum AnalysisEvent {
    #[serde(rename = "analysis:initialized")]
    Initialized {
        session_id: SessionId,
        exercise: ExerciseKind,
    },

    #[serde(rename = "analysis:result")]
    Result(AnalysisResult),

    #[serde(rename = "analysis:exercise-changed")]
    ExerciseChanged {
        previous: ExerciseKind,
        exercise: ExerciseKind,
    },

    #[serde(rename = "analysis:reset")]
    Reset,

    #[serde(rename = "analysis:repetition")]
    Repetition { count: u32, exercise: ExerciseKind },

    #[serde(rename = "analysis:error")]
    Error { message: String },

    #[serde(rename = "analysis:disposed")]
    Disposed,
}

impl AnalysisEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisEvent::Initialized { .. } => "analysis:initialized",
            AnalysisEvent::Result(_) => "analysis:result",
            AnalysisEvent::ExerciseChanged { .. } => "analysis:exercise-changed",
            AnalysisEvent::Reset => "analysis:reset",
            AnalysisEvent::Repetition { .. } => "analysis:repetition",
            AnalysisEvent::Error { .. } => "analysis:error",
            AnalysisEvent::Disposed => "analysis:disposed",
        }
    }

    pub fn to_json(&self) -> coach_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Receiver of engine events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &AnalysisEvent);
}

impl<F> EventSink for F
where
    F: Fn(&AnalysisEvent) + Send + Sync,
{
    fn emit(&self, event: &AnalysisEvent) {
        self(event)
    }
}

/// Forwards events into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<AnalysisEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<AnalysisEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AnalysisEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &AnalysisEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(event = event.name(), "Event receiver dropped");
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &AnalysisEvent) {}
}
