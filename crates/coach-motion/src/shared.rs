//! Thread-safe handle around an [`AnalysisEngine`].

use std::sync::Arc;

use coach_core::{PoseFrame, Result};
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::engine::{AnalysisEngine, AnalysisResult};
use crate::exercise::{Exercise, ExerciseKind};
use crate::metrics::MovementMetrics;

/// Cloneable handle; every call takes the engine lock, so frames submitted
/// from several threads are analyzed one at a time.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<AnalysisEngine>>,
}

impl SharedEngine {
    pub fn new(engine: AnalysisEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn initialize(&self, config: EngineConfig) -> Result<()> {
        self.inner.lock().initialize(config)
    }

    pub fn analyze(&self, frame: &PoseFrame) -> Result<AnalysisResult> {
        self.inner.lock().analyze(frame)
    }

    pub fn set_exercise(&self, exercise: Exercise) -> Result<()> {
        self.inner.lock().set_exercise(exercise)
    }

    pub fn set_exercise_type(&self, kind: ExerciseKind) -> Result<()> {
        self.inner.lock().set_exercise_type(kind)
    }

    pub fn reset(&self) -> Result<()> {
        self.inner.lock().reset()
    }

    pub fn get_metrics(&self) -> Result<MovementMetrics> {
        self.inner.lock().get_metrics()
    }

    pub fn dispose(&self) -> Result<()> {
        self.inner.lock().dispose()
    }

    /// Run `f` with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut AnalysisEngine) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<AnalysisEngine> for SharedEngine {
    fn from(engine: AnalysisEngine) -> Self {
        Self::new(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::PoseBuilder;
    use std::thread;

    #[test]
    fn test_concurrent_analyze() {
        let shared = SharedEngine::new(AnalysisEngine::new());
        shared
            .initialize(EngineConfig::for_exercise(ExerciseKind::General))
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let frame = PoseBuilder::standing().frame_at(t * 1_000 + i);
                        shared.analyze(&frame).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let metrics = shared.get_metrics().unwrap();
        assert_eq!(metrics.total_frames, 100);
        assert_eq!(metrics.valid_frames, 100);
        assert_eq!(shared.with(|engine| engine.history().len()), 30);
    }

    #[test]
    fn test_lifecycle_through_handle() {
        let shared: SharedEngine = AnalysisEngine::new().into();
        shared
            .initialize(EngineConfig::for_exercise(ExerciseKind::Squat))
            .unwrap();
        for (i, signal) in [40.0, 10.0].into_iter().enumerate() {
            shared
                .analyze(&PoseBuilder::standing().squat_signal(signal).frame_at(i as i64 * 33))
                .unwrap();
        }
        assert_eq!(shared.with(|engine| engine.phase().repetition_count), 1);

        shared.set_exercise_type(ExerciseKind::Plank).unwrap();
        assert_eq!(shared.with(|engine| engine.exercise_kind()), ExerciseKind::Plank);

        shared.reset().unwrap();
        shared.dispose().unwrap();
        assert!(shared.get_metrics().is_err());
    }
}
