//! Engine configuration.

use coach_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::exercise::{Exercise, ExerciseKind};

/// Optional analysis stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerModules {
    /// Velocity, stability and symmetry
    pub kinematics: bool,
    pub repetition_counting: bool,
    /// Form feedback
    pub posture: bool,
    /// Cadence, footstrike and lean while running
    pub running_gait: bool,
}

impl Default for AnalyzerModules {
    fn default() -> Self {
        Self {
            kinematics: true,
            repetition_counting: true,
            posture: true,
            running_gait: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub exercise: Exercise,
    pub modules: AnalyzerModules,
    /// Keypoints scoring below this are treated as not detected
    pub min_keypoint_score: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exercise: Exercise::General,
            modules: AnalyzerModules::default(),
            min_keypoint_score: 0.0,
        }
    }
}

impl EngineConfig {
    /// Default configuration for `kind`
    pub fn for_exercise(kind: ExerciseKind) -> Self {
        Self {
            exercise: Exercise::with_defaults(kind),
            ..Default::default()
        }
    }

    /// Load configuration from file, with `COACH_*` environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(environment())
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(environment())
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_keypoint_score) {
            return Err(Error::Config(format!(
                "min_keypoint_score must be within [0, 1], got {}",
                self.min_keypoint_score
            )));
        }
        self.exercise.validate()
    }
}

/// `COACH_EXERCISE__TYPE=squat` sets `exercise.type`
fn environment() -> config::Environment {
    config::Environment::with_prefix("COACH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::SquatParameters;

    // Tests touching COACH_* variables share the process environment
    static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.exercise.kind(), ExerciseKind::General);
        assert!(config.modules.kinematics && config.modules.running_gait);
        assert_eq!(config.min_keypoint_score, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_exercise_uses_default_parameters() {
        let config = EngineConfig::for_exercise(ExerciseKind::Squat);
        assert_eq!(config.exercise, Exercise::Squat(SquatParameters::default()));
    }

    #[test]
    fn test_validate_rejects_bad_score() {
        let config = EngineConfig {
            min_keypoint_score: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_checks_exercise() {
        let config = EngineConfig {
            exercise: Exercise::Squat(SquatParameters {
                min_depth_angle: 130.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"exercise": {"type": "pushup"}, "modules": {"posture": false}}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.exercise.kind(), ExerciseKind::Pushup);
        assert!(!config.modules.posture);
        assert!(config.modules.repetition_counting);
    }

    #[test]
    fn test_from_file() {
        let _env = ENV_LOCK.lock();
        let path = std::env::temp_dir().join(format!("coach-engine-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
min_keypoint_score = 0.25

[exercise]
type = "squat"
rep_threshold_px = 25.0

[modules]
running_gait = false
"#,
        )
        .unwrap();

        let config = EngineConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.min_keypoint_score, 0.25);
        assert!(!config.modules.running_gait);
        match config.exercise {
            Exercise::Squat(p) => {
                assert_eq!(p.rep_threshold_px, 25.0);
                assert_eq!(p.max_depth_angle, 120.0);
            }
            other => panic!("expected squat, got {other:?}"),
        }
    }

    #[test]
    fn test_from_env_overrides() {
        let _env = ENV_LOCK.lock();
        let vars = [
            ("COACH_EXERCISE__TYPE", "squat"),
            ("COACH_EXERCISE__REP_THRESHOLD_PX", "25"),
            ("COACH_MODULES__POSTURE", "false"),
            ("COACH_MIN_KEYPOINT_SCORE", "0.4"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let result = EngineConfig::from_env();
        for (key, _) in vars {
            std::env::remove_var(key);
        }

        let config = result.unwrap();
        assert_eq!(config.min_keypoint_score, 0.4);
        assert!(!config.modules.posture);
        assert!(config.modules.kinematics);
        assert_eq!(
            config.exercise,
            Exercise::Squat(SquatParameters {
                rep_threshold_px: 25.0,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_from_env_defaults() {
        let _env = ENV_LOCK.lock();
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_from_file_missing() {
        let result = EngineConfig::from_file("/nonexistent/coach-engine.toml");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
