//! Fundamental types for pose-based exercise analysis.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier for one analysis session (one engine instance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Browser frame clocks report milliseconds
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_millis(&self) -> i64 {
        self.0 / 1_000_000
    }

    /// Seconds elapsed since `earlier`; negative if `earlier` is later.
    ///
    /// Spans beyond the `i64` nanosecond range saturate.
    pub fn secs_since(&self, earlier: Timestamp) -> f64 {
        self.0.saturating_sub(earlier.0) as f64 / 1_000_000_000.0
    }
}

/// 17-joint body keypoint vocabulary (COCO order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum KeypointName {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointName {
    pub const COUNT: usize = 17;

    pub const ALL: [KeypointName; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn from_index(idx: u8) -> Option<Self> {
        Self::ALL.get(idx as usize).copied()
    }

    /// Wire name used by pose-detection models (`left_knee`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl std::fmt::Display for KeypointName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named landmark in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: KeypointName,
    pub x: f64,
    pub y: f64,
    /// Detection confidence in [0, 1]
    pub score: f64,
}

impl Keypoint {
    pub fn new(name: KeypointName, x: f64, y: f64, score: f64) -> Self {
        Self { name, x, y, score }
    }

    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Keypoint) -> f64 {
        nalgebra::distance(&self.position(), &other.position())
    }
}

/// One detected body with its keypoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    /// Overall pose confidence
    pub score: f64,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>, score: f64) -> Self {
        Self { keypoints, score }
    }

    pub fn get(&self, name: KeypointName) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }

    pub fn point(&self, name: KeypointName) -> Option<Point2<f64>> {
        self.get(name).map(Keypoint::position)
    }

    /// True when every named keypoint is present
    pub fn has_all(&self, names: &[KeypointName]) -> bool {
        names.iter().all(|name| self.get(*name).is_some())
    }

    /// Midpoint of a left/right pair, falling back to whichever side is visible
    pub fn midpoint(&self, left: KeypointName, right: KeypointName) -> Option<Point2<f64>> {
        match (self.point(left), self.point(right)) {
            (Some(l), Some(r)) => Some(nalgebra::center(&l, &r)),
            (Some(p), None) | (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }

    /// Mean keypoint score, `None` for a pose without keypoints
    pub fn mean_score(&self) -> Option<f64> {
        if self.keypoints.is_empty() {
            return None;
        }
        let sum: f64 = self.keypoints.iter().map(|kp| kp.score).sum();
        Some(sum / self.keypoints.len() as f64)
    }

    /// Copy of this pose without keypoints scoring below `min_score`
    pub fn confident(&self, min_score: f64) -> Pose {
        Pose {
            keypoints: self
                .keypoints
                .iter()
                .filter(|kp| kp.score >= min_score)
                .copied()
                .collect(),
            score: self.score,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.score.is_finite() {
            return Err(Error::InvalidFrame("pose score is not finite".into()));
        }
        for kp in &self.keypoints {
            if !kp.x.is_finite() || !kp.y.is_finite() {
                return Err(Error::InvalidFrame(format!(
                    "keypoint {} has non-finite coordinates",
                    kp.name
                )));
            }
            if !(0.0..=1.0).contains(&kp.score) {
                return Err(Error::InvalidFrame(format!(
                    "keypoint {} score {} outside [0, 1]",
                    kp.name, kp.score
                )));
            }
        }
        Ok(())
    }
}

/// Size of the frame the keypoints were detected in
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDimensions {
    pub width: u32,
    pub height: u32,
}

impl InputDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pose estimation output for one video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub poses: Vec<Pose>,
    pub timestamp: Timestamp,
    pub input_dimensions: InputDimensions,
}

impl PoseFrame {
    pub fn new(poses: Vec<Pose>, timestamp: Timestamp, input_dimensions: InputDimensions) -> Self {
        Self {
            poses,
            timestamp,
            input_dimensions,
        }
    }

    /// The first pose is the one being coached
    pub fn primary(&self) -> Option<&Pose> {
        self.poses.first()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose() -> Pose {
        Pose::new(
            vec![
                Keypoint::new(KeypointName::LeftHip, 100.0, 200.0, 0.9),
                Keypoint::new(KeypointName::RightHip, 140.0, 210.0, 0.7),
                Keypoint::new(KeypointName::Nose, 120.0, 50.0, 0.1),
            ],
            0.8,
        )
    }

    #[test]
    fn test_keypoint_index_roundtrip() {
        for i in 0..KeypointName::COUNT as u8 {
            let name = KeypointName::from_index(i).unwrap();
            assert_eq!(name as u8, i);
        }
        assert!(KeypointName::from_index(17).is_none());
    }

    #[test]
    fn test_keypoint_wire_names() {
        let json = serde_json::to_string(&KeypointName::LeftKnee).unwrap();
        assert_eq!(json, "\"left_knee\"");
        assert_eq!(KeypointName::RightAnkle.as_str(), "right_ankle");
    }

    #[test]
    fn test_midpoint_falls_back_to_visible_side() {
        let pose = pose();
        let mid = pose.midpoint(KeypointName::LeftHip, KeypointName::RightHip).unwrap();
        assert!((mid.x - 120.0).abs() < 1e-10);
        assert!((mid.y - 205.0).abs() < 1e-10);

        let single = pose
            .midpoint(KeypointName::Nose, KeypointName::LeftEye)
            .unwrap();
        assert!((single.x - 120.0).abs() < 1e-10);
        assert!(pose.midpoint(KeypointName::LeftEye, KeypointName::RightEye).is_none());
    }

    #[test]
    fn test_confident_drops_low_scores() {
        let pose = pose().confident(0.3);
        assert_eq!(pose.keypoints.len(), 2);
        assert!(pose.get(KeypointName::Nose).is_none());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut pose = pose();
        assert!(pose.validate().is_ok());
        pose.keypoints[0].x = f64::NAN;
        assert!(matches!(pose.validate(), Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn test_frame_from_json() {
        let json = r#"{
            "poses": [{"keypoints": [{"name": "left_knee", "x": 1.0, "y": 2.0, "score": 0.5}], "score": 0.5}],
            "timestamp": 33000000,
            "input_dimensions": {"width": 640, "height": 480}
        }"#;
        let frame = PoseFrame::from_json(json).unwrap();
        assert_eq!(frame.primary().unwrap().keypoints[0].name, KeypointName::LeftKnee);
        assert_eq!(frame.timestamp.as_millis(), 33);
    }

    #[test]
    fn test_timestamp_conversions() {
        let t0 = Timestamp::from_millis(1_000);
        let t1 = Timestamp::from_millis(2_500);
        assert!((t1.secs_since(t0) - 1.5).abs() < 1e-12);
        assert_eq!(t1.as_nanos(), 2_500_000_000);
    }

    #[test]
    fn test_secs_since_saturates() {
        let min = Timestamp::from_nanos(i64::MIN);
        let max = Timestamp::from_nanos(i64::MAX);
        assert_eq!(max.secs_since(min), i64::MAX as f64 / 1_000_000_000.0);
        assert_eq!(min.secs_since(max), i64::MIN as f64 / 1_000_000_000.0);
        assert_eq!(max.secs_since(max), 0.0);
    }
}
