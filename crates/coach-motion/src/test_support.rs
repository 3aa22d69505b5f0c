//! Pose fixtures shared by unit tests.

use coach_core::{InputDimensions, Keypoint, KeypointName, Pose, PoseFrame, Timestamp};

/// Builder over a front-facing standing body in a 640x480 frame
#[derive(Debug, Clone)]
pub struct PoseBuilder {
    keypoints: Vec<Keypoint>,
}

impl PoseBuilder {
    pub fn standing() -> Self {
        use KeypointName::*;
        let layout = [
            (Nose, 320.0, 80.0),
            (LeftEye, 310.0, 70.0),
            (RightEye, 330.0, 70.0),
            (LeftEar, 300.0, 75.0),
            (RightEar, 340.0, 75.0),
            (LeftShoulder, 290.0, 150.0),
            (RightShoulder, 350.0, 150.0),
            (LeftElbow, 280.0, 220.0),
            (RightElbow, 360.0, 220.0),
            (LeftWrist, 275.0, 290.0),
            (RightWrist, 365.0, 290.0),
            (LeftHip, 300.0, 300.0),
            (RightHip, 340.0, 300.0),
            (LeftKnee, 300.0, 400.0),
            (RightKnee, 340.0, 400.0),
            (LeftAnkle, 300.0, 500.0),
            (RightAnkle, 340.0, 500.0),
        ];
        Self {
            keypoints: layout
                .iter()
                .map(|&(name, x, y)| Keypoint::new(name, x, y, 0.9))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            keypoints: Vec::new(),
        }
    }

    pub fn set(mut self, name: KeypointName, x: f64, y: f64) -> Self {
        let score = self.remove(name).map(|kp| kp.score).unwrap_or(0.9);
        self.keypoints.push(Keypoint::new(name, x, y, score));
        self
    }

    pub fn set_y(self, name: KeypointName, y: f64) -> Self {
        let x = self.keypoints.iter().find(|kp| kp.name == name).map(|kp| kp.x).unwrap_or(0.0);
        self.set(name, x, y)
    }

    pub fn score(mut self, name: KeypointName, score: f64) -> Self {
        if let Some(kp) = self.keypoints.iter_mut().find(|kp| kp.name == name) {
            kp.score = score;
        }
        self
    }

    pub fn all_scores(mut self, score: f64) -> Self {
        for kp in &mut self.keypoints {
            kp.score = score;
        }
        self
    }

    pub fn without(mut self, name: KeypointName) -> Self {
        self.remove(name);
        self
    }

    /// Place the knees `signal` px below the hips
    pub fn squat_signal(self, signal: f64) -> Self {
        self.set_y(KeypointName::LeftHip, 300.0)
            .set_y(KeypointName::RightHip, 300.0)
            .set_y(KeypointName::LeftKnee, 300.0 + signal)
            .set_y(KeypointName::RightKnee, 300.0 + signal)
    }

    /// Place the elbows `signal` px below the shoulders
    pub fn pushup_signal(self, signal: f64) -> Self {
        self.set_y(KeypointName::LeftShoulder, 150.0)
            .set_y(KeypointName::RightShoulder, 150.0)
            .set_y(KeypointName::LeftElbow, 150.0 + signal)
            .set_y(KeypointName::RightElbow, 150.0 + signal)
    }

    pub fn build(self) -> Pose {
        Pose::new(self.keypoints, 0.9)
    }

    pub fn frame_at(self, millis: i64) -> PoseFrame {
        frame(self.build(), millis)
    }

    fn remove(&mut self, name: KeypointName) -> Option<Keypoint> {
        let idx = self.keypoints.iter().position(|kp| kp.name == name)?;
        Some(self.keypoints.remove(idx))
    }
}

pub fn frame(pose: Pose, millis: i64) -> PoseFrame {
    PoseFrame::new(vec![pose], Timestamp::from_millis(millis), InputDimensions::new(640, 480))
}

/// Side-view plank: shoulder, hip and ankle on one horizontal line at `y = 300`
pub fn plank(hip_y: f64) -> Pose {
    use KeypointName::*;
    PoseBuilder::empty()
        .set(LeftShoulder, 100.0, 300.0)
        .set(LeftElbow, 100.0, 350.0)
        .set(LeftWrist, 120.0, 400.0)
        .set(LeftHip, 300.0, hip_y)
        .set(LeftKnee, 400.0, 300.0)
        .set(LeftAnkle, 500.0, 300.0)
        .build()
}

/// Side-view runner; `lean_px` shifts the head forward of the hips
pub fn runner(left_ankle_y: f64, right_ankle_y: f64, lean_px: f64) -> Pose {
    use KeypointName::*;
    PoseBuilder::empty()
        .set(Nose, 320.0 + lean_px, 100.0)
        .set(LeftShoulder, 318.0, 160.0)
        .set(RightShoulder, 322.0, 160.0)
        .set(LeftHip, 318.0, 300.0)
        .set(RightHip, 322.0, 300.0)
        .set(LeftKnee, 330.0, 390.0)
        .set(RightKnee, 310.0, 390.0)
        .set(LeftAnkle, 325.0, left_ankle_y)
        .set(RightAnkle, 315.0, right_ankle_y)
        .build()
}
