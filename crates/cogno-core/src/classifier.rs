use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::MonitorConfig;
use crate::landmarks::{
    DetectionResult, Landmark, LandmarkSet, LEFT_EYE, LEFT_FACE_EDGE, NOSE_TIP, RIGHT_EYE,
    RIGHT_FACE_EDGE,
};


/// Why a frame was classified as distracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistractionReason {
    NoFace,
    MissingEyeLandmarks,
    LookingDown,
    HeadTurned,
}

impl DistractionReason {
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NoFace => "No face detected",
            Self::MissingEyeLandmarks => "Missing eye landmarks",
            Self::LookingDown => "Looking down",
            Self::HeadTurned => "Head turned",
        }
    }
}

impl fmt::Display for DistractionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Current attention classification of the monitored user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusState {
    /// No detection result yet
    Initializing,
    Focused,
    Distracted(DistractionReason),
}

impl FocusState {
    #[must_use]
    pub const fn is_distracted(&self) -> bool {
        matches!(self, Self::Distracted(_))
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing...",
            Self::Focused => "Focused",
            Self::Distracted(reason) => reason.description(),
        }
    }
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Fixed geometric rules over a face's landmarks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusClassifier {
    look_down_margin: f32,
    head_turn_ratio: f32,
}

impl Default for FocusClassifier {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

impl FocusClassifier {
    #[must_use]
    pub const fn new(look_down_margin: f32, head_turn_ratio: f32) -> Self {
        Self {
            look_down_margin,
            head_turn_ratio,
        }
    }

    #[must_use]
    pub const fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.look_down_margin, config.head_turn_ratio)
    }

    /// Classify one detection result. Only the first face is considered.
    ///
    /// Looking down wins over head turned when both hold. Face-edge indices
    /// are lower than the right-eye index, so a set holding both eyes always
    /// holds both edges.
    #[must_use]
    pub fn classify(&self, result: &DetectionResult) -> FocusState {
        let Some(face) = result.first_face() else {
            return FocusState::Distracted(DistractionReason::NoFace);
        };

        let (Some(left_eye), Some(right_eye), Some(nose)) =
            (face.get(LEFT_EYE), face.get(RIGHT_EYE), face.get(NOSE_TIP))
        else {
            return FocusState::Distracted(DistractionReason::MissingEyeLandmarks);
        };

        let looking_down = left_eye.y > nose.y + self.look_down_margin
            && right_eye.y > nose.y + self.look_down_margin;
        if looking_down {
            return FocusState::Distracted(DistractionReason::LookingDown);
        }

        if self.is_head_turned(face, nose) {
            return FocusState::Distracted(DistractionReason::HeadTurned);
        }

        FocusState::Focused
    }

    fn is_head_turned(&self, face: &LandmarkSet, nose: Landmark) -> bool {
        let (Some(left), Some(right)) = (face.get(LEFT_FACE_EDGE), face.get(RIGHT_FACE_EDGE))
        else {
            return false;
        };

        let face_width = (right.x - left.x).abs();
        let face_center = (right.x + left.x) / 2.0;
        (face_center - nose.x).abs() > face_width * self.head_turn_ratio
    }
}
