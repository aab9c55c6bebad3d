use serde::{Deserialize, Serialize};

/// Upper eyelid of the left eye
pub const LEFT_EYE: usize = 159;
/// Upper eyelid of the right eye
pub const RIGHT_EYE: usize = 386;
/// Nose tip
pub const NOSE_TIP: usize = 1;
/// Outer corner of the left eye, used as the left face edge
pub const LEFT_FACE_EDGE: usize = 33;
/// Outer corner of the right eye, used as the right face edge
pub const RIGHT_FACE_EDGE: usize = 263;

/// A single facial landmark in the detector's normalized image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Ordered landmark points for one detected face
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    #[must_use]
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Output of one detector call: zero or more faces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub faces: Vec<LandmarkSet>,
}

impl DetectionResult {
    #[must_use]
    pub fn no_face() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn single(face: LandmarkSet) -> Self {
        Self { faces: vec![face] }
    }

    #[must_use]
    pub fn first_face(&self) -> Option<&LandmarkSet> {
        self.faces.first()
    }
}

/// Builds sparse landmark sets by index, leaving unset slots at the origin.
///
/// Replay files and tests only care about the handful of points the
/// classifier reads, so the builder pads everything else.
#[derive(Debug, Default)]
pub struct LandmarkSetBuilder {
    points: Vec<Landmark>,
}

impl LandmarkSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, index: usize, point: Landmark) -> Self {
        if self.points.len() <= index {
            self.points.resize(index + 1, Landmark::default());
        }
        self.points[index] = point;
        self
    }

    #[must_use]
    pub fn build(self) -> LandmarkSet {
        LandmarkSet::new(self.points)
    }
}
