//! Pose landmark types and the geometry over them.
//!
//! Landmarks arrive from an external pose model as normalized coordinates
//! (x, y in `[0, 1]` relative to the frame, z as unscaled relative depth)
//! with a visibility score. This module holds the index mapping for the
//! 33-point pose topology, the measured body segments, and the Euclidean
//! distance functions everything else builds on.

use serde::{Deserialize, Serialize};

/// Indices of the 33 pose landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    /// Number of landmarks in a full pose
    pub const COUNT: usize = 33;
}

/// A single pose landmark in normalized coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X coordinate (0.0 to 1.0)
    pub x: f64,
    /// Normalized Y coordinate (0.0 to 1.0)
    pub y: f64,
    /// Relative depth, unscaled
    #[serde(default)]
    pub z: f64,
    /// Visibility score (0.0 to 1.0)
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Whether the visibility score meets a threshold
    #[must_use]
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.visibility >= threshold
    }

    /// Convert normalized coordinates to pixel coordinates
    #[must_use]
    pub fn to_pixel(&self, width: u32, height: u32) -> (f64, f64) {
        (self.x * f64::from(width), self.y * f64::from(height))
    }
}

/// The landmarks detected in one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    #[must_use]
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Look up a landmark by index; `None` if the set is truncated
    #[must_use]
    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks.get(index as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self::new(landmarks)
    }
}

/// A named pair of landmarks whose separation is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodySegment {
    /// Segment name as it appears in measurement output
    pub name: &'static str,
    pub left: LandmarkIndex,
    pub right: LandmarkIndex,
}

/// Shoulder width span
pub const SHOULDERS: BodySegment = BodySegment {
    name: "shoulders",
    left: LandmarkIndex::LeftShoulder,
    right: LandmarkIndex::RightShoulder,
};

/// Waist span, measured between the hips
pub const WAIST: BodySegment = BodySegment {
    name: "waist",
    left: LandmarkIndex::LeftHip,
    right: LandmarkIndex::RightHip,
};

/// The segments the pipeline measures each frame
pub const MEASURED_SEGMENTS: [BodySegment; 2] = [SHOULDERS, WAIST];

/// 3D Euclidean distance between two landmarks in normalized space.
///
/// No unit conversion is applied; z stays in the model's relative scale.
#[must_use]
pub fn distance_3d(a: &Landmark, b: &Landmark) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// 2D pixel distance between two landmarks, scaled by the frame dimensions.
///
/// Callers must guard against zero frame dimensions; with `width` or
/// `height` of 0 the result collapses along that axis.
#[must_use]
pub fn distance_pixels(a: &Landmark, b: &Landmark, width: u32, height: u32) -> f64 {
    let (x1, y1) = a.to_pixel(width, height);
    let (x2, y2) = b.to_pixel(width, height);
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_3d_symmetry() {
        let a = Landmark::new(0.1, 0.2, 0.3, 1.0);
        let b = Landmark::new(0.7, 0.5, -0.1, 1.0);

        assert_eq!(distance_3d(&a, &b), distance_3d(&b, &a));
    }

    #[test]
    fn test_distance_3d_zero_for_equal_points() {
        let a = Landmark::new(0.4, 0.4, 0.2, 1.0);

        assert_eq!(distance_3d(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_3d_known_value() {
        let a = Landmark::new(0.0, 0.0, 0.0, 1.0);
        let b = Landmark::new(0.3, 0.4, 0.0, 1.0);

        assert!((distance_3d(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_distance_pixels_scales_with_frame() {
        let a = Landmark::new(0.25, 0.5, 0.0, 1.0);
        let b = Landmark::new(0.75, 0.5, 0.0, 1.0);

        let d1 = distance_pixels(&a, &b, 640, 480);
        let d2 = distance_pixels(&a, &b, 1280, 480);

        // Pure horizontal span: doubling the width doubles the distance
        assert!((d1 - 320.0).abs() < 1e-9);
        assert!((d2 - 640.0).abs() < 1e-9);
    }

    #[test]
    fn test_landmark_set_lookup() {
        let mut landmarks = vec![Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftShoulder as usize] = Landmark::new(0.3, 0.4, 0.0, 0.9);
        let set = LandmarkSet::new(landmarks);

        let shoulder = set.get(LandmarkIndex::LeftShoulder).unwrap();
        assert_eq!(shoulder.x, 0.3);

        let truncated = LandmarkSet::new(vec![Landmark::default(); 5]);
        assert!(truncated.get(LandmarkIndex::LeftHip).is_none());
    }

    #[test]
    fn test_visibility_threshold() {
        let lm = Landmark::new(0.5, 0.5, 0.0, 0.49);
        assert!(!lm.is_visible(0.5));
        assert!(lm.is_visible(0.4));
    }
}
