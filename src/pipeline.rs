//! Per-frame measurement orchestration.
//!
//! Given a frame's landmarks and dimensions, computes pixel and 3D
//! distances for each measured body segment, resolves the effective
//! scale (resolution normalization, then calibration, then automatic
//! estimation), and emits a [`MeasurementResult`]. A frame without a
//! detected pose is a valid outcome, not an error: it yields zero
//! distances and confidence 0.

use crate::calibration::{CalibrationEngine, CalibrationSource, SharedStore};
use crate::config::Config;
use crate::constants::DEPTH_SCALE_FACTOR;
use crate::landmark::{distance_3d, distance_pixels, BodySegment, LandmarkSet, MEASURED_SEGMENTS};
use crate::resolution::ResolutionNormalizer;
use crate::scale::ScaleEstimator;
use serde::Serialize;

/// Depth diagnostics for one segment, from the landmarks' z coordinates
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DepthDiagnostics {
    /// Relative depth of the left landmark
    pub left_z: f64,
    /// Relative depth of the right landmark
    pub right_z: f64,
    /// Absolute left/right depth difference; a posture asymmetry signal
    pub z_difference: f64,
    /// Mean of the two depths
    pub average_depth: f64,
    /// Rough centimeter estimate of the average depth, derived with the
    /// same linear pixel scale. An approximation, not calibrated depth.
    pub depth_cm: Option<f64>,
}

impl DepthDiagnostics {
    fn zero() -> Self {
        Self {
            left_z: 0.0,
            right_z: 0.0,
            z_difference: 0.0,
            average_depth: 0.0,
            depth_cm: None,
        }
    }
}

/// Measurement of one body segment for one frame
#[derive(Debug, Clone, Serialize)]
pub struct SegmentMeasurement {
    /// Segment name ("shoulders", "waist")
    pub segment: &'static str,
    /// Euclidean distance in normalized 3D landmark space
    pub distance_3d: f64,
    /// Euclidean distance in frame pixels
    pub pixel_distance: f64,
    /// Distance in centimeters; `None` when no scale could be resolved
    pub distance_cm: Option<f64>,
    /// Depth diagnostics for the segment's landmark pair
    pub depth: DepthDiagnostics,
}

/// Per-frame measurement output
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementResult {
    /// Source frame width in pixels
    pub width: u32,
    /// Source frame height in pixels
    pub height: u32,
    /// Whether a pose was detected this frame
    pub pose_detected: bool,
    /// One entry per measured segment
    pub segments: Vec<SegmentMeasurement>,
    /// Mean visibility of the measured landmarks (0.0 to 1.0)
    pub confidence: f64,
    /// Provenance of the scale in effect this frame
    pub scale_source: CalibrationSource,
    /// Human-readable provenance of the scale in effect
    pub scale_info: String,
}

impl MeasurementResult {
    /// Look up a segment measurement by name
    #[must_use]
    pub fn segment(&self, name: &str) -> Option<&SegmentMeasurement> {
        self.segments.iter().find(|s| s.segment == name)
    }
}

/// Sequential per-frame measurement pipeline.
///
/// One pipeline serves one logical stream; concurrent streams need their
/// own instance (resolution memoization is per-stream state). The
/// calibration store behind the engine may be shared.
#[derive(Debug)]
pub struct MeasurementPipeline {
    engine: CalibrationEngine,
    normalizer: ResolutionNormalizer,
    estimator: ScaleEstimator,
}

impl MeasurementPipeline {
    #[must_use]
    pub fn new(config: &Config, store: SharedStore) -> Self {
        let preset_ratio = config.calibration.preset_pixels_per_cm();
        Self {
            engine: CalibrationEngine::new(store, preset_ratio),
            normalizer: ResolutionNormalizer::new(&config.resolution, preset_ratio),
            estimator: ScaleEstimator::new(config.estimator.clone()),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &CalibrationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CalibrationEngine {
        &mut self.engine
    }

    #[must_use]
    pub fn normalizer(&self) -> &ResolutionNormalizer {
        &self.normalizer
    }

    pub fn normalizer_mut(&mut self) -> &mut ResolutionNormalizer {
        &mut self.normalizer
    }

    /// Process one frame's landmarks into measurements.
    ///
    /// `landmarks` is `None` when no pose was detected; the result then
    /// carries zero distances and confidence 0. Calibration state is never
    /// mutated here except through the normalizer's resolution update.
    pub fn process_frame(&mut self, landmarks: Option<&LandmarkSet>, width: u32, height: u32) -> MeasurementResult {
        if width == 0 || height == 0 {
            log::warn!("Frame with zero dimension {width}x{height}, skipping measurement");
            return self.empty_result(width, height);
        }

        // The effective scale tracks the frame resolution even on frames
        // without a detected pose
        self.normalizer.update(width, height, &mut self.engine);

        let Some(set) = landmarks else {
            return self.empty_result(width, height);
        };

        // All measured landmarks must be present; a truncated set counts
        // as no detection
        let complete = MEASURED_SEGMENTS
            .iter()
            .all(|s| set.get(s.left).is_some() && set.get(s.right).is_some());
        if !complete {
            return self.empty_result(width, height);
        }

        let auto_scale = self.estimator.estimate_automatic(set, width, height);
        let effective_scale = self.engine.effective_scale(auto_scale);

        let segments = MEASURED_SEGMENTS
            .iter()
            .map(|segment| self.measure_segment(segment, set, width, height, auto_scale, effective_scale))
            .collect();

        let confidence = Self::mean_visibility(set);

        MeasurementResult {
            width,
            height,
            pose_detected: true,
            segments,
            confidence,
            scale_source: self.engine.frame_source(auto_scale),
            scale_info: self.engine.describe(auto_scale),
        }
    }

    fn measure_segment(
        &self,
        segment: &BodySegment,
        set: &LandmarkSet,
        width: u32,
        height: u32,
        auto_scale: Option<f64>,
        effective_scale: Option<f64>,
    ) -> SegmentMeasurement {
        // Presence was checked up front
        let left = set.get(segment.left).copied().unwrap_or_default();
        let right = set.get(segment.right).copied().unwrap_or_default();

        let pixel_distance = distance_pixels(&left, &right, width, height);
        let average_depth = (left.z + right.z) / 2.0;

        SegmentMeasurement {
            segment: segment.name,
            distance_3d: distance_3d(&left, &right),
            pixel_distance,
            distance_cm: self.engine.pixels_to_cm(pixel_distance, auto_scale),
            depth: DepthDiagnostics {
                left_z: left.z,
                right_z: right.z,
                z_difference: (left.z - right.z).abs(),
                average_depth,
                depth_cm: effective_scale.map(|scale| average_depth.abs() * scale * DEPTH_SCALE_FACTOR),
            },
        }
    }

    fn mean_visibility(set: &LandmarkSet) -> f64 {
        let visibilities: Vec<f64> = MEASURED_SEGMENTS
            .iter()
            .flat_map(|s| [s.left, s.right])
            .filter_map(|index| set.get(index).map(|lm| lm.visibility))
            .collect();

        if visibilities.is_empty() {
            0.0
        } else {
            visibilities.iter().sum::<f64>() / visibilities.len() as f64
        }
    }

    fn empty_result(&self, width: u32, height: u32) -> MeasurementResult {
        let segments = MEASURED_SEGMENTS
            .iter()
            .map(|segment| SegmentMeasurement {
                segment: segment.name,
                distance_3d: 0.0,
                pixel_distance: 0.0,
                distance_cm: None,
                depth: DepthDiagnostics::zero(),
            })
            .collect();

        MeasurementResult {
            width,
            height,
            pose_detected: false,
            segments,
            confidence: 0.0,
            scale_source: self.engine.frame_source(None),
            scale_info: self.engine.describe(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::shared_store;
    use crate::landmark::{Landmark, LandmarkIndex};
    use crate::store::CalibrationStore;

    fn pipeline(dir: &tempfile::TempDir) -> MeasurementPipeline {
        let store = shared_store(CalibrationStore::new(dir.path().join("calibration.json")));
        MeasurementPipeline::new(&Config::default(), store)
    }

    /// A synthetic standing pose with known shoulder and hip spans
    fn synthetic_pose() -> LandmarkSet {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0, 0.9); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftShoulder as usize] = Landmark::new(0.3, 0.3, 0.05, 0.9);
        landmarks[LandmarkIndex::RightShoulder as usize] = Landmark::new(0.7, 0.3, -0.05, 0.8);
        landmarks[LandmarkIndex::LeftHip as usize] = Landmark::new(0.35, 0.6, 0.03, 0.7);
        landmarks[LandmarkIndex::RightHip as usize] = Landmark::new(0.65, 0.6, 0.01, 0.6);
        LandmarkSet::new(landmarks)
    }

    #[test]
    fn test_missing_pose_yields_zero_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pipeline(&dir);

        let result = p.process_frame(None, 640, 480);

        assert!(!result.pose_detected);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.segments.len(), 2);
        for segment in &result.segments {
            assert_eq!(segment.pixel_distance, 0.0);
            assert_eq!(segment.distance_3d, 0.0);
            assert!(segment.distance_cm.is_none());
        }
    }

    #[test]
    fn test_truncated_set_counts_as_no_detection() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pipeline(&dir);

        let set = LandmarkSet::new(vec![Landmark::default(); 12]);
        let result = p.process_frame(Some(&set), 640, 480);

        assert!(!result.pose_detected);
    }

    #[test]
    fn test_measures_configured_segments() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pipeline(&dir);

        let result = p.process_frame(Some(&synthetic_pose()), 640, 480);

        assert!(result.pose_detected);
        let shoulders = result.segment("shoulders").unwrap();
        // 0.4 of a 640 px frame: 256 px
        assert!((shoulders.pixel_distance - 256.0).abs() < 1e-9);
        assert!(shoulders.distance_cm.is_some());

        let waist = result.segment("waist").unwrap();
        assert!((waist.pixel_distance - 192.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_is_mean_of_measured_landmarks() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pipeline(&dir);

        let result = p.process_frame(Some(&synthetic_pose()), 640, 480);

        // (0.9 + 0.8 + 0.7 + 0.6) / 4
        assert!((result.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_depth_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pipeline(&dir);

        let result = p.process_frame(Some(&synthetic_pose()), 640, 480);
        let shoulders = result.segment("shoulders").unwrap();

        assert!((shoulders.depth.z_difference - 0.1).abs() < 1e-9);
        assert!((shoulders.depth.average_depth - 0.0).abs() < 1e-9);

        let scale = p.engine().scale().unwrap();
        let waist = result.segment("waist").unwrap();
        // |0.02| * scale * 100
        let expected = 0.02 * scale * 100.0;
        assert!((waist.depth.depth_cm.unwrap() - expected).abs() < 1e-9);
        assert!((waist.depth.z_difference - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_zero_dimension_frame_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pipeline(&dir);

        let result = p.process_frame(Some(&synthetic_pose()), 0, 480);
        assert!(!result.pose_detected);
        assert_eq!(result.segments[0].pixel_distance, 0.0);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pipeline(&dir);

        let result = p.process_frame(Some(&synthetic_pose()), 640, 480);
        let json = serde_json::to_string(&result).unwrap();

        assert!(json.contains("\"segment\":\"shoulders\""));
        assert!(json.contains("\"scale_info\""));
    }
}
