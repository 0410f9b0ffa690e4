//! Automatic pixels-per-centimeter estimation from facial anthropometry.
//!
//! When no explicit calibration exists, the scale can be inferred from
//! facial features of known average size: the inter-eye distance first
//! (the smaller feature reads more consistently under head rotation),
//! then the ear-to-ear head width as fallback. A missing or barely
//! visible landmark, or an implausibly small pixel distance, yields
//! `None` rather than a fabricated scale.

use crate::config::EstimatorConfig;
use crate::landmark::{distance_pixels, LandmarkIndex, LandmarkSet};

/// Scale estimator driven by facial reference distances
#[derive(Debug, Clone)]
pub struct ScaleEstimator {
    config: EstimatorConfig,
}

impl ScaleEstimator {
    #[must_use]
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Estimate pixels per centimeter from the inter-eye distance
    #[must_use]
    pub fn estimate_from_eyes(&self, landmarks: &LandmarkSet, width: u32, height: u32) -> Option<f64> {
        self.feature_scale(
            landmarks,
            (LandmarkIndex::LeftEyeInner, LandmarkIndex::RightEyeInner),
            self.config.min_eye_distance_px,
            self.config.avg_eye_distance_cm,
            width,
            height,
        )
    }

    /// Estimate pixels per centimeter from the ear-to-ear head width
    #[must_use]
    pub fn estimate_from_head(&self, landmarks: &LandmarkSet, width: u32, height: u32) -> Option<f64> {
        self.feature_scale(
            landmarks,
            (LandmarkIndex::LeftEar, LandmarkIndex::RightEar),
            self.config.min_head_width_px,
            self.config.avg_head_width_cm,
            width,
            height,
        )
    }

    /// Estimate the scale automatically: eyes first, head width as fallback.
    ///
    /// The order is a fixed reliability tie-break, not configurable.
    #[must_use]
    pub fn estimate_automatic(&self, landmarks: &LandmarkSet, width: u32, height: u32) -> Option<f64> {
        self.estimate_from_eyes(landmarks, width, height)
            .or_else(|| self.estimate_from_head(landmarks, width, height))
    }

    fn feature_scale(
        &self,
        landmarks: &LandmarkSet,
        feature: (LandmarkIndex, LandmarkIndex),
        min_distance_px: f64,
        reference_cm: f64,
        width: u32,
        height: u32,
    ) -> Option<f64> {
        let a = landmarks.get(feature.0)?;
        let b = landmarks.get(feature.1)?;

        if !a.is_visible(self.config.min_visibility) || !b.is_visible(self.config.min_visibility) {
            return None;
        }

        let pixel_distance = distance_pixels(a, b, width, height);
        if pixel_distance > min_distance_px {
            Some(pixel_distance / reference_cm)
        } else {
            None
        }
    }
}
