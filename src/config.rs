//! Configuration management for the measurement pipeline

use crate::constants::{
    AVG_EYE_DISTANCE_CM, AVG_HEAD_WIDTH_CM, DEFAULT_CALIBRATION_FILE, MIN_ESTIMATION_VISIBILITY, MIN_EYE_DISTANCE_PX,
    MIN_HEAD_WIDTH_PX, PRESET_PIXEL_SPAN, PRESET_SPAN_CM, REFERENCE_HEIGHT, REFERENCE_WIDTH,
    RESOLUTION_CORRECTION_FACTOR,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Calibration preset and persistence
    pub calibration: CalibrationConfig,

    /// Resolution normalization
    pub resolution: ResolutionConfig,

    /// Automatic scale estimation
    pub estimator: EstimatorConfig,
}

/// Preset calibration and storage location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Pixel span of the preset reference subject
    pub preset_pixel_span: f64,

    /// Physical span of the preset reference subject in centimeters
    pub preset_span_cm: f64,

    /// Path of the persisted calibration record
    pub file: PathBuf,
}

impl CalibrationConfig {
    /// The built-in preset scale in pixels per centimeter
    #[must_use]
    pub fn preset_pixels_per_cm(&self) -> f64 {
        self.preset_pixel_span / self.preset_span_cm
    }
}

/// Resolution normalization parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Reference capture width the preset scale was measured at
    pub reference_width: u32,

    /// Reference capture height the preset scale was measured at
    pub reference_height: u32,

    /// Empirical correction applied to the raw average resolution scale.
    /// A tuning constant, not derived from optics.
    pub correction_factor: f64,
}

/// Automatic scale estimation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Minimum landmark visibility for a feature to be used
    pub min_visibility: f64,

    /// Minimum plausible inter-eye pixel distance
    pub min_eye_distance_px: f64,

    /// Minimum plausible inter-ear pixel distance
    pub min_head_width_px: f64,

    /// Average adult inter-eye distance in centimeters
    pub avg_eye_distance_cm: f64,

    /// Average adult head width in centimeters
    pub avg_head_width_cm: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            resolution: ResolutionConfig::default(),
            estimator: EstimatorConfig::default(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            preset_pixel_span: PRESET_PIXEL_SPAN,
            preset_span_cm: PRESET_SPAN_CM,
            file: PathBuf::from(DEFAULT_CALIBRATION_FILE),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            reference_width: REFERENCE_WIDTH,
            reference_height: REFERENCE_HEIGHT,
            correction_factor: RESOLUTION_CORRECTION_FACTOR,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_visibility: MIN_ESTIMATION_VISIBILITY,
            min_eye_distance_px: MIN_EYE_DISTANCE_PX,
            min_head_width_px: MIN_HEAD_WIDTH_PX,
            avg_eye_distance_cm: AVG_EYE_DISTANCE_CM,
            avg_head_width_cm: AVG_HEAD_WIDTH_CM,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a [`Error::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.calibration.preset_pixel_span <= 0.0 || !self.calibration.preset_pixel_span.is_finite() {
            return Err(Error::Config("Preset pixel span must be positive".to_string()));
        }
        if self.calibration.preset_span_cm <= 0.0 || !self.calibration.preset_span_cm.is_finite() {
            return Err(Error::Config("Preset span (cm) must be positive".to_string()));
        }

        if self.resolution.reference_width == 0 || self.resolution.reference_height == 0 {
            return Err(Error::Config("Reference resolution must be non-zero".to_string()));
        }
        if self.resolution.correction_factor <= 0.0 || !self.resolution.correction_factor.is_finite() {
            return Err(Error::Config("Correction factor must be positive and finite".to_string()));
        }

        if !(0.0..=1.0).contains(&self.estimator.min_visibility) {
            return Err(Error::Config("Minimum visibility must be between 0.0 and 1.0".to_string()));
        }
        if self.estimator.min_eye_distance_px < 0.0 || self.estimator.min_head_width_px < 0.0 {
            return Err(Error::Config("Estimator pixel thresholds must be non-negative".to_string()));
        }
        if self.estimator.avg_eye_distance_cm <= 0.0 || self.estimator.avg_head_width_cm <= 0.0 {
            return Err(Error::Config(
                "Anthropometric reference distances must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
