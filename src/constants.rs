//! Constants used throughout the library

/// Preset calibration: pixel span of the reference subject
pub const PRESET_PIXEL_SPAN: f64 = 650.0;

/// Preset calibration: physical span of the reference subject in centimeters
pub const PRESET_SPAN_CM: f64 = 96.0;

/// Built-in preset scale (650 px = 96 cm at the reference resolution)
pub const PRESET_PIXELS_PER_CM: f64 = PRESET_PIXEL_SPAN / PRESET_SPAN_CM;

/// Reference capture width the preset scale was measured at
pub const REFERENCE_WIDTH: u32 = 640;

/// Reference capture height the preset scale was measured at
pub const REFERENCE_HEIGHT: u32 = 480;

/// Empirical correction applied to the raw resolution scale estimate.
/// A tuning constant, not derived from optics; overridable in config.
pub const RESOLUTION_CORRECTION_FACTOR: f64 = 1.0 / 1.13;

/// Average adult inter-eye distance in centimeters
pub const AVG_EYE_DISTANCE_CM: f64 = 6.3;

/// Average adult head width (ear to ear) in centimeters
pub const AVG_HEAD_WIDTH_CM: f64 = 15.0;

/// Average adult shoulder width in centimeters, kept as a sanity reference
pub const AVG_SHOULDER_WIDTH_CM: f64 = 45.0;

/// Minimum plausible inter-eye pixel distance for automatic estimation
pub const MIN_EYE_DISTANCE_PX: f64 = 10.0;

/// Minimum plausible inter-ear pixel distance for automatic estimation
pub const MIN_HEAD_WIDTH_PX: f64 = 20.0;

/// Minimum landmark visibility accepted by the automatic scale estimator
pub const MIN_ESTIMATION_VISIBILITY: f64 = 0.5;

/// Factor for the rough normalized-depth to centimeter estimate
pub const DEPTH_SCALE_FACTOR: f64 = 100.0;

/// Default path of the persisted calibration record
pub const DEFAULT_CALIBRATION_FILE: &str = "calibration.json";
