//! Calibration engine resolving the effective pixels-per-centimeter scale.
//!
//! The engine owns the active scale and its provenance. Resolution order
//! for converting pixels to centimeters: an explicitly set scale (preset,
//! manual, or resolution-adjusted) wins; otherwise a per-frame automatic
//! estimate is used; otherwise the conversion is unavailable. There is no
//! fabricated default in the unavailable case.

use crate::store::CalibrationStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How the active scale was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationSource {
    /// No calibration active
    None,
    /// Built-in preset ratio, possibly resolution-adjusted
    Preset,
    /// Manual reference-object calibration or explicit scale override
    Manual,
    /// Transient per-frame facial-feature estimate
    Automatic,
}

/// A point in frame pixel coordinates, as supplied by an operator
/// marking a reference object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: &PixelPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Calibration store shared between sessions; writes are serialized by
/// the mutex, and the write-then-rename in the store keeps records whole
pub type SharedStore = Arc<Mutex<CalibrationStore>>;

/// Wrap a store for sharing across sessions
#[must_use]
pub fn shared_store(store: CalibrationStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Per-session calibration state machine
#[derive(Debug)]
pub struct CalibrationEngine {
    scale: Option<f64>,
    source: CalibrationSource,
    preset_ratio: f64,
    store: SharedStore,
}

impl CalibrationEngine {
    /// Create an engine, initializing from the persisted record.
    ///
    /// A saved record boots the engine in `Manual` provenance; with no
    /// usable record it falls back to the built-in preset ratio.
    #[must_use]
    pub fn new(store: SharedStore, preset_ratio: f64) -> Self {
        let loaded = store.lock().unwrap_or_else(PoisonError::into_inner).load();

        let (scale, source) = match loaded {
            Some(value) => {
                log::info!("Loaded saved calibration: {value:.2} px/cm");
                (Some(value), CalibrationSource::Manual)
            }
            None => {
                log::info!("No saved calibration, using preset: {preset_ratio:.2} px/cm");
                (Some(preset_ratio), CalibrationSource::Preset)
            }
        };

        Self {
            scale,
            source,
            preset_ratio,
            store,
        }
    }

    /// The active scale in pixels per centimeter, if any
    #[must_use]
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// Provenance of the active scale
    #[must_use]
    pub fn source(&self) -> CalibrationSource {
        self.source
    }

    /// The built-in preset ratio
    #[must_use]
    pub fn preset_ratio(&self) -> f64 {
        self.preset_ratio
    }

    /// Select the built-in preset ratio and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails; the preset is still applied
    /// in memory.
    pub fn use_preset(&mut self) -> Result<f64> {
        self.apply(self.preset_ratio, CalibrationSource::Preset)
    }

    /// Override the scale with an explicit pixels-per-centimeter value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCalibration`] for a non-positive or
    /// non-finite value (prior state is retained), or a persistence error
    /// after the value has been applied in memory.
    pub fn set_scale(&mut self, pixels_per_cm: f64) -> Result<f64> {
        if pixels_per_cm <= 0.0 || !pixels_per_cm.is_finite() {
            return Err(Error::InvalidCalibration(format!(
                "scale must be positive and finite, got {pixels_per_cm}"
            )));
        }
        self.apply(pixels_per_cm, CalibrationSource::Manual)
    }

    /// Calibrate from two reference points of known physical separation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCalibration`] unless exactly two distinct
    /// points and a positive reference length are supplied; prior state is
    /// retained on rejection. A persistence error is returned after the
    /// new scale has been applied in memory.
    pub fn calibrate_manual(&mut self, points: &[PixelPoint], reference_cm: f64) -> Result<f64> {
        if points.len() != 2 {
            return Err(Error::InvalidCalibration(format!(
                "expected exactly 2 reference points, got {}",
                points.len()
            )));
        }
        if reference_cm <= 0.0 || !reference_cm.is_finite() {
            return Err(Error::InvalidCalibration(format!(
                "reference length must be positive, got {reference_cm} cm"
            )));
        }

        let pixel_distance = points[0].distance_to(&points[1]);
        let pixels_per_cm = pixel_distance / reference_cm;
        if pixels_per_cm <= 0.0 || !pixels_per_cm.is_finite() {
            return Err(Error::InvalidCalibration(
                "reference points coincide; cannot derive a scale".to_string(),
            ));
        }

        log::info!("Manual calibration: {pixel_distance:.1} px = {reference_cm} cm -> {pixels_per_cm:.2} px/cm");
        self.apply(pixels_per_cm, CalibrationSource::Manual)
    }

    /// Scale the current effective value by a factor, for manual
    /// fine-tuning. Falls back to the preset ratio as base when no scale
    /// is active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCalibration`] for a non-positive or
    /// non-finite factor (prior state is retained), or a persistence error
    /// after the adjusted value has been applied in memory.
    pub fn set_multiplier(&mut self, factor: f64) -> Result<f64> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(Error::InvalidCalibration(format!(
                "multiplier must be positive and finite, got {factor}"
            )));
        }

        let base = self.scale.unwrap_or(self.preset_ratio);
        let source = if self.scale.is_some() {
            self.source
        } else {
            CalibrationSource::Preset
        };
        self.apply(base * factor, source)
    }

    /// Apply a resolution-adjusted scale computed by the normalizer.
    ///
    /// Overrides the in-memory scale for the current resolution without
    /// touching the persisted record.
    pub(crate) fn apply_dynamic(&mut self, pixels_per_cm: f64) {
        self.scale = Some(pixels_per_cm);
        self.source = CalibrationSource::Preset;
    }

    /// Clear the active scale and the persisted record.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the record exists but cannot be removed;
    /// the in-memory state is cleared regardless.
    pub fn reset(&mut self) -> Result<()> {
        self.scale = None;
        self.source = CalibrationSource::None;
        self.lock_store().clear()
    }

    /// Convert a pixel distance to centimeters.
    ///
    /// Uses the active scale if set, else the supplied per-frame automatic
    /// estimate, else reports unavailable with `None`.
    #[must_use]
    pub fn pixels_to_cm(&self, pixel_distance: f64, auto_scale: Option<f64>) -> Option<f64> {
        if let Some(scale) = self.scale {
            return Some(pixel_distance / scale);
        }
        match auto_scale {
            Some(scale) if scale > 0.0 => Some(pixel_distance / scale),
            _ => None,
        }
    }

    /// The scale that would convert pixels this frame: the active scale,
    /// or the automatic estimate when none is set
    #[must_use]
    pub fn effective_scale(&self, auto_scale: Option<f64>) -> Option<f64> {
        self.scale.or_else(|| auto_scale.filter(|s| *s > 0.0))
    }

    /// Provenance of the scale that would convert pixels this frame
    #[must_use]
    pub fn frame_source(&self, auto_scale: Option<f64>) -> CalibrationSource {
        if self.scale.is_some() {
            self.source
        } else if auto_scale.is_some_and(|s| s > 0.0) {
            CalibrationSource::Automatic
        } else {
            CalibrationSource::None
        }
    }

    /// Human-readable description of the scale in effect this frame
    #[must_use]
    pub fn describe(&self, auto_scale: Option<f64>) -> String {
        match (self.scale, self.source) {
            (Some(scale), CalibrationSource::Preset) => {
                format!("Preset calibration: {scale:.2} px/cm")
            }
            (Some(scale), _) => format!("Manual calibration: {scale:.2} px/cm"),
            (None, _) => match auto_scale {
                Some(scale) => format!("Auto scale (face): {scale:.1} px/cm"),
                None => "No scale available".to_string(),
            },
        }
    }

    fn apply(&mut self, pixels_per_cm: f64, source: CalibrationSource) -> Result<f64> {
        self.scale = Some(pixels_per_cm);
        self.source = source;
        self.lock_store().save(pixels_per_cm)?;
        Ok(pixels_per_cm)
    }

    fn lock_store(&self) -> MutexGuard<'_, CalibrationStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
