//! Per-stream measurement session.
//!
//! Each capture stream (a webcam loop, a websocket client) gets its own
//! session: the resolution memoization and calibration state inside must
//! not be shared between streams with different resolutions. What may be
//! shared is the durable calibration store, behind [`SharedStore`].

use crate::calibration::{shared_store, CalibrationSource, PixelPoint, SharedStore};
use crate::config::Config;
use crate::landmark::{Landmark, LandmarkSet};
use crate::pipeline::{MeasurementPipeline, MeasurementResult};
use crate::resolution::DisplayGeometry;
use crate::store::CalibrationStore;
use crate::Result;
use serde::Deserialize;

/// One frame of input from the external pose model
#[derive(Debug, Clone, Deserialize)]
pub struct FrameInput {
    /// Source frame width in pixels
    pub width: u32,
    /// Source frame height in pixels
    pub height: u32,
    /// Detected landmarks; absent when no pose was found
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

/// Calibration and measurement state for one logical stream
#[derive(Debug)]
pub struct MeasurementSession {
    pipeline: MeasurementPipeline,
}

impl MeasurementSession {
    /// Create a session around a shared calibration store
    #[must_use]
    pub fn new(config: &Config, store: SharedStore) -> Self {
        Self {
            pipeline: MeasurementPipeline::new(config, store),
        }
    }

    /// Create a standalone session with its own store at the configured path
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let store = shared_store(CalibrationStore::new(&config.calibration.file));
        Self::new(config, store)
    }

    /// Process one frame, in arrival order
    pub fn process(&mut self, frame: &FrameInput) -> MeasurementResult {
        let set = frame.landmarks.as_ref().map(|l| LandmarkSet::new(l.clone()));
        self.pipeline.process_frame(set.as_ref(), frame.width, frame.height)
    }

    /// Apply the built-in preset calibration.
    ///
    /// # Errors
    ///
    /// Returns a persistence error; the preset is still applied in memory.
    pub fn use_preset(&mut self) -> Result<f64> {
        self.pipeline.engine_mut().use_preset()
    }

    /// Calibrate from two reference points of known separation.
    ///
    /// # Errors
    ///
    /// See [`crate::calibration::CalibrationEngine::calibrate_manual`].
    pub fn calibrate_manual(&mut self, points: &[PixelPoint], reference_cm: f64) -> Result<f64> {
        self.pipeline.engine_mut().calibrate_manual(points, reference_cm)
    }

    /// Override the scale with an explicit pixels-per-centimeter value.
    ///
    /// # Errors
    ///
    /// See [`crate::calibration::CalibrationEngine::set_scale`].
    pub fn set_scale(&mut self, pixels_per_cm: f64) -> Result<f64> {
        self.pipeline.engine_mut().set_scale(pixels_per_cm)
    }

    /// Fine-tune the current scale by a multiplicative factor.
    ///
    /// # Errors
    ///
    /// See [`crate::calibration::CalibrationEngine::set_multiplier`].
    pub fn set_multiplier(&mut self, factor: f64) -> Result<f64> {
        self.pipeline.engine_mut().set_multiplier(factor)
    }

    /// Clear the calibration and its persisted record.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the record cannot be removed.
    pub fn reset(&mut self) -> Result<()> {
        self.pipeline.engine_mut().reset()
    }

    /// Report the consuming surface's display geometry
    pub fn set_display_geometry(&mut self, geometry: DisplayGeometry) {
        self.pipeline.normalizer_mut().set_display_geometry(geometry);
    }

    /// The active scale, if any
    #[must_use]
    pub fn scale(&self) -> Option<f64> {
        self.pipeline.engine().scale()
    }

    /// Provenance of the active scale
    #[must_use]
    pub fn scale_source(&self) -> CalibrationSource {
        self.pipeline.engine().source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_isolate_resolution_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let store = shared_store(CalibrationStore::new(dir.path().join("calibration.json")));

        let mut a = MeasurementSession::new(&config, store.clone());
        let mut b = MeasurementSession::new(&config, store);

        let frame_small = FrameInput {
            width: 640,
            height: 480,
            landmarks: None,
        };
        let frame_large = FrameInput {
            width: 1920,
            height: 1080,
            landmarks: None,
        };

        a.process(&frame_small);
        b.process(&frame_large);

        // Each session memoizes its own resolution
        assert_ne!(a.scale(), b.scale());
    }

    #[test]
    fn test_frame_input_deserializes() {
        let json = r#"{
            "width": 640,
            "height": 480,
            "landmarks": [
                {"x": 0.5, "y": 0.5, "z": 0.0, "visibility": 0.9}
            ]
        }"#;

        let frame: FrameInput = serde_json::from_str(json).unwrap();
        assert_eq!(frame.width, 640);
        assert_eq!(frame.landmarks.unwrap().len(), 1);

        let empty: FrameInput = serde_json::from_str(r#"{"width": 640, "height": 480}"#).unwrap();
        assert!(empty.landmarks.is_none());
    }
}
