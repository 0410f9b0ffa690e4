//! Resolution- and display-aware calibration normalization.
//!
//! A scale calibrated at one capture resolution is wrong at another: the
//! same physical subject covers proportionally more pixels. The normalizer
//! holds a reference calibration taken at a fixed reference resolution and
//! rescales it whenever the capture resolution or the consuming display's
//! geometry changes, so a fixed body yields a stable centimeter reading.

use crate::calibration::CalibrationEngine;
use crate::config::ResolutionConfig;
use serde::{Deserialize, Serialize};

/// Display geometry reported by the consuming surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub video_width: f64,
    pub video_height: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub screen_width: f64,
    pub screen_height: f64,
    pub device_pixel_ratio: f64,
}

/// Keeps the effective scale invariant across resolution and display changes
#[derive(Debug)]
pub struct ResolutionNormalizer {
    reference_width: u32,
    reference_height: u32,
    reference_calibration: f64,
    correction_factor: f64,
    display_multiplier: f64,
    display_geometry: Option<DisplayGeometry>,
    current_resolution: Option<(u32, u32)>,
    dynamic_calibration: Option<f64>,
}

impl ResolutionNormalizer {
    /// Create a normalizer around a reference calibration (the scale that
    /// holds at the configured reference resolution)
    #[must_use]
    pub fn new(config: &ResolutionConfig, reference_calibration: f64) -> Self {
        Self {
            reference_width: config.reference_width,
            reference_height: config.reference_height,
            reference_calibration,
            correction_factor: config.correction_factor,
            display_multiplier: 1.0,
            display_geometry: None,
            current_resolution: None,
            dynamic_calibration: None,
        }
    }

    /// Multiplier converting the reference calibration to one valid at the
    /// given capture resolution.
    ///
    /// Width and height scales are averaged to soften aspect-ratio-change
    /// bias, then multiplied by the configured correction factor. The
    /// original implementation computed the same average and then discarded
    /// it, returning the bare 1/1.13 constant; that made measurements
    /// double at doubled capture resolution. Applying the correction to the
    /// computed average keeps a fixed subject stable across resolutions.
    #[must_use]
    pub fn resolution_multiplier(&self, frame_width: u32, frame_height: u32) -> f64 {
        let width_scale = f64::from(frame_width) / f64::from(self.reference_width);
        let height_scale = f64::from(frame_height) / f64::from(self.reference_height);

        (width_scale + height_scale) / 2.0 * self.correction_factor
    }

    /// Ratio of display size to captured video size; 1.0 until the
    /// consuming surface reports its geometry
    #[must_use]
    pub fn display_multiplier(&self) -> f64 {
        self.display_multiplier
    }

    /// The last resolution-adjusted calibration, if one was computed
    #[must_use]
    pub fn dynamic_calibration(&self) -> Option<f64> {
        self.dynamic_calibration
    }

    /// The last capture resolution seen by [`Self::update`]
    #[must_use]
    pub fn current_resolution(&self) -> Option<(u32, u32)> {
        self.current_resolution
    }

    #[must_use]
    pub fn display_geometry(&self) -> Option<&DisplayGeometry> {
        self.display_geometry.as_ref()
    }

    /// Record the display geometry of the consuming surface and derive the
    /// display multiplier. Forces a recalibration on the next frame.
    pub fn set_display_geometry(&mut self, geometry: DisplayGeometry) {
        let video_scale = (geometry.video_width + geometry.video_height) / 2.0;
        let display_scale = (geometry.display_width + geometry.display_height) / 2.0;

        self.display_multiplier = if video_scale > 0.0 && display_scale > 0.0 && display_scale.is_finite() {
            display_scale / video_scale
        } else {
            1.0
        };

        log::info!(
            "Display geometry: video {}x{}, display {}x{} (DPR {}), multiplier {:.2}",
            geometry.video_width,
            geometry.video_height,
            geometry.display_width,
            geometry.display_height,
            geometry.device_pixel_ratio,
            self.display_multiplier
        );

        self.display_geometry = Some(geometry);
        // Invalidate the memoized resolution so the next frame recomputes
        self.current_resolution = None;
    }

    /// Recompute the effective scale if the capture resolution changed.
    ///
    /// Memoized against the last-seen resolution: repeated calls with the
    /// same dimensions do nothing and return `false`. On a change the
    /// resolution-adjusted calibration is pushed into the engine as the
    /// active scale (the persisted record is untouched).
    pub fn update(&mut self, frame_width: u32, frame_height: u32, engine: &mut CalibrationEngine) -> bool {
        if frame_width == 0 || frame_height == 0 {
            log::warn!("Ignoring calibration update for empty frame {frame_width}x{frame_height}");
            return false;
        }
        if self.current_resolution == Some((frame_width, frame_height)) {
            return false;
        }

        self.current_resolution = Some((frame_width, frame_height));
        let multiplier = self.resolution_multiplier(frame_width, frame_height) * self.display_multiplier;
        let calibration = self.reference_calibration * multiplier;
        self.dynamic_calibration = Some(calibration);
        engine.apply_dynamic(calibration);

        log::info!(
            "Resolution {frame_width}x{frame_height}: multiplier {multiplier:.3}, calibration {calibration:.2} px/cm"
        );
        true
    }
}
