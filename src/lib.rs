//! Body measurement library converting pose landmarks into calibrated
//! real-world distances.
//!
//! Landmarks come from an external pose-estimation model as normalized
//! coordinates with visibility scores. This library turns them into
//! centimeter measurements (shoulder width, waist width, rough depth)
//! and keeps the readings consistent across capture resolutions and
//! display geometries:
//!
//! 1. Pixel and 3D distances per measured body segment
//! 2. Resolution-aware rescaling of a reference calibration
//! 3. Scale resolution: persisted/manual/preset calibration, then
//!    automatic facial-feature estimation, then "unavailable"
//! 4. Depth and posture diagnostics plus a per-frame confidence
//!
//! # Examples
//!
//! ```no_run
//! use body_measure::config::Config;
//! use body_measure::landmark::{Landmark, LandmarkIndex};
//! use body_measure::session::{FrameInput, MeasurementSession};
//!
//! # fn main() -> body_measure::Result<()> {
//! let config = Config::default();
//! config.validate()?;
//!
//! let mut session = MeasurementSession::from_config(&config);
//!
//! // Landmarks for one frame, as produced by the pose model
//! let landmarks = vec![Landmark::new(0.5, 0.5, 0.0, 0.9); LandmarkIndex::COUNT];
//! let frame = FrameInput {
//!     width: 640,
//!     height: 480,
//!     landmarks: Some(landmarks),
//! };
//!
//! let result = session.process(&frame);
//! if let Some(shoulders) = result.segment("shoulders") {
//!     match shoulders.distance_cm {
//!         Some(cm) => println!("Shoulder width: {cm:.1} cm"),
//!         None => println!("Shoulder width: {:.0} px (uncalibrated)", shoulders.pixel_distance),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Manual calibration
//!
//! ```no_run
//! use body_measure::calibration::PixelPoint;
//! use body_measure::config::Config;
//! use body_measure::session::MeasurementSession;
//!
//! # fn main() -> body_measure::Result<()> {
//! let mut session = MeasurementSession::from_config(&Config::default());
//!
//! // Two points marked on a credit card (8.5 cm) in the frame
//! let points = [PixelPoint::new(120.0, 300.0), PixelPoint::new(205.0, 300.0)];
//! let scale = session.calibrate_manual(&points, 8.5)?;
//! println!("Calibrated: {scale:.2} px/cm");
//! # Ok(())
//! # }
//! ```

/// Landmark types, body segments and distance geometry
pub mod landmark;

/// Automatic scale estimation from facial anthropometry
pub mod scale;

/// Durable persistence of the calibration scale
pub mod store;

/// Calibration engine and provenance tracking
pub mod calibration;

/// Resolution- and display-aware scale normalization
pub mod resolution;

/// Per-frame measurement orchestration
pub mod pipeline;

/// Per-stream session state and input contracts
pub mod session;

/// Configuration management
pub mod config;

/// Constants used throughout the library
pub mod constants;

/// Error types and result handling
pub mod error;

pub use error::{Error, Result};
