//! Durable persistence for the calibration scale.
//!
//! A single JSON record (`{"pixels_per_cm": <f64>}`) on disk. Reads degrade
//! to "no saved calibration" on any failure; writes go through a temporary
//! file and rename so a concurrent read never observes a partial record.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CalibrationRecord {
    pixels_per_cm: f64,
}

/// File-backed store for the calibration scale
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted scale.
    ///
    /// Returns `None` if the file is absent, unreadable, malformed, or
    /// holds a non-positive value. Failures are logged, never raised.
    #[must_use]
    pub fn load(&self) -> Option<f64> {
        if !self.path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Could not read calibration file {}: {e}", self.path.display());
                return None;
            }
        };

        match serde_json::from_str::<CalibrationRecord>(&content) {
            Ok(record) if record.pixels_per_cm > 0.0 && record.pixels_per_cm.is_finite() => Some(record.pixels_per_cm),
            Ok(record) => {
                log::warn!(
                    "Ignoring invalid calibration value {} in {}",
                    record.pixels_per_cm,
                    self.path.display()
                );
                None
            }
            Err(e) => {
                log::warn!("Malformed calibration file {}: {e}", self.path.display());
                None
            }
        }
    }

    /// Persist a scale value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCalibration`] for a non-positive or
    /// non-finite value, or an I/O error if the write fails. A failed
    /// write leaves any existing record intact.
    pub fn save(&self, pixels_per_cm: f64) -> Result<()> {
        if pixels_per_cm <= 0.0 || !pixels_per_cm.is_finite() {
            return Err(Error::InvalidCalibration(format!(
                "pixels_per_cm must be positive and finite, got {pixels_per_cm}"
            )));
        }

        let json = serde_json::to_string(&CalibrationRecord { pixels_per_cm })?;

        // Write-then-rename keeps the record atomic on the same filesystem
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    /// Remove the persisted record, if any.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
