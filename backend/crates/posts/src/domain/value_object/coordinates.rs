//! Coordinates Value Object
//!
//! A validated (latitude, longitude) pair, plus the proximity rule that
//! drives place coalescing.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Axis-parallel coalescing threshold in degrees (roughly 11 m).
///
/// Two coordinate pairs anchor the same place when both axis deltas are
/// strictly below this value against an existing place.
pub const COALESCE_THRESHOLD: f64 = 0.0001;

/// Validated geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(AppError::validation_failed("Coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::validation_failed(
                "Latitude must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::validation_failed(
                "Longitude must be between -180 and 180",
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Strict proximity check on both axes (`<`, not `<=`)
    pub fn is_near(&self, other: &Coordinates) -> bool {
        (self.latitude - other.latitude).abs() < COALESCE_THRESHOLD
            && (self.longitude - other.longitude).abs() < COALESCE_THRESHOLD
    }
}
