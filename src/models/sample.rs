use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accelerometer reading in the device frame, gravity included.
/// Axis values are in m/s²; a phone at rest reads a magnitude near 9.8.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub captured_at: DateTime<Utc>,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64, captured_at: DateTime<Utc>) -> Self {
        Self { x, y, z, captured_at }
    }

    /// All three axes are finite numbers. Sensor glitches surface as NaN
    /// or infinity on one axis and fail this check as a whole.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One GPS fix. Speed is absent on fixes where the receiver could not
/// derive one, which is common right after acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Ground speed in m/s, when the fix carries one.
    pub speed_mps: Option<f64>,
    /// Horizontal accuracy radius in meters.
    pub accuracy_m: f64,
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(
        latitude: f64,
        longitude: f64,
        speed_mps: Option<f64>,
        accuracy_m: f64,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            speed_mps,
            accuracy_m,
            captured_at,
        }
    }

    /// Coordinates are finite and inside the valid lat/lon ranges.
    pub fn is_well_formed(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Ground speed converted for display.
    pub fn speed_kmh(&self) -> Option<f64> {
        self.speed_mps.map(|mps| mps * 3.6)
    }
}
