use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting values outside [-90,90] / [-180,180].
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let coord = Self { lat, lng };
        coord.validate()?;
        Ok(coord)
    }

    pub fn validate(&self) -> Result<()> {
        // NaN fails both range checks
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(DispatchError::validation(
                "location.lat",
                format!("{} is outside [-90, 90]", self.lat),
            ));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(DispatchError::validation(
                "location.lng",
                format!("{} is outside [-180, 180]", self.lng),
            ));
        }
        Ok(())
    }

    /// Shifts the coordinate, clamping back into valid bounds.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: (self.lat + d_lat).clamp(-90.0, 90.0),
            lng: (self.lng + d_lng).clamp(-180.0, 180.0),
        }
    }
}
