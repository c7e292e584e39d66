use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::coordinate::Coordinate;
use super::AmbulanceId;
use crate::error::{DispatchError, Result};

pub const MIN_CREW: u8 = 1;
pub const MAX_CREW: u8 = 6;
/// Largest id a client may choose; ids must stay exact as JSON numbers.
pub const MAX_CLIENT_ID: AmbulanceId = (1 << 53) - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbulanceStatus {
    Available,
    EnRoute,
    AtScene,
    Transporting,
    OutOfService,
}

impl AmbulanceStatus {
    pub fn is_eligible(self) -> bool {
        self != AmbulanceStatus::OutOfService
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AmbulanceStatus::Available => "available",
            AmbulanceStatus::EnRoute => "en_route",
            AmbulanceStatus::AtScene => "at_scene",
            AmbulanceStatus::Transporting => "transporting",
            AmbulanceStatus::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for AmbulanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability tier. Variant order gives basic < advanced < critical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentLevel {
    Basic,
    Advanced,
    Critical,
}

impl EquipmentLevel {
    pub fn weight(self) -> i32 {
        match self {
            EquipmentLevel::Basic => 1,
            EquipmentLevel::Advanced => 2,
            EquipmentLevel::Critical => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ambulance {
    pub id: AmbulanceId,
    pub vehicle_id: String,
    pub status: AmbulanceStatus,
    pub location: Coordinate,
    pub equipment_level: EquipmentLevel,
    pub crew_size: u8,
    #[serde(with = "ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

/// Fleet update payload. `id` selects replace-by-id; without it a new
/// ambulance is created.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceDescriptor {
    #[serde(default)]
    pub id: Option<AmbulanceId>,
    pub vehicle_id: String,
    pub status: AmbulanceStatus,
    pub location: Coordinate,
    pub equipment_level: EquipmentLevel,
    pub crew_size: i64,
}

impl AmbulanceDescriptor {
    pub fn validate(&self) -> Result<()> {
        match self.id {
            Some(0) => return Err(DispatchError::validation("id", "must be positive")),
            Some(id) if id > MAX_CLIENT_ID => {
                return Err(DispatchError::validation(
                    "id",
                    format!("{} exceeds {}", id, MAX_CLIENT_ID),
                ))
            }
            _ => {}
        }
        if self.vehicle_id.trim().is_empty() {
            return Err(DispatchError::validation("vehicleId", "must not be empty"));
        }
        self.location.validate()?;
        if !(i64::from(MIN_CREW)..=i64::from(MAX_CREW)).contains(&self.crew_size) {
            return Err(DispatchError::validation(
                "crewSize",
                format!("{} is outside {}..={}", self.crew_size, MIN_CREW, MAX_CREW),
            ));
        }
        Ok(())
    }

    /// Validates and materialises the descriptor under the given id.
    pub fn into_ambulance(self, id: AmbulanceId, now: DateTime<Utc>) -> Result<Ambulance> {
        self.validate()?;
        Ok(Ambulance {
            id,
            vehicle_id: self.vehicle_id,
            status: self.status,
            location: self.location,
            equipment_level: self.equipment_level,
            crew_size: self.crew_size as u8,
            last_updated: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> AmbulanceDescriptor {
        AmbulanceDescriptor {
            id: None,
            vehicle_id: "GH-AMB-200".to_string(),
            status: AmbulanceStatus::Available,
            location: Coordinate { lat: 5.6, lng: -0.19 },
            equipment_level: EquipmentLevel::Advanced,
            crew_size: 3,
        }
    }

    #[test]
    fn test_equipment_order() {
        assert!(EquipmentLevel::Basic < EquipmentLevel::Advanced);
        assert!(EquipmentLevel::Advanced < EquipmentLevel::Critical);
    }

    #[test]
    fn test_crew_size_bounds() {
        let mut d = descriptor();
        d.crew_size = 0;
        assert!(matches!(d.validate(), Err(DispatchError::Validation { field: "crewSize", .. })));
        d.crew_size = 7;
        assert!(d.validate().is_err());
        d.crew_size = 6;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_blank_vehicle_id_rejected() {
        let mut d = descriptor();
        d.vehicle_id = "  ".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&AmbulanceStatus::OutOfService).unwrap();
        assert_eq!(json, "\"out_of_service\"");
        let parsed: AmbulanceDescriptor = serde_json::from_str(
            r#"{"vehicleId":"X-1","status":"at_scene","location":{"lat":1.0,"lng":2.0},
                "equipmentLevel":"critical","crewSize":2}"#,
        )
        .unwrap();
        assert_eq!(parsed.status, AmbulanceStatus::AtScene);
        assert_eq!(parsed.equipment_level, EquipmentLevel::Critical);
        assert_eq!(parsed.id, None);
    }
}
