use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::coordinate::Coordinate;
use super::{AmbulanceId, CallId};
use crate::error::{DispatchError, Result};

const PHONE_MIN_LEN: usize = 3;
const PHONE_MAX_LEN: usize = 20;

/// Caller-assigned urgency, 1 (most severe) to 4 (least severe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const CRITICAL: Severity = Severity(1);
    pub const SERIOUS: Severity = Severity(2);
    pub const MODERATE: Severity = Severity(3);
    pub const MINOR: Severity = Severity(4);

    pub fn level(self) -> u8 {
        self.0
    }

    /// Minimum equipment weight a responding ambulance should carry.
    pub fn required_weight(self) -> i32 {
        match self.0 {
            1 => 3,
            2 => 2,
            _ => 1,
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = DispatchError;

    fn try_from(level: u8) -> Result<Self> {
        if (1..=4).contains(&level) {
            Ok(Severity(level))
        } else {
            Err(DispatchError::validation(
                "severityLevel",
                format!("{} is outside 1..=4", level),
            ))
        }
    }
}

impl TryFrom<i64> for Severity {
    type Error = DispatchError;

    fn try_from(level: i64) -> Result<Self> {
        u8::try_from(level)
            .map_err(|_| {
                DispatchError::validation("severityLevel", format!("{} is outside 1..=4", level))
            })
            .and_then(Severity::try_from)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Pending,
    Assigned,
    EnRoute,
    Completed,
    Cancelled,
}

impl CallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CallStatus::Pending => "pending",
            CallStatus::Assigned => "assigned",
            CallStatus::EnRoute => "en_route",
            CallStatus::Completed => "completed",
            CallStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyCall {
    pub id: CallId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_phone: Option<String>,
    pub location: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub severity_level: Severity,
    #[serde(with = "ts_milliseconds")]
    pub call_time: DateTime<Utc>,
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_ambulance_id: Option<AmbulanceId>,
}

/// Intake payload for a new emergency call.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    #[serde(default)]
    pub caller_phone: Option<String>,
    pub location: Coordinate,
    #[serde(default)]
    pub address: Option<String>,
    pub severity_level: i64,
}

impl CallDescriptor {
    pub fn new(location: Coordinate, severity: Severity) -> Self {
        Self {
            caller_phone: None,
            location,
            address: None,
            severity_level: i64::from(severity.level()),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_caller_phone(mut self, phone: impl Into<String>) -> Self {
        self.caller_phone = Some(phone.into());
        self
    }

    pub fn validate(&self) -> Result<Severity> {
        self.location.validate()?;
        let severity = Severity::try_from(self.severity_level)?;
        if let Some(phone) = &self.caller_phone {
            let len = phone.chars().count();
            if !(PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&len) {
                return Err(DispatchError::validation(
                    "callerPhone",
                    format!("length {} is outside {}..={}", len, PHONE_MIN_LEN, PHONE_MAX_LEN),
                ));
            }
        }
        Ok(severity)
    }

    /// Validates the descriptor and builds a `pending` call.
    pub fn into_call(self, id: CallId, now: DateTime<Utc>) -> Result<EmergencyCall> {
        let severity_level = self.validate()?;
        Ok(EmergencyCall {
            id,
            caller_phone: self.caller_phone,
            location: self.location,
            address: self.address,
            severity_level,
            call_time: now,
            status: CallStatus::Pending,
            assigned_ambulance_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_range() {
        assert!(Severity::try_from(0u8).is_err());
        assert!(Severity::try_from(5u8).is_err());
        assert!(Severity::try_from(-1i64).is_err());
        assert_eq!(Severity::try_from(2i64).unwrap(), Severity::SERIOUS);
    }

    #[test]
    fn test_required_weight_table() {
        assert_eq!(Severity::CRITICAL.required_weight(), 3);
        assert_eq!(Severity::SERIOUS.required_weight(), 2);
        assert_eq!(Severity::MODERATE.required_weight(), 1);
        assert_eq!(Severity::MINOR.required_weight(), 1);
    }

    #[test]
    fn test_intake_builds_pending_call() {
        let call = CallDescriptor::new(Coordinate { lat: 5.6, lng: -0.18 }, Severity::MODERATE)
            .with_address("Osu, Accra")
            .into_call(7, Utc::now())
            .unwrap();
        assert_eq!(call.id, 7);
        assert_eq!(call.status, CallStatus::Pending);
        assert_eq!(call.assigned_ambulance_id, None);
        assert_eq!(call.address.as_deref(), Some("Osu, Accra"));
    }

    #[test]
    fn test_intake_rejects_short_phone() {
        let result = CallDescriptor::new(Coordinate { lat: 0.0, lng: 0.0 }, Severity::MINOR)
            .with_caller_phone("12")
            .into_call(1, Utc::now());
        assert!(matches!(result, Err(DispatchError::Validation { field: "callerPhone", .. })));
    }

    #[test]
    fn test_severity_serializes_as_number() {
        let json = serde_json::to_string(&Severity::CRITICAL).unwrap();
        assert_eq!(json, "1");
        assert!(serde_json::from_str::<Severity>("9").is_err());
    }
}
