use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{AmbulanceId, CallId, DispatchId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Dispatched,
    Arrived,
    Completed,
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DispatchStatus::Dispatched => "dispatched",
            DispatchStatus::Arrived => "arrived",
            DispatchStatus::Completed => "completed",
        })
    }
}

/// Link between one call and the ambulance sent to it. The (call, ambulance)
/// pair is fixed for the lifetime of the record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRecord {
    pub id: DispatchId,
    pub call_id: CallId,
    pub ambulance_id: AmbulanceId,
    #[serde(with = "ts_milliseconds")]
    pub dispatch_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub completion_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_traveled_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DispatchStatus>,
}

impl DispatchRecord {
    pub fn is_active(&self) -> bool {
        self.completion_time.is_none() && self.status != Some(DispatchStatus::Completed)
    }
}
