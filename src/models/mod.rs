pub mod ambulance;
pub mod call;
pub mod coordinate;
pub mod dispatch;

pub use ambulance::{Ambulance, AmbulanceDescriptor, AmbulanceStatus, EquipmentLevel};
pub use call::{CallDescriptor, CallStatus, EmergencyCall, Severity};
pub use coordinate::Coordinate;
pub use dispatch::{DispatchRecord, DispatchStatus};

pub type AmbulanceId = u64;
pub type CallId = u64;
pub type DispatchId = u64;
