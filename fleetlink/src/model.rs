//! Wire models for the backend's domain collections.
//!
//! Field names and enum spellings follow the backend schema verbatim, so
//! every type (de)serializes straight to the JSON the service exchanges.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::data::{Identity, UserStatus};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate_number: String,
    #[serde(rename = "type")]
    pub kind: VehicleType,
    pub status: VehicleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_due_date: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum VehicleType {
    Ambulance,
    #[serde(rename = "Fire Truck")]
    FireTruck,
    #[serde(rename = "Supply Truck")]
    SupplyTruck,
    #[serde(rename = "Rescue Vehicle")]
    RescueVehicle,
    #[serde(rename = "Command Vehicle")]
    CommandVehicle,
    Other,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum VehicleStatus {
    Idle,
    Deployed,
    #[serde(rename = "HQ")]
    Hq,
    Maintenance,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DriverProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub license_number: String,
    pub availability_status: AvailabilityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_logged: Option<f64>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AvailabilityStatus {
    Available,
    #[serde(rename = "On Mission")]
    OnMission,
    #[serde(rename = "Off Duty")]
    OffDuty,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Mission {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: MissionStatus,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MissionStatus {
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Delayed,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MaintenanceLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub issue_reported: String,
    #[serde(with = "time::serde::rfc3339")]
    pub reported_date: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub resolved_date: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<Uuid>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub status: NotificationStatus,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum NotificationKind {
    Alert,
    Broadcast,
    #[serde(rename = "SOS")]
    Sos,
    Instruction,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum NotificationStatus {
    Delivered,
    Read,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LocationLog {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

/// Location sample as submitted by the reporter; the backend assigns the id.
#[derive(Clone, Debug, Serialize)]
pub struct NewLocationLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewNotification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub status: NotificationStatus,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewMaintenanceLog {
    pub vehicle_id: Uuid,
    pub issue_reported: String,
    #[serde(with = "time::serde::rfc3339")]
    pub reported_date: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<Uuid>,
}

/// A record from the backend's system users collection, as returned with
/// `fields=*,role.name`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub role: Option<RoleRef>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoleRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl UserRecord {
    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().and_then(|role| role.name.as_deref())
    }
}

impl From<UserRecord> for Identity {
    fn from(value: UserRecord) -> Self {
        Identity {
            id: value.id,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            phone_number: value.phone_number,
            status: value.status,
            role_name: value.role.and_then(|role| role.name),
        }
    }
}
