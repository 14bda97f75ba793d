//! Trip model and client-visible lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::navigation::Coordinates;

/// Trip status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// Waiting for a captain
    #[default]
    Pending,
    /// Taken by this captain, not started yet
    Accepted,
    /// Customer picked up
    InProgress,
    /// Finished with OTP confirmation
    Completed,
    /// Dropped before completion
    Cancelled,
}

impl TripStatus {
    /// Display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether no further transitions are possible
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Actions the captain may request in this status
    pub const fn actions(&self) -> &'static [TripAction] {
        match self {
            Self::Pending => &[TripAction::Accept, TripAction::Reject],
            Self::Accepted => &[TripAction::Start],
            Self::InProgress => &[TripAction::End, TripAction::Cancel],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether `action` is offered in this status
    pub fn allows(&self, action: TripAction) -> bool {
        self.actions().contains(&action)
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A transition the captain can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripAction {
    /// Take a pending request
    Accept,
    /// Decline a pending request (reason required)
    Reject,
    /// Begin an accepted trip
    Start,
    /// Complete an in-progress trip (customer OTP required)
    End,
    /// Abort an in-progress trip (reason required)
    Cancel,
}

impl TripAction {
    /// Button label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accept => "Accept",
            Self::Reject => "Reject",
            Self::Start => "Start Trip",
            Self::End => "End Trip",
            Self::Cancel => "Cancel Trip",
        }
    }

    /// Key bound to this action on the home screen
    pub const fn key(&self) -> char {
        match self {
            Self::Accept => 'a',
            Self::Reject => 'x',
            Self::Start => 's',
            Self::End => 'e',
            Self::Cancel => 'c',
        }
    }
}

/// A single pickup-to-dropoff job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Backend identifier
    pub id: String,
    /// Assigned captain, once accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captain_id: Option<String>,
    /// Kind of service (delivery, ride, ...)
    pub service_type: String,
    /// Pickup address
    pub pickup_location: String,
    /// Pickup latitude
    pub pickup_lat: f64,
    /// Pickup longitude
    pub pickup_lng: f64,
    /// Dropoff address
    pub dropoff_location: String,
    /// Dropoff latitude
    pub dropoff_lat: f64,
    /// Dropoff longitude
    pub dropoff_lng: f64,
    /// Route length in kilometres
    pub distance: f64,
    /// Fare quoted at request time
    pub estimated_fare: f64,
    /// Fare charged, once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_fare: Option<f64>,
    /// Current status
    pub status: TripStatus,
    /// Completion OTP echoed back by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    /// Reason given for a cancellation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// When the trip started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the trip completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the request was created
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Pickup coordinates
    pub const fn pickup(&self) -> Coordinates {
        Coordinates::new(self.pickup_lat, self.pickup_lng)
    }

    /// Dropoff coordinates
    pub const fn dropoff(&self) -> Coordinates {
        Coordinates::new(self.dropoff_lat, self.dropoff_lng)
    }

    /// Charged fare when known, otherwise the estimate
    pub fn fare(&self) -> f64 {
        self.actual_fare.unwrap_or(self.estimated_fare)
    }

    /// Service type with a capital first letter
    pub fn service_label(&self) -> String {
        let mut chars = self.service_type.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_trip(id: &str, status: TripStatus) -> Trip {
    Trip {
        id: id.to_string(),
        captain_id: None,
        service_type: "delivery".to_string(),
        pickup_location: "Andheri East".to_string(),
        pickup_lat: 19.1197,
        pickup_lng: 72.8468,
        dropoff_location: "Bandra West".to_string(),
        dropoff_lat: 19.06,
        dropoff_lng: 72.8365,
        distance: 12.4,
        estimated_fare: 180.0,
        actual_fare: None,
        status,
        otp: None,
        cancel_reason: None,
        started_at: None,
        completed_at: None,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_per_status() {
        assert_eq!(
            TripStatus::Pending.actions(),
            &[TripAction::Accept, TripAction::Reject]
        );
        assert!(TripStatus::Accepted.allows(TripAction::Start));
        assert!(!TripStatus::Accepted.allows(TripAction::Cancel));
        assert!(TripStatus::InProgress.allows(TripAction::Cancel));
        assert!(!TripStatus::Pending.allows(TripAction::Cancel));
        assert!(TripStatus::Completed.actions().is_empty());
        assert!(TripStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        let status: TripStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(status, TripStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&TripStatus::Cancelled).unwrap(),
            r#""cancelled""#
        );
    }

    #[test]
    fn test_parse_minimal_trip() {
        let json = r#"{
            "id": "trip_001",
            "service_type": "delivery",
            "pickup_location": "Andheri East",
            "pickup_lat": 19.1197,
            "pickup_lng": 72.8468,
            "dropoff_location": "Bandra West",
            "dropoff_lat": 19.06,
            "dropoff_lng": 72.8365,
            "distance": 12.4,
            "estimated_fare": 180,
            "status": "pending",
            "created_at": "2025-01-05T10:30:00.000Z"
        }"#;
        let trip: Trip = serde_json::from_str(json).unwrap();
        assert_eq!(trip.status, TripStatus::Pending);
        assert!(trip.actual_fare.is_none());
        assert!((trip.fare() - 180.0).abs() < f64::EPSILON);
        assert_eq!(trip.pickup(), Coordinates::new(19.1197, 72.8468));
    }

    #[test]
    fn test_fare_prefers_actual() {
        let mut trip = sample_trip("trip_002", TripStatus::Completed);
        trip.actual_fare = Some(210.5);
        assert!((trip.fare() - 210.5).abs() < f64::EPSILON);
        assert_eq!(trip.service_label(), "Delivery");
    }
}
