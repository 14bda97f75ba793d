//! Offline backend serving fixed demo data
//!
//! State lives in memory for the life of the client, so a trip can be taken
//! from pending through completion without a server.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::{Mutex, MutexGuard};

use crate::error::{CaptainError, Result};
use crate::models::{
    AuthResponse, Captain, DateRange, Earning, EarningSummary, LoginCredentials, MessageResponse,
    OtpVerification, ProfileUpdate, ServiceScope, SignupPayload, Trip, TripStatus, VehicleType,
};
use crate::storage::SessionStore;

use super::{CaptainApi, persist_token};

/// Email accepted by the mock login
pub const DEMO_EMAIL: &str = "demo@captain.app";

/// Password accepted by the mock login
pub const DEMO_PASSWORD: &str = "password123";

/// Token issued by the mock backend
pub const MOCK_TOKEN: &str = "mock.jwt.token";

/// Signup code accepted by the mock verification
pub const MOCK_SIGNUP_OTP: &str = "123456";

struct MockState {
    captain: Captain,
    pending: Vec<Trip>,
    active: Option<Trip>,
    earnings: Vec<Earning>,
    summary: EarningSummary,
}

impl MockState {
    fn seeded() -> Self {
        let today = Utc::now().date_naive();
        let earning = |id: &str, trip_id: &str, amount: f64| Earning {
            id: id.to_string(),
            captain_id: "cap_001".to_string(),
            trip_id: trip_id.to_string(),
            amount,
            date: today,
            created_at: Utc::now(),
        };

        Self {
            captain: demo_captain(),
            pending: vec![demo_trip()],
            active: None,
            earnings: vec![
                earning("earn_001", "trip_001", 180.0),
                earning("earn_002", "trip_002", 220.0),
            ],
            summary: EarningSummary {
                today: 400.0,
                week: 2800.0,
                month: 12000.0,
                total: 55000.0,
            },
        }
    }
}

fn demo_captain() -> Captain {
    Captain {
        id: "cap_001".to_string(),
        full_name: "Demo Captain".to_string(),
        phone: "9999999999".to_string(),
        email: DEMO_EMAIL.to_string(),
        vehicle_type: VehicleType::Bike,
        vehicle_subtype: None,
        service_scope: ServiceScope::IntraCity,
        is_available: true,
        rating: 4.7,
        total_trips: 123,
        city: Some("Mumbai".to_string()),
    }
}

fn demo_trip() -> Trip {
    Trip {
        id: "trip_001".to_string(),
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
        status: TripStatus::Pending,
        otp: None,
        cancel_reason: None,
        started_at: None,
        completed_at: None,
        created_at: Utc::now() - ChronoDuration::minutes(2),
    }
}

fn not_found(what: &str) -> CaptainError {
    CaptainError::api(404, format!("{what} not found"))
}

/// In-memory backend
pub struct MockClient {
    store: SessionStore,
    state: Mutex<MockState>,
}

impl MockClient {
    /// Fresh demo backend; tokens are persisted to `store`
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            state: Mutex::new(MockState::seeded()),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| CaptainError::Storage(anyhow::anyhow!("Mock state lock poisoned")))
    }

    /// Reject requests not carrying the mock token
    fn require_token(&self) -> Result<()> {
        match self.store.token()? {
            Some(token) if token == MOCK_TOKEN => Ok(()),
            _ => Err(CaptainError::api(401, "Unauthorized")),
        }
    }

    fn auth_response(&self, captain: Captain) -> Result<AuthResponse> {
        let response = AuthResponse {
            token: Some(MOCK_TOKEN.to_string()),
            captain: Some(captain),
            message: None,
        };
        persist_token(&self.store, &response)?;
        Ok(response)
    }
}

impl CaptainApi for MockClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let valid = credentials.email.trim().eq_ignore_ascii_case(DEMO_EMAIL)
            && credentials.password == DEMO_PASSWORD;
        if !valid {
            return Err(CaptainError::api(401, "Invalid credentials"));
        }

        let captain = self.state()?.captain.clone();
        self.auth_response(captain)
    }

    async fn signup(&self, payload: &SignupPayload) -> Result<MessageResponse> {
        tracing::debug!("Mock signup for {}", payload.phone);
        Ok(MessageResponse {
            message: Some(format!("OTP sent to {}", payload.phone)),
        })
    }

    async fn verify_otp(&self, verification: &OtpVerification) -> Result<AuthResponse> {
        if verification.otp != MOCK_SIGNUP_OTP {
            return Err(CaptainError::api(400, "Invalid OTP"));
        }

        let captain = self.state()?.captain.clone();
        self.auth_response(captain)
    }

    async fn resend_otp(&self, phone: &str) -> Result<MessageResponse> {
        Ok(MessageResponse {
            message: Some(format!("OTP sent to {phone}")),
        })
    }

    async fn logout(&self) -> Result<()> {
        Ok(())
    }

    async fn get_profile(&self) -> Result<Captain> {
        self.require_token()?;
        Ok(self.state()?.captain.clone())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Captain> {
        self.require_token()?;
        let mut state = self.state()?;
        update.apply_to(&mut state.captain);
        Ok(state.captain.clone())
    }

    async fn update_availability(&self, is_available: bool) -> Result<()> {
        self.require_token()?;
        self.state()?.captain.is_available = is_available;
        Ok(())
    }

    async fn get_pending_requests(&self) -> Result<Vec<Trip>> {
        Ok(self.state()?.pending.clone())
    }

    async fn get_active_trip(&self) -> Result<Option<Trip>> {
        Ok(self.state()?.active.clone())
    }

    async fn accept_trip(&self, trip_id: &str) -> Result<Trip> {
        let mut state = self.state()?;
        if state.active.is_some() {
            return Err(CaptainError::api(409, "Finish your current trip first"));
        }
        let idx = state
            .pending
            .iter()
            .position(|t| t.id == trip_id)
            .ok_or_else(|| not_found("Trip"))?;

        let mut trip = state.pending.remove(idx);
        trip.status = TripStatus::Accepted;
        trip.captain_id = Some(state.captain.id.clone());
        state.active = Some(trip.clone());
        Ok(trip)
    }

    async fn reject_trip(&self, trip_id: &str, reason: &str) -> Result<()> {
        let mut state = self.state()?;
        let before = state.pending.len();
        state.pending.retain(|t| t.id != trip_id);
        if state.pending.len() == before {
            return Err(not_found("Trip"));
        }
        tracing::debug!("Mock rejected {}: {}", trip_id, reason);
        Ok(())
    }

    async fn start_trip(&self, trip_id: &str) -> Result<Trip> {
        let mut state = self.state()?;
        let trip = state
            .active
            .as_mut()
            .filter(|t| t.id == trip_id && t.status == TripStatus::Accepted)
            .ok_or_else(|| not_found("Accepted trip"))?;

        trip.status = TripStatus::InProgress;
        trip.started_at = Some(Utc::now());
        Ok(trip.clone())
    }

    async fn end_trip(&self, trip_id: &str, otp: &str) -> Result<Option<Trip>> {
        if otp.len() != 4 || !otp.chars().all(|c| c.is_ascii_digit()) {
            return Err(CaptainError::api(400, "Invalid OTP"));
        }

        let mut state = self.state()?;
        let mut trip = state
            .active
            .take_if(|t| t.id == trip_id && t.status == TripStatus::InProgress)
            .ok_or_else(|| not_found("Trip in progress"))?;

        let now = Utc::now();
        trip.status = TripStatus::Completed;
        trip.actual_fare = Some(trip.estimated_fare);
        trip.completed_at = Some(now);

        let fare = trip.fare();
        let earning = Earning {
            id: format!("earn_{:03}", state.earnings.len() + 1),
            captain_id: state.captain.id.clone(),
            trip_id: trip.id.clone(),
            amount: fare,
            date: now.date_naive(),
            created_at: now,
        };
        state.earnings.push(earning);
        state.summary.today += fare;
        state.summary.week += fare;
        state.summary.month += fare;
        state.summary.total += fare;
        state.captain.total_trips += 1;

        Ok(Some(trip))
    }

    async fn cancel_trip(&self, trip_id: &str, reason: &str) -> Result<()> {
        let mut state = self.state()?;
        state
            .active
            .take_if(|t| t.id == trip_id && t.status == TripStatus::InProgress)
            .ok_or_else(|| not_found("Trip in progress"))?;
        tracing::debug!("Mock cancelled {}: {}", trip_id, reason);
        Ok(())
    }

    async fn get_earnings(&self, range: DateRange) -> Result<Vec<Earning>> {
        Ok(self
            .state()?
            .earnings
            .iter()
            .filter(|e| range.contains(e.date))
            .cloned()
            .collect())
    }

    async fn get_summary(&self) -> Result<EarningSummary> {
        Ok(self.state()?.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MockClient {
        MockClient::new(SessionStore::in_memory())
    }

    fn demo_credentials() -> LoginCredentials {
        LoginCredentials {
            email: "Demo@Captain.app".to_string(),
            password: DEMO_PASSWORD.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let store = SessionStore::in_memory();
        let client = MockClient::new(store.clone());

        let response = client.login(&demo_credentials()).await.unwrap();
        assert_eq!(response.token.as_deref(), Some(MOCK_TOKEN));
        assert_eq!(response.captain.unwrap().id, "cap_001");
        assert_eq!(store.token().unwrap().as_deref(), Some(MOCK_TOKEN));
    }

    #[test]
    fn test_summary_is_available_without_login() {
        let summary = tokio_test::block_on(client().get_summary()).unwrap();
        assert!((summary.today - 400.0).abs() < f64::EPSILON);
        assert!((summary.total - 55000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let client = client();
        let err = client
            .login(&LoginCredentials {
                email: DEMO_EMAIL.to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_profile_requires_token() {
        let store = SessionStore::in_memory();
        store.set_token("stale.token").unwrap();
        let client = MockClient::new(store);
        assert!(client.get_profile().await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_full_trip_lifecycle() {
        let client = client();

        let pending = client.get_pending_requests().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "trip_001");

        let accepted = client.accept_trip("trip_001").await.unwrap();
        assert_eq!(accepted.status, TripStatus::Accepted);
        assert!(client.get_pending_requests().await.unwrap().is_empty());

        let started = client.start_trip("trip_001").await.unwrap();
        assert_eq!(started.status, TripStatus::InProgress);
        assert!(started.started_at.is_some());

        assert!(client.end_trip("trip_001", "12a4").await.is_err());
        let ended = client.end_trip("trip_001", "1234").await.unwrap().unwrap();
        assert_eq!(ended.status, TripStatus::Completed);
        assert!(client.get_active_trip().await.unwrap().is_none());

        let earnings = client.get_earnings(DateRange::all()).await.unwrap();
        assert_eq!(earnings.len(), 3);
        let summary = client.get_summary().await.unwrap();
        assert!((summary.today - 580.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_reject_unknown_trip() {
        let client = client();
        let err = client.reject_trip("trip_999", "Too far").await.unwrap_err();
        assert_eq!(err.user_message("Failed to reject trip"), "Trip not found");

        client.reject_trip("trip_001", "Too far").await.unwrap();
        assert!(client.get_pending_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_requires_trip_in_progress() {
        let client = client();
        client.accept_trip("trip_001").await.unwrap();
        assert!(client.cancel_trip("trip_001", "Vehicle issue").await.is_err());

        client.start_trip("trip_001").await.unwrap();
        client.cancel_trip("trip_001", "Vehicle issue").await.unwrap();
        assert!(client.get_active_trip().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_otp() {
        let store = SessionStore::in_memory();
        let client = MockClient::new(store.clone());
        let wrong = OtpVerification {
            phone: "9876543210".to_string(),
            otp: "000000".to_string(),
        };
        assert!(client.verify_otp(&wrong).await.is_err());
        assert!(store.token().unwrap().is_none());

        let right = OtpVerification {
            otp: MOCK_SIGNUP_OTP.to_string(),
            ..wrong
        };
        client.verify_otp(&right).await.unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some(MOCK_TOKEN));
    }

    #[tokio::test]
    async fn test_earnings_filtered_by_range() {
        let client = client();
        let tomorrow = Utc::now().date_naive().succ_opt();
        let range = DateRange {
            start: tomorrow,
            end: None,
        };
        assert!(client.get_earnings(range).await.unwrap().is_empty());
    }
}
