//! API access layer for the Captain backend

pub mod http;
pub mod mock;

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    AuthResponse, Captain, DateRange, Earning, EarningSummary, LoginCredentials, MessageResponse,
    OtpVerification, ProfileUpdate, SignupPayload, Trip,
};
use crate::storage::SessionStore;

/// One async method per remote operation
#[allow(async_fn_in_trait)]
pub trait CaptainApi {
    /// Log in with email and password
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse>;

    /// Register a new captain; an OTP is sent to the phone
    async fn signup(&self, payload: &SignupPayload) -> Result<MessageResponse>;

    /// Confirm the signup OTP
    async fn verify_otp(&self, verification: &OtpVerification) -> Result<AuthResponse>;

    /// Ask for a new signup OTP
    async fn resend_otp(&self, phone: &str) -> Result<MessageResponse>;

    /// End the session on the backend
    async fn logout(&self) -> Result<()>;

    /// Fetch the current captain
    async fn get_profile(&self) -> Result<Captain>;

    /// Update profile fields
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Captain>;

    /// Go online or offline
    async fn update_availability(&self, is_available: bool) -> Result<()>;

    /// Requests waiting for a captain
    async fn get_pending_requests(&self) -> Result<Vec<Trip>>;

    /// The captain's current trip, if any
    async fn get_active_trip(&self) -> Result<Option<Trip>>;

    /// Take a pending request
    async fn accept_trip(&self, trip_id: &str) -> Result<Trip>;

    /// Decline a pending request
    async fn reject_trip(&self, trip_id: &str, reason: &str) -> Result<()>;

    /// Begin an accepted trip
    async fn start_trip(&self, trip_id: &str) -> Result<Trip>;

    /// Complete a trip with the customer's OTP; the server may answer without the trip
    async fn end_trip(&self, trip_id: &str, otp: &str) -> Result<Option<Trip>>;

    /// Abort an in-progress trip
    async fn cancel_trip(&self, trip_id: &str, reason: &str) -> Result<()>;

    /// Earnings records, optionally bounded by date
    async fn get_earnings(&self, range: DateRange) -> Result<Vec<Earning>>;

    /// Today/week/month/total aggregates
    async fn get_summary(&self) -> Result<EarningSummary>;
}

/// Unified client that wraps the HTTP and mock backends
pub enum Client {
    /// Real backend over HTTP
    Http(http::HttpClient),
    /// Local fixed data
    Mock(mock::MockClient),
}

impl Client {
    /// Build the backend selected by `config`
    pub fn from_config(config: &Config, store: SessionStore) -> Result<Self> {
        if config.use_mock_api {
            tracing::info!("Using mock API");
            Ok(Self::Mock(mock::MockClient::new(store)))
        } else {
            let client =
                http::HttpClient::new(&config.api_base_url, config.request_timeout(), store)?;
            Ok(Self::Http(client))
        }
    }

    /// Whether this client serves mock data
    pub const fn is_mock(&self) -> bool {
        matches!(self, Self::Mock(_))
    }

    /// Log in with email and password
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        match self {
            Self::Http(c) => c.login(credentials).await,
            Self::Mock(c) => c.login(credentials).await,
        }
    }

    /// Register a new captain
    pub async fn signup(&self, payload: &SignupPayload) -> Result<MessageResponse> {
        match self {
            Self::Http(c) => c.signup(payload).await,
            Self::Mock(c) => c.signup(payload).await,
        }
    }

    /// Confirm the signup OTP
    pub async fn verify_otp(&self, verification: &OtpVerification) -> Result<AuthResponse> {
        match self {
            Self::Http(c) => c.verify_otp(verification).await,
            Self::Mock(c) => c.verify_otp(verification).await,
        }
    }

    /// Ask for a new signup OTP
    pub async fn resend_otp(&self, phone: &str) -> Result<MessageResponse> {
        match self {
            Self::Http(c) => c.resend_otp(phone).await,
            Self::Mock(c) => c.resend_otp(phone).await,
        }
    }

    /// End the session on the backend
    pub async fn logout(&self) -> Result<()> {
        match self {
            Self::Http(c) => c.logout().await,
            Self::Mock(c) => c.logout().await,
        }
    }

    /// Fetch the current captain
    pub async fn get_profile(&self) -> Result<Captain> {
        match self {
            Self::Http(c) => c.get_profile().await,
            Self::Mock(c) => c.get_profile().await,
        }
    }

    /// Update profile fields
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Captain> {
        match self {
            Self::Http(c) => c.update_profile(update).await,
            Self::Mock(c) => c.update_profile(update).await,
        }
    }

    /// Go online or offline
    pub async fn update_availability(&self, is_available: bool) -> Result<()> {
        match self {
            Self::Http(c) => c.update_availability(is_available).await,
            Self::Mock(c) => c.update_availability(is_available).await,
        }
    }

    /// Requests waiting for a captain
    pub async fn get_pending_requests(&self) -> Result<Vec<Trip>> {
        match self {
            Self::Http(c) => c.get_pending_requests().await,
            Self::Mock(c) => c.get_pending_requests().await,
        }
    }

    /// The captain's current trip, if any
    pub async fn get_active_trip(&self) -> Result<Option<Trip>> {
        match self {
            Self::Http(c) => c.get_active_trip().await,
            Self::Mock(c) => c.get_active_trip().await,
        }
    }

    /// Take a pending request
    pub async fn accept_trip(&self, trip_id: &str) -> Result<Trip> {
        match self {
            Self::Http(c) => c.accept_trip(trip_id).await,
            Self::Mock(c) => c.accept_trip(trip_id).await,
        }
    }

    /// Decline a pending request
    pub async fn reject_trip(&self, trip_id: &str, reason: &str) -> Result<()> {
        match self {
            Self::Http(c) => c.reject_trip(trip_id, reason).await,
            Self::Mock(c) => c.reject_trip(trip_id, reason).await,
        }
    }

    /// Begin an accepted trip
    pub async fn start_trip(&self, trip_id: &str) -> Result<Trip> {
        match self {
            Self::Http(c) => c.start_trip(trip_id).await,
            Self::Mock(c) => c.start_trip(trip_id).await,
        }
    }

    /// Complete a trip with the customer's OTP
    pub async fn end_trip(&self, trip_id: &str, otp: &str) -> Result<Option<Trip>> {
        match self {
            Self::Http(c) => c.end_trip(trip_id, otp).await,
            Self::Mock(c) => c.end_trip(trip_id, otp).await,
        }
    }

    /// Abort an in-progress trip
    pub async fn cancel_trip(&self, trip_id: &str, reason: &str) -> Result<()> {
        match self {
            Self::Http(c) => c.cancel_trip(trip_id, reason).await,
            Self::Mock(c) => c.cancel_trip(trip_id, reason).await,
        }
    }

    /// Earnings records, optionally bounded by date
    pub async fn get_earnings(&self, range: DateRange) -> Result<Vec<Earning>> {
        match self {
            Self::Http(c) => c.get_earnings(range).await,
            Self::Mock(c) => c.get_earnings(range).await,
        }
    }

    /// Today/week/month/total aggregates
    pub async fn get_summary(&self) -> Result<EarningSummary> {
        match self {
            Self::Http(c) => c.get_summary().await,
            Self::Mock(c) => c.get_summary().await,
        }
    }
}

/// Persist the token of a successful login or verification
fn persist_token(store: &SessionStore, response: &AuthResponse) -> Result<()> {
    if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) {
        store.set_token(token)?;
        tracing::debug!("Stored auth token");
    }
    Ok(())
}
