//! HTTP client for the Captain REST backend

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CaptainError, Result};
use crate::models::{
    AuthResponse, Captain, DateRange, Earning, EarningSummary, LoginCredentials, MessageResponse,
    OtpVerification, ProfileUpdate, SignupPayload, Trip,
};
use crate::storage::SessionStore;

use super::{CaptainApi, persist_token};

/// Endpoint paths relative to the API base URL
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login";
    pub const SIGNUP: &str = "/auth/signup";
    pub const VERIFY_OTP: &str = "/auth/verify-otp";
    pub const RESEND_OTP: &str = "/auth/resend-otp";
    pub const LOGOUT: &str = "/auth/logout";
    pub const CAPTAIN_PROFILE: &str = "/captain/profile";
    pub const CAPTAIN_AVAILABILITY: &str = "/captain/availability";
    pub const PENDING_REQUESTS: &str = "/trips/pending";
    pub const ACTIVE_TRIP: &str = "/trips/active";
    pub const ACCEPT_TRIP: &str = "/trips/accept";
    pub const REJECT_TRIP: &str = "/trips/reject";
    pub const START_TRIP: &str = "/trips/start";
    pub const END_TRIP: &str = "/trips/end";
    pub const CANCEL_TRIP: &str = "/trips/cancel";
    pub const EARNINGS: &str = "/earnings";
    pub const EARNINGS_SUMMARY: &str = "/earnings/summary";
}

/// Captain backend client
pub struct HttpClient {
    client: Client,
    base_url: String,
    store: SessionStore,
}

impl HttpClient {
    /// Create a client for `base_url`; requests give up after `timeout`
    pub fn new(base_url: &str, timeout: Duration, store: SessionStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("captain/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    /// Build API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Attach the stored bearer token, if any
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.token() {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(e) => {
                tracing::warn!("Could not read auth token: {:#}", e);
                request
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        error_for_status(response).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.send(self.client.get(self.api_url(endpoint))).await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.post(self.api_url(endpoint)).json(body);
        decode(self.send(request).await?).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.put(self.api_url(endpoint)).json(body);
        decode(self.send(request).await?).await
    }

    /// POST whose response body is ignored
    async fn post_ack<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<()> {
        self.send(self.client.post(self.api_url(endpoint)).json(body))
            .await?;
        Ok(())
    }
}

impl CaptainApi for HttpClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let response: AuthResponse = self.post(endpoints::LOGIN, credentials).await?;
        persist_token(&self.store, &response)?;
        Ok(response)
    }

    async fn signup(&self, payload: &SignupPayload) -> Result<MessageResponse> {
        self.post(endpoints::SIGNUP, payload).await
    }

    async fn verify_otp(&self, verification: &OtpVerification) -> Result<AuthResponse> {
        let response: AuthResponse = self.post(endpoints::VERIFY_OTP, verification).await?;
        persist_token(&self.store, &response)?;
        Ok(response)
    }

    async fn resend_otp(&self, phone: &str) -> Result<MessageResponse> {
        self.post(endpoints::RESEND_OTP, &PhoneRequest { phone }).await
    }

    async fn logout(&self) -> Result<()> {
        self.post_ack(endpoints::LOGOUT, &serde_json::json!({})).await
    }

    async fn get_profile(&self) -> Result<Captain> {
        self.get(endpoints::CAPTAIN_PROFILE).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Captain> {
        self.put(endpoints::CAPTAIN_PROFILE, update).await
    }

    async fn update_availability(&self, is_available: bool) -> Result<()> {
        let request = self
            .client
            .put(self.api_url(endpoints::CAPTAIN_AVAILABILITY))
            .json(&AvailabilityRequest { is_available });
        self.send(request).await?;
        Ok(())
    }

    async fn get_pending_requests(&self) -> Result<Vec<Trip>> {
        let trips: Option<Vec<Trip>> = self.get(endpoints::PENDING_REQUESTS).await?;
        Ok(trips.unwrap_or_default())
    }

    async fn get_active_trip(&self) -> Result<Option<Trip>> {
        self.get(endpoints::ACTIVE_TRIP).await
    }

    async fn accept_trip(&self, trip_id: &str) -> Result<Trip> {
        self.post(endpoints::ACCEPT_TRIP, &TripRequest::new(trip_id))
            .await
    }

    async fn reject_trip(&self, trip_id: &str, reason: &str) -> Result<()> {
        let body = TripRequest {
            reason: Some(reason),
            ..TripRequest::new(trip_id)
        };
        self.post_ack(endpoints::REJECT_TRIP, &body).await
    }

    async fn start_trip(&self, trip_id: &str) -> Result<Trip> {
        self.post(endpoints::START_TRIP, &TripRequest::new(trip_id))
            .await
    }

    async fn end_trip(&self, trip_id: &str, otp: &str) -> Result<Option<Trip>> {
        let body = TripRequest {
            otp: Some(otp),
            ..TripRequest::new(trip_id)
        };
        let request = self.client.post(self.api_url(endpoints::END_TRIP)).json(&body);
        let text = self.send(request).await?.text().await?;
        Ok(decode_ack(&text))
    }

    async fn cancel_trip(&self, trip_id: &str, reason: &str) -> Result<()> {
        let body = TripRequest {
            reason: Some(reason),
            ..TripRequest::new(trip_id)
        };
        self.post_ack(endpoints::CANCEL_TRIP, &body).await
    }

    async fn get_earnings(&self, range: DateRange) -> Result<Vec<Earning>> {
        let endpoint = format!("{}{}", endpoints::EARNINGS, earnings_query(range));
        let earnings: Option<Vec<Earning>> = self.get(&endpoint).await?;
        Ok(earnings.unwrap_or_default())
    }

    async fn get_summary(&self) -> Result<EarningSummary> {
        self.get(endpoints::EARNINGS_SUMMARY).await
    }
}

// ==================== Wire helpers ====================

#[derive(Debug, Serialize)]
struct PhoneRequest<'a> {
    phone: &'a str,
}

#[derive(Debug, Serialize)]
struct AvailabilityRequest {
    is_available: bool,
}

#[derive(Debug, Serialize)]
struct TripRequest<'a> {
    trip_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    otp: Option<&'a str>,
}

impl<'a> TripRequest<'a> {
    const fn new(trip_id: &'a str) -> Self {
        Self {
            trip_id,
            reason: None,
            otp: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Query string for an earnings request, empty when unbounded
fn earnings_query(range: DateRange) -> String {
    let params: Vec<String> = [("start_date", range.start), ("end_date", range.end)]
        .into_iter()
        .filter_map(|(name, date)| {
            date.map(|d| format!("{name}={}", urlencoding::encode(&d.format("%Y-%m-%d").to_string())))
        })
        .collect();

    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", params.join("&"))
    }
}

/// Server message carried by an error body, if any
fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty())
}

async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("{} {} failed: {}", status, url, body);

    Err(CaptainError::Api {
        status: status.as_u16(),
        message: parse_error_message(&body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    decode_body(&body)
}

/// Parse a JSON body; an empty body reads as `null`
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}

/// Body of a successful call that may or may not echo the record back
fn decode_ack<T: DeserializeOwned>(body: &str) -> Option<T> {
    decode_body::<Option<T>>(body).unwrap_or_else(|e| {
        tracing::debug!("Ignoring acknowledgement body: {}", e);
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_api_url_trims_slash() {
        let client = HttpClient::new(
            "https://api.example.com/v1/",
            Duration::from_secs(5),
            SessionStore::in_memory(),
        )
        .unwrap();
        assert_eq!(
            client.api_url(endpoints::ACTIVE_TRIP),
            "https://api.example.com/v1/trips/active"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            parse_error_message(r#"{"message":"Invalid OTP"}"#).as_deref(),
            Some("Invalid OTP")
        );
        assert_eq!(
            parse_error_message(r#"{"error":"Trip not found"}"#).as_deref(),
            Some("Trip not found")
        );
        assert!(parse_error_message("<html>Bad Gateway</html>").is_none());
        assert!(parse_error_message(r#"{"message":""}"#).is_none());
    }

    #[test]
    fn test_empty_body_is_no_active_trip() {
        let trip: Option<Trip> = decode_body("").unwrap();
        assert!(trip.is_none());
        let trip: Option<Trip> = decode_body("null").unwrap();
        assert!(trip.is_none());
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let result: Result<Vec<Trip>> = decode_body(r#"{"unexpected":true}"#);
        assert!(matches!(result, Err(CaptainError::Decode(_))));
    }

    #[test]
    fn test_end_trip_ack_without_trip() {
        assert!(decode_ack::<Trip>("").is_none());
        assert!(decode_ack::<Trip>("null").is_none());
        assert!(decode_ack::<Trip>(r#"{"message":"Trip completed"}"#).is_none());
    }

    /// Serve one canned response on a local port
    async fn serve_once(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_end_trip_empty_success_body() {
        let base = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        let client =
            HttpClient::new(&base, Duration::from_secs(5), SessionStore::in_memory()).unwrap();
        let ended = client.end_trip("trip_001", "1234").await.unwrap();
        assert!(ended.is_none());
    }

    #[tokio::test]
    async fn test_end_trip_rejected_otp() {
        let base = serve_once(
            "HTTP/1.1 400 Bad Request\r\ncontent-type: application/json\r\ncontent-length: 25\r\nconnection: close\r\n\r\n{\"message\":\"Invalid OTP\"}",
        )
        .await;
        let client =
            HttpClient::new(&base, Duration::from_secs(5), SessionStore::in_memory()).unwrap();
        let err = client.end_trip("trip_001", "0000").await.unwrap_err();
        assert_eq!(err.user_message("Could not end trip"), "Invalid OTP");
    }

    #[test]
    fn test_earnings_query() {
        assert_eq!(earnings_query(DateRange::all()), "");

        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1),
            end: NaiveDate::from_ymd_opt(2025, 1, 31),
        };
        assert_eq!(
            earnings_query(range),
            "?start_date=2025-01-01&end_date=2025-01-31"
        );

        let open_start = DateRange {
            start: None,
            end: NaiveDate::from_ymd_opt(2025, 2, 1),
        };
        assert_eq!(earnings_query(open_start), "?end_date=2025-02-01");
    }

    #[test]
    fn test_trip_request_body() {
        let body = TripRequest {
            otp: Some("1234"),
            ..TripRequest::new("trip_001")
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"trip_id":"trip_001","otp":"1234"}"#
        );
    }
}
