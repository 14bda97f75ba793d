//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and the worker
//! task that owns the session. Commands run one at a time, in order.

use tokio::sync::mpsc;

use crate::auth::Session;
use crate::error::GENERIC_ERROR_MESSAGE;
use crate::models::{
    Captain, DateRange, Earning, EarningSummary, LoginCredentials, OtpVerification, SignupData,
    Trip,
};
use crate::navigation;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Resume a persisted session
    Restore,
    /// Sign in
    Login(LoginCredentials),
    /// Register a new captain
    Signup(SignupData),
    /// Confirm the signup code
    VerifyOtp(OtpVerification),
    /// Send the signup code again
    ResendOtp { phone: String },
    /// Sign out
    Logout,
    /// Fetch pending requests and the active trip
    FetchTrips { seq: u64 },
    /// Accept a pending request
    AcceptTrip { trip_id: String },
    /// Reject a pending request
    RejectTrip { trip_id: String, reason: String },
    /// Start the accepted trip and navigate to pickup
    StartTrip { trip_id: String },
    /// End the trip with the customer's code
    EndTrip { trip_id: String, otp: String },
    /// Cancel the trip in progress
    CancelTrip { trip_id: String, reason: String },
    /// Fetch summary and earnings list
    FetchEarnings,
    /// Re-fetch the profile
    RefreshProfile,
    /// Go online/offline; `previous` is restored on failure
    SetAvailability { available: bool, previous: bool },
    /// Change home city
    UpdateCity { city: String },
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// Session restore finished
    Restored { captain: Option<Captain> },
    /// Login or verification succeeded
    LoggedIn { captain: Captain },
    /// Signup accepted; a code was sent to `phone`
    SignedUp { phone: String, message: Option<String> },
    /// Signup code re-sent
    OtpResent,
    /// Session ended
    LoggedOut,
    /// Trip fetch finished
    TripsFetched {
        seq: u64,
        pending: Vec<Trip>,
        active: Option<Trip>,
    },
    /// Request accepted
    TripAccepted { trip: Trip },
    /// Request rejected
    TripRejected { trip_id: String },
    /// Trip started
    TripStarted { trip: Trip },
    /// Trip completed
    TripEnded { trip_id: String },
    /// Trip cancelled
    TripCancelled { trip_id: String },
    /// Earnings loaded
    EarningsFetched {
        summary: EarningSummary,
        earnings: Vec<Earning>,
    },
    /// Profile re-fetched or changed
    ProfileUpdated { captain: Option<Captain> },
    /// Availability change failed; switch back to `previous`
    AvailabilityFailed { previous: bool },
    /// A user action failed
    Error { message: String },
    /// Status message (background progress or failures)
    Status { message: String },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker(session: Session) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);

    tokio::spawn(async move {
        let mut session = session;
        while let Some(cmd) = cmd_rx.recv().await {
            if matches!(cmd, AsyncCommand::Shutdown) {
                break;
            }
            let result = execute(&mut session, cmd).await;
            if result_tx.send(result).await.is_err() {
                break;
            }
        }
        tracing::debug!("Async worker stopped");
    });

    AsyncHandle { cmd_tx, result_rx }
}

fn failure(e: &crate::error::CaptainError, fallback: &str) -> AsyncResult {
    tracing::warn!("{}: {}", fallback, e);
    AsyncResult::Error {
        message: e.user_message(fallback),
    }
}

/// Run one command against the session
pub async fn execute(session: &mut Session, cmd: AsyncCommand) -> AsyncResult {
    match cmd {
        AsyncCommand::Restore => AsyncResult::Restored {
            captain: session.restore().await.cloned(),
        },
        AsyncCommand::Login(credentials) => match session.login(&credentials).await {
            Ok(captain) => AsyncResult::LoggedIn {
                captain: captain.clone(),
            },
            Err(e) => failure(&e, "Login failed"),
        },
        AsyncCommand::Signup(data) => match session.signup(&data).await {
            Ok(response) => AsyncResult::SignedUp {
                phone: data.phone.trim().to_string(),
                message: response.message,
            },
            Err(e) => failure(&e, GENERIC_ERROR_MESSAGE),
        },
        AsyncCommand::VerifyOtp(verification) => match session.verify_otp(&verification).await {
            Ok(captain) => AsyncResult::LoggedIn {
                captain: captain.clone(),
            },
            Err(e) => failure(&e, "Invalid OTP. Please try again."),
        },
        AsyncCommand::ResendOtp { phone } => match session.resend_otp(&phone).await {
            Ok(_) => AsyncResult::OtpResent,
            Err(e) => failure(&e, "Failed to resend OTP"),
        },
        AsyncCommand::Logout => {
            session.logout().await;
            AsyncResult::LoggedOut
        }
        AsyncCommand::FetchTrips { seq } => {
            let client = session.client();
            let (pending, active) =
                tokio::join!(client.get_pending_requests(), client.get_active_trip());
            match (pending, active) {
                (Ok(pending), Ok(active)) => AsyncResult::TripsFetched {
                    seq,
                    pending,
                    active,
                },
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("Trip refresh failed: {}", e);
                    AsyncResult::Status {
                        message: "Could not refresh trips".to_string(),
                    }
                }
            }
        }
        AsyncCommand::AcceptTrip { trip_id } => {
            match session.client().accept_trip(&trip_id).await {
                Ok(trip) => AsyncResult::TripAccepted { trip },
                Err(e) => failure(&e, "Failed to accept trip"),
            }
        }
        AsyncCommand::RejectTrip { trip_id, reason } => {
            match session.client().reject_trip(&trip_id, &reason).await {
                Ok(()) => AsyncResult::TripRejected { trip_id },
                Err(e) => failure(&e, "Failed to reject trip"),
            }
        }
        AsyncCommand::StartTrip { trip_id } => match session.client().start_trip(&trip_id).await {
            Ok(trip) => {
                if let Err(e) = navigation::open_maps(trip.pickup()) {
                    tracing::warn!("Could not open maps: {:#}", e);
                }
                AsyncResult::TripStarted { trip }
            }
            Err(e) => failure(&e, "Failed to start trip"),
        },
        AsyncCommand::EndTrip { trip_id, otp } => {
            match session.client().end_trip(&trip_id, &otp).await {
                Ok(_) => AsyncResult::TripEnded { trip_id },
                Err(e) => failure(&e, "Invalid OTP"),
            }
        }
        AsyncCommand::CancelTrip { trip_id, reason } => {
            match session.client().cancel_trip(&trip_id, &reason).await {
                Ok(()) => AsyncResult::TripCancelled { trip_id },
                Err(e) => failure(&e, "Failed to cancel trip"),
            }
        }
        AsyncCommand::FetchEarnings => {
            let client = session.client();
            let (summary, earnings) =
                tokio::join!(client.get_summary(), client.get_earnings(DateRange::all()));
            match (summary, earnings) {
                (Ok(summary), Ok(earnings)) => AsyncResult::EarningsFetched { summary, earnings },
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("Earnings fetch failed: {}", e);
                    AsyncResult::Status {
                        message: "Could not load earnings".to_string(),
                    }
                }
            }
        }
        AsyncCommand::RefreshProfile => AsyncResult::ProfileUpdated {
            captain: session.refresh_profile().await.cloned(),
        },
        AsyncCommand::SetAvailability {
            available,
            previous,
        } => match session.update_availability(available).await {
            Ok(captain) => AsyncResult::ProfileUpdated {
                captain: captain.cloned(),
            },
            Err(e) => {
                tracing::warn!("Availability update failed: {}", e);
                AsyncResult::AvailabilityFailed { previous }
            }
        },
        AsyncCommand::UpdateCity { city } => match session.update_city(&city).await {
            Ok(captain) => AsyncResult::ProfileUpdated {
                captain: captain.cloned(),
            },
            Err(e) => failure(&e, "Failed to update city"),
        },
        AsyncCommand::Shutdown => AsyncResult::Status {
            message: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Client;
    use crate::api::mock::{DEMO_EMAIL, DEMO_PASSWORD, MockClient};
    use crate::storage::SessionStore;

    fn session() -> Session {
        let store = SessionStore::in_memory();
        Session::new(Client::Mock(MockClient::new(store.clone())), store)
    }

    fn login() -> AsyncCommand {
        AsyncCommand::Login(LoginCredentials {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
        })
    }

    #[tokio::test]
    async fn test_worker_runs_commands_in_order() {
        let mut handle = spawn_worker(session());
        handle.cmd_tx.send(login()).await.unwrap();
        handle
            .cmd_tx
            .send(AsyncCommand::FetchTrips { seq: 1 })
            .await
            .unwrap();

        let first = handle.result_rx.recv().await.unwrap();
        assert!(matches!(first, AsyncResult::LoggedIn { .. }));
        match handle.result_rx.recv().await.unwrap() {
            AsyncResult::TripsFetched {
                seq,
                pending,
                active,
            } => {
                assert_eq!(seq, 1);
                assert_eq!(pending.len(), 1);
                assert!(active.is_none());
            }
            other => panic!("unexpected result: {other:?}"),
        }

        handle.cmd_tx.send(AsyncCommand::Shutdown).await.unwrap();
        assert!(handle.result_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_accept_uses_server_message() {
        let mut session = session();
        let result = execute(
            &mut session,
            AsyncCommand::AcceptTrip {
                trip_id: "trip_404".to_string(),
            },
        )
        .await;
        match result {
            AsyncResult::Error { message } => assert_eq!(message, "Trip not found"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_end_trip_reports_commanded_id() {
        let mut session = session();
        execute(&mut session, login()).await;
        session.client().accept_trip("trip_001").await.unwrap();
        session.client().start_trip("trip_001").await.unwrap();

        let result = execute(
            &mut session,
            AsyncCommand::EndTrip {
                trip_id: "trip_001".to_string(),
                otp: "1234".to_string(),
            },
        )
        .await;
        match result {
            AsyncResult::TripEnded { trip_id } => assert_eq!(trip_id, "trip_001"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_availability_failure_reports_previous() {
        // Not logged in, so the mock rejects the update
        let mut session = session();
        let result = execute(
            &mut session,
            AsyncCommand::SetAvailability {
                available: false,
                previous: true,
            },
        )
        .await;
        assert!(matches!(
            result,
            AsyncResult::AvailabilityFailed { previous: true }
        ));
    }

    #[tokio::test]
    async fn test_earnings_fetch() {
        let mut session = session();
        match execute(&mut session, AsyncCommand::FetchEarnings).await {
            AsyncResult::EarningsFetched { summary, earnings } => {
                assert!((summary.week - 2800.0).abs() < f64::EPSILON);
                assert_eq!(earnings.len(), 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signup_moves_to_verification() {
        let mut session = session();
        let data = SignupData {
            phone: " 9876543210 ".to_string(),
            ..SignupData::default()
        };
        match execute(&mut session, AsyncCommand::Signup(data)).await {
            AsyncResult::SignedUp { phone, .. } => assert_eq!(phone, "9876543210"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
