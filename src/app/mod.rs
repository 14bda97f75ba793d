//! TUI Application module

mod async_ops;
mod events;
mod forms;
mod state;
mod trips;
mod ui;

pub use state::{AppState, Screen};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

use crate::api::Client;
use crate::auth::Session;
use crate::config::Config;
use crate::storage::SessionStore;

use async_ops::{AsyncCommand, AsyncHandle, AsyncResult, spawn_worker};
use state::{AlertKind, Mode};

/// Run the TUI application
pub fn run(config: Config) -> Result<()> {
    // Create tokio runtime
    let rt = Runtime::new()?;

    // Mock runs never touch the on-disk session
    let store = if config.use_mock_api {
        SessionStore::in_memory()
    } else {
        SessionStore::open_default()?
    };
    let client = Client::from_config(&config, store.clone())?;
    let mock = client.is_mock();
    let session = Session::new(client, store);

    // Spawn async worker
    let async_handle = rt.block_on(async { spawn_worker(session) });

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut state = AppState::new(config, mock);
    state.restoring = true;
    state.set_status("Checking session...");
    let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Restore);

    // Main loop
    let result = run_app(&mut terminal, &mut state, async_handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
) -> Result<()> {
    let poll_interval = state.config.poll_interval();
    let mut last_poll = Instant::now();

    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            for cmd in handle_async_result(state, result) {
                let _ = async_handle.cmd_tx.blocking_send(cmd);
            }
        }

        // Draw UI
        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && let Some(cmd) = events::handle_key(state, key)
        {
            let _ = async_handle.cmd_tx.blocking_send(cmd);
        }

        // Poll for new requests while signed in
        if let Some(interval) = poll_interval
            && state.is_authenticated()
            && last_poll.elapsed() >= interval
        {
            last_poll = Instant::now();
            let cmd = state.refresh_trips();
            let _ = async_handle.cmd_tx.try_send(cmd);
        }

        // Tick for animations
        state.tick();

        if state.should_quit {
            // Shutdown async worker
            let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Shutdown);
            break;
        }
    }

    // Save config on exit
    state.config.save()?;

    Ok(())
}

/// Apply a worker result to the state, returning follow-up commands
fn handle_async_result(state: &mut AppState, result: AsyncResult) -> Vec<AsyncCommand> {
    match result {
        AsyncResult::Restored { captain } => match captain {
            Some(captain) => state.sign_in(captain),
            None => {
                state.sign_out();
                state.set_status("Sign in to continue");
                Vec::new()
            }
        },
        AsyncResult::LoggedIn { captain } => {
            state.busy = false;
            state.sign_in(captain)
        }
        AsyncResult::SignedUp { phone, message } => {
            state.busy = false;
            state.verify = Some(forms::VerifyOtpForm::new(phone.clone()));
            state.screen = Screen::VerifyOtp;
            state.show_alert(
                AlertKind::Info,
                "Verify Phone",
                message.unwrap_or_else(|| format!("OTP sent to {phone}")),
            );
            Vec::new()
        }
        AsyncResult::OtpResent => {
            state.busy = false;
            if let Some(verify) = state.verify.as_mut() {
                verify.otp.clear();
            }
            state.alert_success("OTP has been resent to your phone");
            Vec::new()
        }
        AsyncResult::LoggedOut => {
            state.busy = false;
            state.sign_out();
            state.set_status("Signed out");
            Vec::new()
        }
        AsyncResult::TripsFetched {
            seq,
            pending,
            active,
        } => {
            if state.is_authenticated() && state.trips.reconcile(seq, pending, active) {
                state.set_status(format!(
                    "{} pending request(s)",
                    state.trips.pending().len()
                ));
            }
            Vec::new()
        }
        AsyncResult::TripAccepted { trip } => {
            state.busy = false;
            state.trips.accepted(trip);
            state.alert_success("Trip accepted successfully");
            Vec::new()
        }
        AsyncResult::TripRejected { trip_id } => {
            state.busy = false;
            state.trips.rejected(&trip_id);
            state.alert_success("Trip rejected");
            Vec::new()
        }
        AsyncResult::TripStarted { trip } => {
            state.busy = false;
            state.trips.started(trip);
            state.set_status("Trip started. Navigating to pickup");
            Vec::new()
        }
        AsyncResult::TripEnded { trip_id } => {
            state.busy = false;
            state.trips.finished(&trip_id);
            state.earnings_stale = true;
            state.alert_success("Trip completed successfully");
            vec![state.refresh_trips()]
        }
        AsyncResult::TripCancelled { trip_id } => {
            state.busy = false;
            state.trips.finished(&trip_id);
            state.alert_success("Trip cancelled");
            vec![state.refresh_trips()]
        }
        AsyncResult::EarningsFetched {
            summary,
            mut earnings,
        } => {
            earnings.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
            state.summary = Some(summary);
            state.earnings = earnings;
            Vec::new()
        }
        AsyncResult::ProfileUpdated { captain } => {
            if let Some(captain) = captain
                && state.is_authenticated()
            {
                state.captain = Some(captain);
                if state.mode == Mode::Normal && state.screen == Screen::Profile {
                    state.set_status("Profile updated");
                }
            }
            Vec::new()
        }
        AsyncResult::AvailabilityFailed { previous } => {
            if let Some(captain) = state.captain.as_mut() {
                captain.is_available = previous;
            }
            state.alert_error("Failed to update availability");
            Vec::new()
        }
        AsyncResult::Error { message } => {
            state.busy = false;
            state.alert_error(message);
            Vec::new()
        }
        AsyncResult::Status { message } => {
            state.set_status(message);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TripStatus, sample_captain, sample_trip};

    fn signed_in() -> (AppState, u64) {
        let mut state = AppState::new(Config::default(), true);
        let commands = state.sign_in(sample_captain());
        let seq = match commands.as_slice() {
            [AsyncCommand::FetchTrips { seq }] => *seq,
            other => panic!("unexpected commands: {other:?}"),
        };
        (state, seq)
    }

    #[test]
    fn test_accept_moves_request_to_active() {
        let (mut state, seq) = signed_in();
        handle_async_result(
            &mut state,
            AsyncResult::TripsFetched {
                seq,
                pending: vec![sample_trip("trip_001", TripStatus::Pending)],
                active: None,
            },
        );
        assert_eq!(state.trips.pending().len(), 1);

        state.busy = true;
        handle_async_result(
            &mut state,
            AsyncResult::TripAccepted {
                trip: sample_trip("trip_001", TripStatus::Accepted),
            },
        );
        assert!(!state.busy);
        assert!(state.trips.pending().is_empty());
        assert_eq!(state.trips.active().unwrap().status, TripStatus::Accepted);
        let alert = state.alert.as_ref().unwrap();
        assert_eq!(alert.kind, AlertKind::Success);
        assert_eq!(alert.message, "Trip accepted successfully");
    }

    #[test]
    fn test_trip_end_refreshes_and_marks_earnings() {
        let (mut state, seq) = signed_in();
        handle_async_result(
            &mut state,
            AsyncResult::TripsFetched {
                seq,
                pending: Vec::new(),
                active: Some(sample_trip("trip_001", TripStatus::InProgress)),
            },
        );
        state.earnings_stale = false;

        let follow_up = handle_async_result(
            &mut state,
            AsyncResult::TripEnded {
                trip_id: "trip_001".to_string(),
            },
        );
        assert!(matches!(follow_up.as_slice(), [AsyncCommand::FetchTrips { .. }]));
        assert!(state.trips.active().is_none());
        assert!(state.earnings_stale);
    }

    #[test]
    fn test_restore_without_session_shows_login() {
        let mut state = AppState::new(Config::default(), true);
        state.restoring = true;
        let follow_up = handle_async_result(&mut state, AsyncResult::Restored { captain: None });
        assert!(follow_up.is_empty());
        assert!(!state.restoring);
        assert_eq!(state.screen, Screen::Login);
    }

    #[test]
    fn test_availability_failure_reverts() {
        let (mut state, _) = signed_in();
        state.captain.as_mut().unwrap().is_available = false;
        handle_async_result(&mut state, AsyncResult::AvailabilityFailed { previous: true });
        assert!(state.captain.as_ref().unwrap().is_available);
        assert_eq!(
            state.alert.as_ref().map(|a| a.message.as_str()),
            Some("Failed to update availability")
        );
    }

    #[test]
    fn test_signup_opens_verification() {
        let mut state = AppState::new(Config::default(), true);
        state.screen = Screen::Signup;
        handle_async_result(
            &mut state,
            AsyncResult::SignedUp {
                phone: "9876543210".to_string(),
                message: None,
            },
        );
        assert_eq!(state.screen, Screen::VerifyOtp);
        assert_eq!(state.verify.as_ref().unwrap().phone, "9876543210");
        let alert = state.alert.as_ref().unwrap();
        assert_eq!(alert.kind, AlertKind::Info);
        assert_eq!(alert.message, "OTP sent to 9876543210");
    }

    #[test]
    fn test_logout_result_returns_to_login() {
        let (mut state, _) = signed_in();
        handle_async_result(&mut state, AsyncResult::LoggedOut);
        assert!(!state.is_authenticated());
        assert_eq!(state.screen, Screen::Login);
    }

    #[test]
    fn test_background_failure_is_status_only() {
        let (mut state, _) = signed_in();
        handle_async_result(
            &mut state,
            AsyncResult::Status {
                message: "Could not refresh trips".to_string(),
            },
        );
        assert!(state.alert.is_none());
        assert_eq!(state.status, "Could not refresh trips");
    }
}
