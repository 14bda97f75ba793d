//! Event handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::forms::{LoginField, validate_reason};
use super::state::{AppState, Mode, Screen};
use crate::models::{EarningsPeriod, Trip, TripAction, TripStatus};
use crate::navigation;

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return None;
    }

    // An alert swallows input until dismissed
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            state.alert = None;
        }
        return None;
    }

    match state.mode {
        Mode::ThemePicker => {
            handle_theme_picker_key(state, key);
            return None;
        }
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::Reject | Mode::Cancel => return handle_reason_key(state, key),
        Mode::EndTrip => return handle_end_trip_key(state, key),
        Mode::EditCity => return handle_city_key(state, key),
        Mode::ConfirmLogout => return handle_logout_key(state, key),
        Mode::Normal => {}
    }

    if state.restoring {
        if key.code == KeyCode::Char('q') {
            state.should_quit = true;
        }
        return None;
    }

    match state.screen {
        Screen::Login => handle_login_key(state, key),
        Screen::Signup => handle_signup_key(state, key),
        Screen::VerifyOtp => handle_verify_key(state, key),
        Screen::Home | Screen::Earnings | Screen::Profile => handle_main_key(state, key),
    }
}

// ==================== Auth screens ====================

fn handle_login_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
            state.screen = Screen::Signup;
            None
        }
        (_, KeyCode::Esc) => {
            state.should_quit = true;
            None
        }
        (_, KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up) => {
            state.login.toggle_focus();
            None
        }
        (_, KeyCode::Enter) => {
            if state.login.focus == LoginField::Email && state.login.password.is_empty() {
                state.login.toggle_focus();
                return None;
            }
            if state.busy {
                return None;
            }
            match state.login.validate() {
                Ok(credentials) => {
                    state.busy = true;
                    state.set_status("Signing in...");
                    Some(AsyncCommand::Login(credentials))
                }
                Err(e) => {
                    state.alert_error(e.user_message("Please enter email and password"));
                    None
                }
            }
        }
        (_, KeyCode::Backspace) => {
            state.login.pop();
            None
        }
        (_, KeyCode::Char(c)) => {
            state.login.push(c);
            None
        }
        _ => None,
    }
}

fn handle_signup_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    let form = &mut state.signup;
    match key.code {
        KeyCode::Esc => {
            state.screen = Screen::Login;
            None
        }
        KeyCode::Tab | KeyCode::Down => {
            form.next_field();
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.prev_field();
            None
        }
        KeyCode::Left if form.focus.is_choice() => {
            form.cycle_choice(false);
            None
        }
        KeyCode::Right | KeyCode::Char(' ') if form.focus.is_choice() => {
            form.cycle_choice(true);
            None
        }
        KeyCode::Enter => {
            if state.busy {
                return None;
            }
            match form.validate() {
                Some(data) => {
                    state.busy = true;
                    state.set_status("Creating account...");
                    Some(AsyncCommand::Signup(data))
                }
                None => {
                    if let Some((field, _)) = form.errors.first() {
                        form.focus = *field;
                    }
                    None
                }
            }
        }
        KeyCode::Backspace => {
            form.pop();
            None
        }
        KeyCode::Char(c) => {
            form.push(c);
            None
        }
        _ => None,
    }
}

fn handle_verify_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    let Some(form) = state.verify.as_mut() else {
        state.screen = Screen::Login;
        return None;
    };
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
            if state.busy {
                return None;
            }
            let phone = form.phone.clone();
            state.busy = true;
            state.set_status("Resending code...");
            Some(AsyncCommand::ResendOtp { phone })
        }
        (_, KeyCode::Esc) => {
            state.screen = Screen::Signup;
            None
        }
        (_, KeyCode::Enter) => {
            if state.busy {
                return None;
            }
            match form.validate() {
                Ok(verification) => {
                    state.busy = true;
                    state.set_status("Verifying...");
                    Some(AsyncCommand::VerifyOtp(verification))
                }
                Err(e) => {
                    state.alert_error(e.user_message("Invalid OTP"));
                    None
                }
            }
        }
        (_, KeyCode::Backspace) => {
            form.otp.pop();
            None
        }
        (_, KeyCode::Char(c)) => {
            form.otp.push(c);
            None
        }
        _ => None,
    }
}

// ==================== Signed-in screens ====================

fn handle_main_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            return None;
        }
        (_, KeyCode::Char('?') | KeyCode::F(1)) => {
            state.mode = Mode::Help;
            return None;
        }
        (_, KeyCode::Tab) => {
            state.next_screen();
            return entered_screen(state);
        }
        (_, KeyCode::BackTab) => {
            state.prev_screen();
            return entered_screen(state);
        }
        (_, KeyCode::Char('1')) => {
            state.screen = Screen::Home;
            return None;
        }
        (_, KeyCode::Char('2')) => {
            state.screen = Screen::Earnings;
            return entered_screen(state);
        }
        (_, KeyCode::Char('3')) => {
            state.screen = Screen::Profile;
            return None;
        }
        (_, KeyCode::Char('t')) => {
            state.open_theme_picker();
            return None;
        }
        _ => {}
    }

    match state.screen {
        Screen::Home => handle_home_key(state, key),
        Screen::Earnings => handle_earnings_key(state, key),
        Screen::Profile => handle_profile_key(state, key),
        Screen::Login | Screen::Signup | Screen::VerifyOtp => None,
    }
}

/// Load earnings the first time the screen is shown after a change
fn entered_screen(state: &mut AppState) -> Option<AsyncCommand> {
    if state.screen == Screen::Earnings && state.earnings_stale {
        state.earnings_stale = false;
        return Some(AsyncCommand::FetchEarnings);
    }
    None
}

fn handle_home_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.trips.select_next();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.trips.select_prev();
            None
        }
        KeyCode::Char('r') => {
            state.set_status("Refreshing trips...");
            Some(state.refresh_trips())
        }
        KeyCode::Char('n') => {
            let dropoff = state
                .trips
                .active()
                .filter(|t| t.status == TripStatus::InProgress)
                .map(Trip::dropoff);
            if let Some(dropoff) = dropoff {
                match navigation::open_maps(dropoff) {
                    Ok(()) => state.set_status("Navigating to dropoff"),
                    Err(e) => {
                        tracing::warn!("Could not open maps: {:#}", e);
                        state.alert_error("Could not open maps");
                    }
                }
            }
            None
        }
        KeyCode::Char(c) => {
            let action = [
                TripAction::Accept,
                TripAction::Reject,
                TripAction::Start,
                TripAction::End,
                TripAction::Cancel,
            ]
            .into_iter()
            .find(|a| a.key() == c)?;
            request_action(state, action)
        }
        _ => None,
    }
}

fn request_action(state: &mut AppState, action: TripAction) -> Option<AsyncCommand> {
    if state.busy {
        return None;
    }
    let Some(trip_id) = state.trips.target(action).map(|t| t.id.clone()) else {
        state.set_status(format!("{} is not available right now", action.label()));
        return None;
    };

    match action {
        TripAction::Accept => {
            state.busy = true;
            state.trips.mark_dispatch();
            state.set_status("Accepting trip...");
            Some(AsyncCommand::AcceptTrip { trip_id })
        }
        TripAction::Start => {
            state.busy = true;
            state.trips.mark_dispatch();
            state.set_status("Starting trip...");
            Some(AsyncCommand::StartTrip { trip_id })
        }
        TripAction::Reject => {
            state.open_trip_dialog(Mode::Reject, trip_id);
            None
        }
        TripAction::End => {
            state.open_trip_dialog(Mode::EndTrip, trip_id);
            None
        }
        TripAction::Cancel => {
            state.open_trip_dialog(Mode::Cancel, trip_id);
            None
        }
    }
}

fn handle_reason_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.close_dialog();
            None
        }
        KeyCode::Enter => {
            let rejecting = state.mode == Mode::Reject;
            let what = if rejecting { "rejection" } else { "cancellation" };
            let reason = match validate_reason(&state.reason_input, what) {
                Ok(reason) => reason,
                Err(e) => {
                    state.alert_error(e.user_message("Please provide a reason"));
                    return None;
                }
            };
            let trip_id = state.dialog_trip.clone()?;
            state.close_dialog();
            state.busy = true;
            state.trips.mark_dispatch();
            if rejecting {
                state.set_status("Rejecting trip...");
                Some(AsyncCommand::RejectTrip { trip_id, reason })
            } else {
                state.set_status("Cancelling trip...");
                Some(AsyncCommand::CancelTrip { trip_id, reason })
            }
        }
        KeyCode::Backspace => {
            state.reason_input.pop();
            None
        }
        KeyCode::Char(c) => {
            state.reason_input.push(c);
            None
        }
        _ => None,
    }
}

fn handle_end_trip_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.close_dialog();
            None
        }
        KeyCode::Enter => {
            let otp = match state.trip_otp.validate() {
                Ok(otp) => otp,
                Err(e) => {
                    state.alert_error(e.user_message("Please enter a valid 4-digit OTP"));
                    return None;
                }
            };
            let trip_id = state.dialog_trip.clone()?;
            state.close_dialog();
            state.busy = true;
            state.trips.mark_dispatch();
            state.set_status("Completing trip...");
            Some(AsyncCommand::EndTrip { trip_id, otp })
        }
        KeyCode::Backspace => {
            state.trip_otp.pop();
            None
        }
        KeyCode::Char(c) => {
            state.trip_otp.push(c);
            None
        }
        _ => None,
    }
}

fn handle_earnings_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('p') | KeyCode::Char('w') | KeyCode::Char('m') => {
            state.period = match key.code {
                KeyCode::Char('w') => EarningsPeriod::Week,
                KeyCode::Char('m') => EarningsPeriod::Month,
                _ => state.period.toggle(),
            };
            None
        }
        KeyCode::Char('r') => {
            state.earnings_stale = false;
            state.set_status("Refreshing earnings...");
            Some(AsyncCommand::FetchEarnings)
        }
        _ => None,
    }
}

fn handle_profile_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('o') => {
            let captain = state.captain.as_mut()?;
            // Flip now, the worker reports the old value back on failure
            let previous = captain.is_available;
            captain.is_available = !previous;
            Some(AsyncCommand::SetAvailability {
                available: !previous,
                previous,
            })
        }
        KeyCode::Char('c') => {
            state.city_input = state
                .captain
                .as_ref()
                .and_then(|c| c.city.clone())
                .unwrap_or_default();
            state.mode = Mode::EditCity;
            None
        }
        KeyCode::Char('r') => Some(AsyncCommand::RefreshProfile),
        KeyCode::Char('l') => {
            state.mode = Mode::ConfirmLogout;
            None
        }
        _ => None,
    }
}

fn handle_city_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            None
        }
        KeyCode::Enter => {
            let city = state.city_input.trim().to_string();
            if city.is_empty() {
                state.alert_error("City cannot be empty");
                return None;
            }
            state.mode = Mode::Normal;
            state.set_status("Updating city...");
            Some(AsyncCommand::UpdateCity { city })
        }
        KeyCode::Backspace => {
            state.city_input.pop();
            None
        }
        KeyCode::Char(c) => {
            state.city_input.push(c);
            None
        }
        _ => None,
    }
}

fn handle_logout_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            state.mode = Mode::Normal;
            state.busy = true;
            state.set_status("Signing out...");
            Some(AsyncCommand::Logout)
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            None
        }
        _ => None,
    }
}

fn handle_theme_picker_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('t') => state.close_theme_picker(false),
        KeyCode::Enter => state.close_theme_picker(true),
        KeyCode::Down | KeyCode::Char('j') => state.preview_theme(true),
        KeyCode::Up | KeyCode::Char('k') => state.preview_theme(false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{sample_captain, sample_trip};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(state, key(KeyCode::Char(c)));
        }
    }

    fn home_with(pending: &[&str], active: Option<TripStatus>) -> AppState {
        let mut state = AppState::new(Config::default(), true);
        state.sign_in(sample_captain());
        let seq = state.trips.next_fetch();
        let pending = pending
            .iter()
            .map(|id| sample_trip(id, TripStatus::Pending))
            .collect();
        let active = active.map(|status| sample_trip("trip_active", status));
        state.trips.reconcile(seq, pending, active);
        state
    }

    #[test]
    fn test_accept_emits_command() {
        let mut state = home_with(&["trip_001"], None);
        let cmd = handle_key(&mut state, key(KeyCode::Char('a')));
        assert!(matches!(cmd, Some(AsyncCommand::AcceptTrip { ref trip_id }) if trip_id == "trip_001"));
        assert!(state.busy);
    }

    #[test]
    fn test_reject_without_reason_issues_nothing() {
        let mut state = home_with(&["trip_001"], None);
        assert!(handle_key(&mut state, key(KeyCode::Char('x'))).is_none());
        assert_eq!(state.mode, Mode::Reject);

        type_text(&mut state, "   ");
        assert!(handle_key(&mut state, key(KeyCode::Enter)).is_none());
        assert!(state.alert.is_some());
        assert_eq!(state.mode, Mode::Reject);
        assert_eq!(state.trips.pending().len(), 1);
    }

    #[test]
    fn test_reject_with_reason() {
        let mut state = home_with(&["trip_001"], None);
        handle_key(&mut state, key(KeyCode::Char('x')));
        type_text(&mut state, "Too far");
        let cmd = handle_key(&mut state, key(KeyCode::Enter));
        assert!(matches!(
            cmd,
            Some(AsyncCommand::RejectTrip { ref trip_id, ref reason })
                if trip_id == "trip_001" && reason == "Too far"
        ));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_end_trip_needs_four_digits() {
        let mut state = home_with(&[], Some(TripStatus::InProgress));
        handle_key(&mut state, key(KeyCode::Char('e')));
        assert_eq!(state.mode, Mode::EndTrip);

        type_text(&mut state, "1x2");
        assert_eq!(state.trip_otp.value(), "12");
        assert!(handle_key(&mut state, key(KeyCode::Enter)).is_none());
        assert!(state.alert.is_some());

        handle_key(&mut state, key(KeyCode::Esc));
        assert!(state.alert.is_none());
        assert_eq!(state.mode, Mode::EndTrip);

        type_text(&mut state, "345");
        let cmd = handle_key(&mut state, key(KeyCode::Enter));
        assert!(matches!(cmd, Some(AsyncCommand::EndTrip { ref otp, .. }) if otp == "1234"));
    }

    #[test]
    fn test_actions_gated_by_status() {
        let mut state = home_with(&[], Some(TripStatus::Accepted));
        assert!(handle_key(&mut state, key(KeyCode::Char('e'))).is_none());
        assert_eq!(state.mode, Mode::Normal);
        assert!(handle_key(&mut state, key(KeyCode::Char('c'))).is_none());
        assert_eq!(state.mode, Mode::Normal);

        let cmd = handle_key(&mut state, key(KeyCode::Char('s')));
        assert!(matches!(cmd, Some(AsyncCommand::StartTrip { .. })));
    }

    #[test]
    fn test_cancel_requires_reason() {
        let mut state = home_with(&[], Some(TripStatus::InProgress));
        handle_key(&mut state, key(KeyCode::Char('c')));
        assert!(handle_key(&mut state, key(KeyCode::Enter)).is_none());
        handle_key(&mut state, key(KeyCode::Enter));
        type_text(&mut state, "Vehicle issue");
        let cmd = handle_key(&mut state, key(KeyCode::Enter));
        assert!(matches!(cmd, Some(AsyncCommand::CancelTrip { .. })));
    }

    #[test]
    fn test_availability_toggle_is_optimistic() {
        let mut state = home_with(&[], None);
        state.screen = Screen::Profile;
        let cmd = handle_key(&mut state, key(KeyCode::Char(' ')));
        assert!(matches!(
            cmd,
            Some(AsyncCommand::SetAvailability {
                available: false,
                previous: true
            })
        ));
        assert!(!state.captain.as_ref().unwrap().is_available);
    }

    #[test]
    fn test_empty_city_rejected() {
        let mut state = home_with(&[], None);
        state.screen = Screen::Profile;
        handle_key(&mut state, key(KeyCode::Char('c')));
        for _ in 0..10 {
            handle_key(&mut state, key(KeyCode::Backspace));
        }
        assert!(handle_key(&mut state, key(KeyCode::Enter)).is_none());
        assert_eq!(
            state.alert.as_ref().map(|a| a.message.as_str()),
            Some("City cannot be empty")
        );
    }

    #[test]
    fn test_login_submit() {
        let mut state = AppState::new(Config::default(), true);
        type_text(&mut state, "demo@captain.app");
        handle_key(&mut state, key(KeyCode::Tab));
        type_text(&mut state, "password123");
        let cmd = handle_key(&mut state, key(KeyCode::Enter));
        assert!(matches!(cmd, Some(AsyncCommand::Login(_))));
    }

    #[test]
    fn test_earnings_fetched_once_on_entry() {
        let mut state = home_with(&[], None);
        let cmd = handle_key(&mut state, key(KeyCode::Tab));
        assert!(matches!(cmd, Some(AsyncCommand::FetchEarnings)));
        assert_eq!(state.screen, Screen::Earnings);

        handle_key(&mut state, key(KeyCode::Char('1')));
        assert!(handle_key(&mut state, key(KeyCode::Char('2'))).is_none());

        handle_key(&mut state, key(KeyCode::Char('p')));
        assert_eq!(state.period, EarningsPeriod::Month);
    }
}
