//! Application state

use super::async_ops::AsyncCommand;
use super::forms::{LoginForm, OtpInput, SignupForm, TRIP_OTP_LEN, VerifyOtpForm};
use super::trips::TripBoard;
use crate::config::Config;
use crate::models::{Captain, Earning, EarningSummary, EarningsPeriod};
use crate::theme::Theme;

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Email/password sign in
    #[default]
    Login,
    /// New captain registration
    Signup,
    /// Signup code entry
    VerifyOtp,
    /// Active trip and pending requests
    Home,
    /// Earnings summary and history
    Earnings,
    /// Captain profile
    Profile,
}

impl Screen {
    /// Screens reachable once signed in, in tab order
    pub const fn tabs() -> &'static [Self] {
        &[Self::Home, Self::Earnings, Self::Profile]
    }

    /// Tab title
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::Signup => "Sign Up",
            Self::VerifyOtp => "Verify",
            Self::Home => "Home",
            Self::Earnings => "Earnings",
            Self::Profile => "Profile",
        }
    }

    /// Whether the screen needs a signed-in captain
    pub const fn requires_auth(&self) -> bool {
        matches!(self, Self::Home | Self::Earnings | Self::Profile)
    }

    fn tab_step(&self, forward: bool) -> Self {
        let tabs = Self::tabs();
        let Some(idx) = tabs.iter().position(|s| s == self) else {
            return *self;
        };
        let next = if forward {
            (idx + 1) % tabs.len()
        } else {
            (idx + tabs.len() - 1) % tabs.len()
        };
        tabs[next]
    }
}

/// Current input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Screen keys
    #[default]
    Normal,
    /// Keyboard shortcuts popup
    Help,
    /// Theme selector
    ThemePicker,
    /// Reason entry for rejecting a request
    Reject,
    /// Reason entry for cancelling a trip
    Cancel,
    /// Customer code entry to end a trip
    EndTrip,
    /// City entry on the profile screen
    EditCity,
    /// Logout confirmation
    ConfirmLogout,
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Operation succeeded
    Success,
    /// Operation failed or input was rejected
    Error,
    /// Neutral notice
    Info,
}

/// Modal message the captain dismisses with Enter or Esc
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Severity
    pub kind: AlertKind,
    /// Title line
    pub title: String,
    /// Body text
    pub message: String,
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Whether the backend is the offline mock
    pub mock: bool,
    /// Whether to quit
    pub should_quit: bool,
    /// Current theme
    pub theme: Theme,
    /// Current screen
    pub screen: Screen,
    /// Current input mode
    pub mode: Mode,

    /// Stored session still being checked
    pub restoring: bool,
    /// Signed-in captain
    pub captain: Option<Captain>,

    /// Home screen trips
    pub trips: TripBoard,
    /// Trip targeted by the open dialog
    pub dialog_trip: Option<String>,
    /// Reason typed in the reject/cancel dialog
    pub reason_input: String,
    /// Code typed in the end-trip dialog
    pub trip_otp: OtpInput,

    /// Earnings summary, once loaded
    pub summary: Option<EarningSummary>,
    /// Earnings history
    pub earnings: Vec<Earning>,
    /// Highlighted summary period
    pub period: EarningsPeriod,
    /// Earnings need a fetch on next visit
    pub earnings_stale: bool,

    /// City typed in the edit dialog
    pub city_input: String,

    /// Login form
    pub login: LoginForm,
    /// Signup form
    pub signup: SignupForm,
    /// Verification form, after a successful signup
    pub verify: Option<VerifyOtpForm>,

    /// Modal alert
    pub alert: Option<Alert>,
    /// Status message (bottom bar)
    pub status: String,
    /// A user action is waiting on the backend
    pub busy: bool,
    /// Selected index in theme picker
    pub theme_picker_index: usize,

    /// Tick counter for animations
    tick: u64,
}

impl AppState {
    /// Create a new app state
    pub fn new(config: Config, mock: bool) -> Self {
        let theme = config.theme;
        Self {
            config,
            mock,
            should_quit: false,
            theme,
            screen: Screen::Login,
            mode: Mode::Normal,
            restoring: false,
            captain: None,
            trips: TripBoard::new(),
            dialog_trip: None,
            reason_input: String::new(),
            trip_otp: OtpInput::new(TRIP_OTP_LEN),
            summary: None,
            earnings: Vec::new(),
            period: EarningsPeriod::default(),
            earnings_stale: true,
            city_input: String::new(),
            login: LoginForm::default(),
            signup: SignupForm::default(),
            verify: None,
            alert: None,
            status: String::new(),
            busy: false,
            theme_picker_index: 0,
            tick: 0,
        }
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Get current tick
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Whether a captain is signed in
    pub const fn is_authenticated(&self) -> bool {
        self.captain.is_some()
    }

    /// Show a success alert
    pub fn alert_success(&mut self, message: impl Into<String>) {
        self.show_alert(AlertKind::Success, "Success", message);
    }

    /// Show an error alert
    pub fn alert_error(&mut self, message: impl Into<String>) {
        self.show_alert(AlertKind::Error, "Error", message);
    }

    /// Show an alert
    pub fn show_alert(&mut self, kind: AlertKind, title: &str, message: impl Into<String>) {
        self.alert = Some(Alert {
            kind,
            title: title.to_string(),
            message: message.into(),
        });
    }

    /// Open the theme picker on the current theme
    pub fn open_theme_picker(&mut self) {
        self.theme_picker_index = Theme::all()
            .iter()
            .position(|t| *t == self.theme.inner())
            .unwrap_or(0);
        self.mode = Mode::ThemePicker;
    }

    /// Step the picker and show that theme live
    pub fn preview_theme(&mut self, forward: bool) {
        let themes = Theme::all();
        let len = themes.len().max(1);
        self.theme_picker_index = if forward {
            (self.theme_picker_index + 1) % len
        } else {
            self.theme_picker_index.checked_sub(1).unwrap_or(len - 1)
        };
        if let Some(name) = themes.get(self.theme_picker_index) {
            self.theme = Theme::from(*name);
        }
    }

    /// Leave the picker, keeping the previewed theme or going back to the saved one
    pub fn close_theme_picker(&mut self, keep: bool) {
        if keep {
            self.config.theme = self.theme;
            self.set_status(format!("✓ Theme set to {}", self.theme.name()));
        } else {
            self.theme = self.config.theme;
        }
        self.mode = Mode::Normal;
    }

    /// Next signed-in tab
    pub fn next_screen(&mut self) {
        self.screen = self.screen.tab_step(true);
    }

    /// Previous signed-in tab
    pub fn prev_screen(&mut self) {
        self.screen = self.screen.tab_step(false);
    }

    /// Command fetching pending and active trips
    pub fn refresh_trips(&mut self) -> AsyncCommand {
        AsyncCommand::FetchTrips {
            seq: self.trips.next_fetch(),
        }
    }

    /// Adopt a signed-in captain and load the home screen
    pub fn sign_in(&mut self, captain: Captain) -> Vec<AsyncCommand> {
        self.set_status(format!("Welcome, {}", captain.first_name()));
        self.captain = Some(captain);
        self.restoring = false;
        self.screen = Screen::Home;
        self.mode = Mode::Normal;
        self.login = LoginForm::default();
        self.signup = SignupForm::default();
        self.verify = None;
        self.earnings_stale = true;
        vec![self.refresh_trips()]
    }

    /// Drop everything tied to the captain
    pub fn sign_out(&mut self) {
        self.captain = None;
        self.restoring = false;
        self.trips.clear();
        self.summary = None;
        self.earnings.clear();
        self.earnings_stale = true;
        self.dialog_trip = None;
        self.screen = Screen::Login;
        self.mode = Mode::Normal;
    }

    /// Open a dialog targeting `trip_id`
    pub fn open_trip_dialog(&mut self, mode: Mode, trip_id: String) {
        self.dialog_trip = Some(trip_id);
        self.reason_input.clear();
        self.trip_otp.clear();
        self.mode = mode;
    }

    /// Close the open dialog
    pub fn close_dialog(&mut self) {
        self.dialog_trip = None;
        self.mode = Mode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_captain;

    #[test]
    fn test_tabs_cycle_only_when_signed_in() {
        let mut state = AppState::new(Config::default(), true);
        state.next_screen();
        assert_eq!(state.screen, Screen::Login);

        state.screen = Screen::Home;
        state.next_screen();
        assert_eq!(state.screen, Screen::Earnings);
        state.prev_screen();
        state.prev_screen();
        assert_eq!(state.screen, Screen::Profile);
    }

    #[test]
    fn test_theme_preview_and_cancel() {
        let mut state = AppState::new(Config::default(), true);
        let saved = state.theme;
        state.open_theme_picker();
        assert_eq!(state.mode, Mode::ThemePicker);

        state.preview_theme(false);
        assert_ne!(state.theme, saved);

        state.close_theme_picker(false);
        assert_eq!(state.theme, saved);
        assert_eq!(state.mode, Mode::Normal);

        state.open_theme_picker();
        state.preview_theme(true);
        let picked = state.theme;
        state.close_theme_picker(true);
        assert_eq!(state.config.theme, picked);
        assert!(state.status.contains(picked.name()));
    }

    #[test]
    fn test_sign_in_and_out() {
        let mut state = AppState::new(Config::default(), true);
        let commands = state.sign_in(sample_captain());
        assert!(matches!(
            commands.as_slice(),
            [AsyncCommand::FetchTrips { seq: 1 }]
        ));
        assert!(state.is_authenticated());
        assert_eq!(state.screen, Screen::Home);
        assert_eq!(state.status, "Welcome, Demo");

        state.sign_out();
        assert!(!state.is_authenticated());
        assert_eq!(state.screen, Screen::Login);
        assert!(state.summary.is_none());
    }
}
