//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use super::forms::{LoginField, OtpInput, SignupField};
use super::state::{AlertKind, AppState, Mode, Screen};
use crate::api::mock::{DEMO_EMAIL, DEMO_PASSWORD};
use crate::format::{
    format_currency, format_date, format_distance, format_rating, relative_time, truncate,
};
use crate::models::{EarningsPeriod, Trip, TripAction, TripStatus};
use crate::theme::{Theme, ThemeColors};

/// Spinner animation frames
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function
pub fn render(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();

    // Set background
    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let (content_area, status_area) = (chunks[0], chunks[1]);

    if state.restoring {
        render_splash(frame, state, content_area);
    } else if state.screen.requires_auth() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(content_area);
        render_tabs(frame, state, chunks[0]);
        match state.screen {
            Screen::Home => render_home(frame, state, chunks[1]),
            Screen::Earnings => render_earnings(frame, state, chunks[1]),
            _ => render_profile(frame, state, chunks[1]),
        }
    } else {
        match state.screen {
            Screen::Signup => render_signup(frame, state, content_area),
            Screen::VerifyOtp => render_verify(frame, state, content_area),
            _ => render_login(frame, state, content_area),
        }
    }

    render_status_bar(frame, state, status_area);

    // Render modal dialogs
    match state.mode {
        Mode::Help => render_help_popup(frame, state),
        Mode::ThemePicker => render_theme_picker(frame, state),
        Mode::Reject | Mode::Cancel => render_reason_dialog(frame, state),
        Mode::EndTrip => render_end_trip_dialog(frame, state),
        Mode::EditCity => render_city_dialog(frame, state),
        Mode::ConfirmLogout => render_logout_dialog(frame, state),
        Mode::Normal => {}
    }

    if state.alert.is_some() {
        render_alert(frame, state);
    }
}

fn spinner(state: &AppState) -> &'static str {
    SPINNER[(state.current_tick() / 2) as usize % SPINNER.len()]
}

fn render_splash(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let mut lines: Vec<Line> = crate::LOGO
        .lines()
        .map(|l| Line::from(Span::styled(l, colors.logo())))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(spinner(state), colors.text_primary()),
        Span::styled(" Checking your session...", colors.text_muted()),
    ]));

    let height = lines.len() as u16;
    let top = area.y + area.height.saturating_sub(height) / 2;
    let splash_area = Rect {
        y: top,
        height: height.min(area.height),
        ..area
    };
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        splash_area,
    );
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let titles: Vec<Line> = Screen::tabs()
        .iter()
        .enumerate()
        .map(|(i, screen)| {
            let marker = if *screen == state.screen { "●" } else { "○" };
            Line::from(format!("{marker} {} {}", i + 1, screen.title()))
        })
        .collect();

    let selected = Screen::tabs()
        .iter()
        .position(|s| *s == state.screen)
        .unwrap_or(0);

    let mut title = vec![Span::styled(" 🚚 Captain ", colors.logo())];
    if state.mock {
        title.push(Span::styled(" MOCK ", colors.status_badge(TripStatus::Pending)));
        title.push(Span::raw(" "));
    }

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(Line::from(title)),
        )
        .select(selected)
        .style(colors.tab())
        .highlight_style(colors.tab_active())
        .divider(Span::styled(" │ ", colors.text_muted()));

    frame.render_widget(tabs, area);
}

// ==================== Home ====================

fn render_home(frame: &mut Frame, state: &AppState, area: Rect) {
    let active_height = if state.trips.active().is_some() { 9 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(active_height),
            Constraint::Min(0),
        ])
        .split(area);

    render_greeting(frame, state, chunks[0]);
    render_active_trip(frame, state, chunks[1]);
    render_pending(frame, state, chunks[2]);
}

fn render_greeting(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let Some(captain) = state.captain.as_ref() else {
        return;
    };

    let availability = if captain.is_available {
        Span::styled("● Online", colors.text_success())
    } else {
        Span::styled("○ Offline", colors.text_muted())
    };

    let line = Line::from(vec![
        Span::styled(format!(" Hello, {}  ", captain.first_name()), colors.text()),
        Span::styled(captain.service_line(), colors.text_muted()),
        Span::raw("  "),
        availability,
    ]);

    let greeting = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.block()),
    );
    frame.render_widget(greeting, area);
}

fn render_active_trip(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let Some(trip) = state.trips.active() else {
        let empty = Paragraph::new(Line::from(Span::styled(
            " No active trip",
            colors.text_muted(),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(" Active Trip "),
        );
        frame.render_widget(empty, area);
        return;
    };

    let mut title = vec![Span::styled(" Active Trip ", colors.text_primary())];
    if trip.status == TripStatus::InProgress {
        let bright = (state.current_tick() / 10) % 2 == 0;
        title.push(Span::styled(" LIVE ", colors.live_badge(bright)));
        title.push(Span::raw(" "));
    }

    let width = area.width.saturating_sub(16) as usize;
    let mut lines = vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled(format!(" {} ", trip.status), colors.status_badge(trip.status)),
            Span::styled(format!("  {}  ", trip.service_label()), colors.text()),
            Span::styled(format_currency(trip.fare()), colors.money()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Pickup   ", colors.text_muted()),
            Span::styled(truncate(&trip.pickup_location, width), colors.text()),
        ]),
        Line::from(vec![
            Span::styled("  Dropoff  ", colors.text_muted()),
            Span::styled(truncate(&trip.dropoff_location, width), colors.text()),
        ]),
        Line::from(vec![
            Span::styled("  Distance ", colors.text_muted()),
            Span::styled(format_distance(trip.distance), colors.text()),
        ]),
        Line::from(""),
    ];

    let mut hints = action_hints(&colors, trip.status);
    if trip.status == TripStatus::InProgress {
        hints.push(Span::styled("n", colors.key_hint()));
        hints.push(Span::styled(" navigate  ", colors.text_muted()));
    }
    lines.push(Line::from(hints));

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors.status_color(trip.status)))
            .title(Line::from(title)),
    );
    frame.render_widget(card, area);
}

fn action_hints(colors: &ThemeColors, status: TripStatus) -> Vec<Span<'static>> {
    let mut hints = vec![Span::raw("  ")];
    for action in status.actions() {
        hints.push(Span::styled(action.key().to_string(), colors.key_hint()));
        hints.push(Span::styled(format!(" {}  ", action.label()), colors.text_muted()));
    }
    hints
}

fn render_pending(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let pending = state.trips.pending();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .title(format!(" Pending Requests ({}) ", pending.len()))
        .title_bottom(Line::from(action_hints(&colors, TripStatus::Pending)));

    if pending.is_empty() {
        let message = if !state.trips.is_loaded() {
            format!("{} Loading requests...", spinner(state))
        } else if state.captain.as_ref().is_some_and(|c| !c.is_available) {
            "You are offline. Go online from the Profile tab to get requests.".to_string()
        } else {
            "No pending requests right now".to_string()
        };
        let empty = Paragraph::new(Line::from(Span::styled(message, colors.text_muted())))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = pending
        .iter()
        .map(|trip| pending_item(&colors, trip, width))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(colors.selected())
        .highlight_symbol("▸ ");
    let mut list_state = ListState::default().with_selected(Some(state.trips.selected_index()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn pending_item<'a>(colors: &ThemeColors, trip: &'a Trip, width: usize) -> ListItem<'a> {
    let route = format!("{} → {}", trip.pickup_location, trip.dropoff_location);
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(trip.service_label(), colors.text_primary()),
            Span::raw("  "),
            Span::styled(format_currency(trip.estimated_fare), colors.money()),
            Span::styled(
                format!("  {}  {}", format_distance(trip.distance), relative_time(trip.created_at)),
                colors.text_muted(),
            ),
        ]),
        Line::from(Span::styled(truncate(&route, width), colors.text())),
        Line::from(""),
    ])
}

// ==================== Earnings ====================

fn render_earnings(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let Some(summary) = state.summary else {
        let loading = Paragraph::new(Line::from(Span::styled(
            format!("{} Loading earnings...", spinner(state)),
            colors.text_muted(),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block()),
        );
        frame.render_widget(loading, area);
        return;
    };

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[0]);

    let figures = [
        ("Today", summary.today, false),
        (
            EarningsPeriod::Week.label(),
            summary.for_period(EarningsPeriod::Week),
            state.period == EarningsPeriod::Week,
        ),
        (
            EarningsPeriod::Month.label(),
            summary.for_period(EarningsPeriod::Month),
            state.period == EarningsPeriod::Month,
        ),
        ("Total", summary.total, false),
    ];

    for ((label, amount, highlighted), card_area) in figures.into_iter().zip(cards.iter()) {
        let border = if highlighted {
            colors.block_focus()
        } else {
            colors.block()
        };
        let card = Paragraph::new(vec![
            Line::from(Span::styled(label, colors.text_muted())),
            Line::from(Span::styled(format_currency(amount), colors.money())),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border),
        );
        frame.render_widget(card, *card_area);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block())
        .title(format!(" Earnings History ({}) ", state.earnings.len()))
        .title_bottom(Line::from(vec![
            Span::styled(" p", colors.key_hint()),
            Span::styled(" week/month  ", colors.text_muted()),
            Span::styled("r", colors.key_hint()),
            Span::styled(" refresh ", colors.text_muted()),
        ]));

    if state.earnings.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No earnings yet. Completed trips show up here.",
            colors.text_muted(),
        )))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = state
        .earnings
        .iter()
        .map(|earning| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<12}", format_date(earning.date)), colors.text()),
                Span::styled(format!("{:<14}", earning.trip_id), colors.text_muted()),
                Span::styled(format_currency(earning.amount), colors.money()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), chunks[1]);
}

// ==================== Profile ====================

fn render_profile(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let Some(captain) = state.captain.as_ref() else {
        return;
    };

    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {label:<16}"), colors.text_muted()),
            Span::styled(value, colors.text()),
        ])
    };

    let availability = if captain.is_available {
        Span::styled("● Online", colors.text_success())
    } else {
        Span::styled("○ Offline", colors.text_warning())
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {}", captain.full_name), colors.text_primary().add_modifier(Modifier::BOLD)),
            Span::styled(format!("   ★ {}", format_rating(captain.rating)), colors.text_warning()),
        ]),
        Line::from(Span::styled(format!("  {}", captain.service_line()), colors.text_muted())),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {:<16}", "Availability"), colors.text_muted()),
            availability,
        ]),
        field("Phone", captain.phone.clone()),
        field("Email", captain.email.clone()),
        field(
            "City",
            captain.city.clone().unwrap_or_else(|| "Not set".to_string()),
        ),
        field("Vehicle", captain.vehicle_type.name().to_string()),
    ];
    if let Some(subtype) = captain.vehicle_subtype {
        lines.push(field("Model", subtype.label().to_string()));
    }
    lines.push(field("Total Trips", captain.total_trips.to_string()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Services",
        colors.text_primary().add_modifier(Modifier::BOLD),
    )));
    let services = captain.service_categories();
    if services.is_empty() {
        lines.push(Line::from(Span::styled("  None for this vehicle", colors.text_muted())));
    }
    for service in services {
        lines.push(Line::from(Span::styled(format!("  • {service}"), colors.text())));
    }

    let profile = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(" Profile ")
                .title_bottom(Line::from(vec![
                    Span::styled(" o", colors.key_hint()),
                    Span::styled(" online/offline  ", colors.text_muted()),
                    Span::styled("c", colors.key_hint()),
                    Span::styled(" edit city  ", colors.text_muted()),
                    Span::styled("r", colors.key_hint()),
                    Span::styled(" refresh  ", colors.text_muted()),
                    Span::styled("l", colors.key_hint()),
                    Span::styled(" logout ", colors.text_muted()),
                ])),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(profile, area);
}

// ==================== Auth screens ====================

fn input_line<'a>(colors: &ThemeColors, label: &str, value: String, focused: bool) -> Line<'a> {
    let (marker, label_style) = if focused {
        ("▸ ", colors.text_primary())
    } else {
        ("  ", colors.text_muted())
    };
    let mut spans = vec![
        Span::styled(marker, colors.text_primary()),
        Span::styled(format!("{label:<18}"), label_style),
        Span::styled(value, colors.text()),
    ];
    if focused {
        spans.push(Span::styled("▏", colors.text_primary()));
    }
    Line::from(spans)
}

fn otp_line<'a>(colors: &ThemeColors, otp: &OtpInput) -> Line<'a> {
    let digits: Vec<char> = otp.value().chars().collect();
    let mut spans = vec![Span::raw("  ")];
    for i in 0..otp.max_len() {
        let (text, style) = digits.get(i).map_or_else(
            || ("[ _ ]".to_string(), colors.text_muted()),
            |d| (format!("[ {d} ]"), colors.text_primary().add_modifier(Modifier::BOLD)),
        );
        spans.push(Span::styled(text, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn form_block<'a>(colors: &ThemeColors, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .style(Style::default().bg(colors.bg))
        .title(title)
        .title_style(colors.text_primary())
}

fn render_login(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let form = &state.login;

    let mut lines: Vec<Line> = crate::LOGO
        .lines()
        .map(|l| Line::from(Span::styled(format!("  {l}"), colors.logo())))
        .collect();
    lines.push(Line::from(Span::styled("  Captain sign in", colors.text_muted())));
    lines.push(Line::from(""));
    lines.push(input_line(
        &colors,
        "Email",
        form.email.clone(),
        form.focus == LoginField::Email,
    ));
    lines.push(input_line(
        &colors,
        "Password",
        "•".repeat(form.password.chars().count()),
        form.focus == LoginField::Password,
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Enter", colors.key_hint()),
        Span::styled(" sign in  ", colors.text_muted()),
        Span::styled("Tab", colors.key_hint()),
        Span::styled(" next field  ", colors.text_muted()),
        Span::styled("Ctrl+N", colors.key_hint()),
        Span::styled(" sign up  ", colors.text_muted()),
        Span::styled("Esc", colors.key_hint()),
        Span::styled(" quit", colors.text_muted()),
    ]));
    if state.mock {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Demo account: {DEMO_EMAIL} / {DEMO_PASSWORD}"),
            colors.text_warning(),
        )));
    }

    let popup_area = centered_rect(70, 80, area);
    let login = Paragraph::new(lines).block(form_block(&colors, " Sign In "));
    frame.render_widget(login, popup_area);
}

fn render_signup(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let form = &state.signup;

    let mut lines = vec![Line::from("")];
    for field in SignupField::all() {
        let focused = *field == form.focus;
        let value = form.display_value(*field);
        let line = if field.is_choice() && focused {
            Line::from(vec![
                Span::styled("▸ ", colors.text_primary()),
                Span::styled(format!("{:<18}", field.label()), colors.text_primary()),
                Span::styled(format!("◂ {value} ▸"), colors.text()),
            ])
        } else {
            input_line(&colors, field.label(), value, focused)
        };
        lines.push(line);
        if let Some(error) = form.error(*field) {
            lines.push(Line::from(Span::styled(
                format!("    {error}"),
                colors.text_error(),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  ↑↓/Tab", colors.key_hint()),
        Span::styled(" field  ", colors.text_muted()),
        Span::styled("←→", colors.key_hint()),
        Span::styled(" choose  ", colors.text_muted()),
        Span::styled("Enter", colors.key_hint()),
        Span::styled(" create account  ", colors.text_muted()),
        Span::styled("Esc", colors.key_hint()),
        Span::styled(" back", colors.text_muted()),
    ]));

    let popup_area = centered_rect(70, 90, area);
    let signup = Paragraph::new(lines).block(form_block(&colors, " Create Captain Account "));
    frame.render_widget(signup, popup_area);
}

fn render_verify(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let Some(form) = state.verify.as_ref() else {
        return;
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter the code sent to ", colors.text_muted()),
            Span::styled(form.phone.clone(), colors.text_primary()),
        ]),
        Line::from(""),
        otp_line(&colors, &form.otp),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", colors.key_hint()),
            Span::styled(" verify  ", colors.text_muted()),
            Span::styled("Ctrl+R", colors.key_hint()),
            Span::styled(" resend code  ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" back", colors.text_muted()),
        ]),
    ];

    let popup_area = centered_rect(60, 40, area);
    let verify = Paragraph::new(lines).block(form_block(&colors, " Verify Phone "));
    frame.render_widget(verify, popup_area);
}

// ==================== Dialogs ====================

fn dialog_trip<'a>(state: &'a AppState) -> Option<&'a Trip> {
    let id = state.dialog_trip.as_deref()?;
    state
        .trips
        .active()
        .filter(|t| t.id == id)
        .or_else(|| state.trips.pending().iter().find(|t| t.id == id))
}

fn trip_summary_line<'a>(colors: &ThemeColors, trip: Option<&Trip>) -> Line<'a> {
    trip.map_or_else(
        || Line::from(""),
        |trip| {
            Line::from(vec![
                Span::styled(format!("  {} → {}  ", trip.pickup_location, trip.dropoff_location), colors.text()),
                Span::styled(format_currency(trip.fare()), colors.money()),
            ])
        },
    )
}

fn render_reason_dialog(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, popup_area);

    let (title, action) = if state.mode == Mode::Reject {
        (" Reject Trip ", TripAction::Reject)
    } else {
        (" Cancel Trip ", TripAction::Cancel)
    };

    let lines = vec![
        Line::from(""),
        trip_summary_line(&colors, dialog_trip(state)),
        Line::from(""),
        input_line(&colors, "Reason", state.reason_input.clone(), true),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", colors.key_hint()),
            Span::styled(format!(" {}  ", action.label().to_lowercase()), colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" back", colors.text_muted()),
        ]),
    ];

    let dialog = Paragraph::new(lines)
        .block(form_block(&colors, title))
        .wrap(Wrap { trim: false });
    frame.render_widget(dialog, popup_area);
}

fn render_end_trip_dialog(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        trip_summary_line(&colors, dialog_trip(state)),
        Line::from(""),
        Line::from(Span::styled("  Ask the customer for their OTP", colors.text_muted())),
        otp_line(&colors, &state.trip_otp),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", colors.key_hint()),
            Span::styled(" complete trip  ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" back", colors.text_muted()),
        ]),
    ];

    let dialog = Paragraph::new(lines).block(form_block(&colors, " End Trip "));
    frame.render_widget(dialog, popup_area);
}

fn render_city_dialog(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        input_line(&colors, "City", state.city_input.clone(), true),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter", colors.key_hint()),
            Span::styled(" save  ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" cancel", colors.text_muted()),
        ]),
    ];

    let dialog = Paragraph::new(lines).block(form_block(&colors, " Edit City "));
    frame.render_widget(dialog, popup_area);
}

fn render_logout_dialog(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Are you sure you want to logout?", colors.text())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [Y] ", colors.text_error().add_modifier(Modifier::BOLD)),
            Span::styled("Logout", colors.text()),
            Span::raw("    "),
            Span::styled(" [N/Esc] ", colors.text_muted()),
            Span::styled("Cancel", colors.text()),
        ]),
    ];

    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(form_block(&colors, " Logout "));
    frame.render_widget(dialog, popup_area);
}

fn render_alert(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let Some(alert) = state.alert.as_ref() else {
        return;
    };

    let popup_area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, popup_area);

    let (icon, color) = match alert.kind {
        AlertKind::Success => ("✓", colors.success),
        AlertKind::Error => ("✗", colors.error),
        AlertKind::Info => ("ℹ", colors.info),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(alert.message.clone(), colors.text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", colors.key_hint()),
            Span::styled(" OK", colors.text_muted()),
        ]),
    ];

    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(colors.bg_secondary))
                .title(format!(" {icon} {} ", alert.title))
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );
    frame.render_widget(dialog, popup_area);
}

// ==================== Chrome ====================

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let loading_indicator = if state.busy || state.restoring {
        format!("{} ", spinner(state))
    } else {
        String::new()
    };

    let content = if !state.status.is_empty() {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_primary()),
            Span::styled(state.status.as_str(), colors.text_muted()),
        ]
    } else if state.screen.requires_auth() {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled("Tab", colors.key_hint()),
            Span::styled(": screens  ", colors.text_muted()),
            Span::styled("r", colors.key_hint()),
            Span::styled(": refresh  ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(": help  ", colors.text_muted()),
            Span::styled("t", colors.key_hint()),
            Span::styled(": theme  ", colors.text_muted()),
            Span::styled("q", colors.key_hint()),
            Span::styled(": quit", colors.text_muted()),
        ]
    } else {
        vec![Span::styled(format!(" Captain v{}", crate::VERSION), colors.text_muted())]
    };

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(status, area);
}

fn help_section<'a>(colors: &ThemeColors, title: &'a str) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        colors.text_primary().add_modifier(Modifier::BOLD),
    ))
}

fn help_row<'a>(colors: &ThemeColors, keys: &'a str, what: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {keys:<17}"), colors.key_hint()),
        Span::styled(what, colors.text()),
    ])
}

fn render_help_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(50, 70, area);

    // First render a solid background block to cover everything underneath
    let bg_block = Block::default().style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let help_content = vec![
        Line::from(""),
        help_section(&colors, "Navigation"),
        help_row(&colors, "Tab / Shift+Tab", "Next / previous screen"),
        help_row(&colors, "1 2 3", "Home, Earnings, Profile"),
        help_row(&colors, "j/k  ↑/↓", "Select request"),
        help_row(&colors, "r", "Refresh"),
        Line::from(""),
        help_section(&colors, "Trips"),
        help_row(&colors, "a", "Accept request"),
        help_row(&colors, "x", "Reject request"),
        help_row(&colors, "s", "Start trip and open maps to pickup"),
        help_row(&colors, "e", "End trip with customer OTP"),
        help_row(&colors, "c", "Cancel trip"),
        help_row(&colors, "n", "Navigate to dropoff"),
        Line::from(""),
        help_section(&colors, "Earnings & Profile"),
        help_row(&colors, "p", "Highlight week or month"),
        help_row(&colors, "o / Space", "Go online or offline"),
        help_row(&colors, "c", "Edit city (profile)"),
        help_row(&colors, "l", "Logout"),
        Line::from(""),
        help_section(&colors, "General"),
        help_row(&colors, "t", "Select theme"),
        help_row(&colors, "?", "Toggle this help"),
        help_row(&colors, "q", "Quit application"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" or ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(" to close", colors.text_muted()),
        ]),
    ];

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block_focus())
                .style(Style::default().bg(colors.bg_secondary))
                .title(" ⌨ Keyboard Shortcuts ")
                .title_style(colors.text_primary()),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}

fn render_theme_picker(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(50, 70, area);

    // First render a solid background block to cover everything underneath
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let themes = Theme::all();
    let items: Vec<ListItem> = themes
        .iter()
        .enumerate()
        .map(|(i, theme_name)| {
            let palette = theme_name.palette();
            let selected = i == state.theme_picker_index;

            let preview = format!(
                "  {} {} ",
                if selected { "▸" } else { " " },
                theme_name.display_name()
            );

            let style = if selected {
                Style::default()
                    .fg(palette.accent)
                    .bg(palette.selection)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg).bg(colors.bg)
            };

            ListItem::new(Line::from(vec![
                Span::styled(preview, style),
                Span::styled("█", Style::default().fg(palette.accent).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.secondary).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.success).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.warning).bg(colors.bg)),
            ]))
        })
        .collect();

    let theme_list = List::new(items)
        .style(Style::default().bg(colors.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.primary))
                .border_type(BorderType::Rounded)
                .style(Style::default().bg(colors.bg))
                .title(format!(
                    " 🎨 Select Theme ({}/{}) ",
                    state.theme_picker_index + 1,
                    themes.len()
                ))
                .title_bottom(Line::from(" ↑↓ navigate │ ↵ apply │ Esc cancel ").centered()),
        );

    frame.render_widget(theme_list, popup_area);
}

/// Helper function to create a centered rect
const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{EarningSummary, sample_captain, sample_trip};
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn test_home_shows_active_and_pending() {
        let mut state = AppState::new(Config::default(), true);
        state.sign_in(sample_captain());
        let seq = state.trips.next_fetch();
        state.trips.reconcile(
            seq,
            vec![sample_trip("trip_002", TripStatus::Pending)],
            Some(sample_trip("trip_001", TripStatus::InProgress)),
        );

        let screen = draw(&state);
        assert!(screen.contains("Active Trip"));
        assert!(screen.contains("In Progress"));
        assert!(screen.contains("Pending Requests (1)"));
        assert!(screen.contains("MOCK"));
    }

    #[test]
    fn test_earnings_screen_formats_amounts() {
        let mut state = AppState::new(Config::default(), false);
        state.sign_in(sample_captain());
        state.screen = Screen::Earnings;
        state.summary = Some(EarningSummary {
            today: 400.0,
            week: 2800.0,
            month: 12000.0,
            total: 155_000.0,
        });

        let screen = draw(&state);
        assert!(screen.contains("₹2,800.00"));
        assert!(screen.contains("₹1,55,000.00"));
        assert!(screen.contains("No earnings yet"));
    }

    #[test]
    fn test_login_shows_demo_hint_in_mock_mode() {
        let state = AppState::new(Config::default(), true);
        let screen = draw(&state);
        assert!(screen.contains("Sign In"));
        assert!(screen.contains(DEMO_EMAIL));
    }

    #[test]
    fn test_alert_rendered_on_top() {
        let mut state = AppState::new(Config::default(), true);
        state.alert_error("Invalid credentials");
        let screen = draw(&state);
        assert!(screen.contains("Invalid credentials"));
    }
}
