//! Captain - terminal client for delivery and ride-hailing captains
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::Write;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use captain::api::mock::{DEMO_EMAIL, DEMO_PASSWORD};
use captain::format::{format_currency, format_date, format_distance, format_rating};
use captain::models::{DateRange, LoginCredentials, Trip};
use captain::{Client, Config, Session, SessionStore};

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, mock) = parse_args(&args)?;

    let mut config = Config::load()?;
    if mock {
        config.use_mock_api = true;
    }

    match command {
        Command::Run => captain::app::run(config),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
        headless => Runtime::new()?.block_on(run_headless(headless, &config)),
    }
}

/// CLI commands
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run,
    Login { email: Option<String> },
    Logout,
    Whoami,
    Trips { watch: bool },
    Earnings { range: DateRange },
    Help,
    Version,
}

/// Parse arguments (without the program name) into a command and the mock flag
fn parse_args(args: &[String]) -> Result<(Command, bool)> {
    let rest: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| *a != "--mock")
        .collect();
    let mock = rest.len() < args.len() || rest.first() == Some(&"demo");

    let Some((first, tail)) = rest.split_first() else {
        return Ok((Command::Run, mock));
    };

    let command = match *first {
        "-h" | "--help" | "help" => Command::Help,
        "-v" | "--version" | "version" => Command::Version,
        "demo" => Command::Run,
        "login" => Command::Login {
            email: tail.first().map(ToString::to_string),
        },
        "logout" => Command::Logout,
        "whoami" => Command::Whoami,
        "trips" => Command::Trips {
            watch: tail.iter().any(|a| *a == "--watch" || *a == "-w"),
        },
        "earnings" => Command::Earnings {
            range: DateRange {
                start: date_flag(tail, "--from")?,
                end: date_flag(tail, "--to")?,
            },
        },
        other => {
            return Err(anyhow::anyhow!(
                "Unknown command: {other}\nRun 'captain --help' for usage"
            ));
        }
    };
    Ok((command, mock))
}

fn date_flag(args: &[&str], flag: &str) -> Result<Option<NaiveDate>> {
    let Some(idx) = args.iter().position(|a| *a == flag) else {
        return Ok(None);
    };
    let value = args
        .get(idx + 1)
        .ok_or_else(|| anyhow::anyhow!("Missing date after {flag}"))?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .with_context(|| format!("Invalid date for {flag}: {value} (expected YYYY-MM-DD)"))
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
🚚 Captain - trips, earnings and profile for delivery captains

USAGE:
    captain                            Launch TUI
    captain [COMMAND] [--mock]

COMMANDS:
    demo                               Launch TUI against the offline mock backend
    login [email]                      Sign in (prompts for anything missing)
    logout                             Sign out and clear the stored session
    whoami                             Show the signed-in captain
    trips [--watch]                    List pending requests and the active trip
    earnings [OPTIONS]                 Show earnings summary and history
      Options:
        --from <YYYY-MM-DD>            First day included
        --to <YYYY-MM-DD>              Last day included

OPTIONS:
    --mock                             Use the offline mock backend
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    Trips
      a / x         Accept / reject request
      s             Start trip (opens maps to pickup)
      e             End trip with customer OTP
      c             Cancel trip
      n             Navigate to dropoff
      r             Refresh

    View
      Tab / 1-3     Switch screen
      t             Change theme
      ?             Help

ENVIRONMENT:
    CAPTAIN_API_URL                    Backend base URL
    CAPTAIN_USE_MOCK                   1/true/yes to use the mock backend
    RUST_LOG                           Log filter (default: warn)

CONFIG:
    {}
"#,
        captain::LOGO,
        config_path
    );
}

fn print_version() {
    println!("captain {}", captain::VERSION);
}

fn open_session(config: &Config) -> Result<Session> {
    let store = if config.use_mock_api {
        SessionStore::in_memory()
    } else {
        SessionStore::open_default()?
    };
    let client = Client::from_config(config, store.clone())?;
    Ok(Session::new(client, store))
}

async fn run_headless(command: Command, config: &Config) -> Result<()> {
    let mut session = open_session(config)?;

    match command {
        Command::Login { email } => login_cli(&mut session, email).await,
        Command::Logout => {
            session.restore().await;
            session.logout().await;
            println!("✓ Signed out");
            Ok(())
        }
        Command::Whoami => {
            require_session(&mut session).await?;
            if let Some(captain) = session.captain() {
                println!("{} ({})", captain.full_name, captain.service_line());
                println!("  Phone:     {}", captain.phone);
                println!("  Email:     {}", captain.email);
                println!("  City:      {}", captain.city.as_deref().unwrap_or("Not set"));
                println!("  Rating:    ★ {}", format_rating(captain.rating));
                println!("  Trips:     {}", captain.total_trips);
                println!(
                    "  Status:    {}",
                    if captain.is_available { "Online" } else { "Offline" }
                );
            }
            Ok(())
        }
        Command::Trips { watch } => {
            require_session(&mut session).await?;
            if watch {
                watch_trips(&session, config).await
            } else {
                print_trips(&session).await
            }
        }
        Command::Earnings { range } => {
            require_session(&mut session).await?;
            earnings_cli(&session, range).await
        }
        Command::Run | Command::Help | Command::Version => Ok(()),
    }
}

/// Resume the stored session; the mock backend signs in as the demo captain
async fn require_session(session: &mut Session) -> Result<()> {
    if session.restore().await.is_some() {
        return Ok(());
    }
    if !session.client().is_mock() {
        return Err(anyhow::anyhow!("Not signed in. Run: captain login"));
    }

    let credentials = LoginCredentials {
        email: DEMO_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
    };
    let captain = session
        .login(&credentials)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Demo login failed")))?;
    tracing::info!("Signed in to the mock backend as {}", captain.id);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn login_cli(session: &mut Session, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = prompt("Password")?;

    let credentials = LoginCredentials {
        email: email.trim().to_string(),
        password,
    };
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(anyhow::anyhow!("Please enter email and password"));
    }

    match session.login(&credentials).await {
        Ok(captain) => {
            println!("✓ Logged in as {}", captain.full_name);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(e.user_message("Login failed"))),
    }
}

fn print_trip(trip: &Trip) {
    println!(
        "  [{}] {} · {} · {} · {}",
        trip.id,
        trip.service_label(),
        trip.status,
        format_currency(trip.fare()),
        format_distance(trip.distance)
    );
    println!("      {} → {}", trip.pickup_location, trip.dropoff_location);
}

async fn print_trips(session: &Session) -> Result<()> {
    let client = session.client();
    let (pending, active) = tokio::join!(client.get_pending_requests(), client.get_active_trip());

    println!("Active trip");
    println!("{}", "─".repeat(60));
    match active? {
        Some(trip) => print_trip(&trip),
        None => println!("  None"),
    }

    let pending = pending?;
    println!("\nPending requests ({})", pending.len());
    println!("{}", "─".repeat(60));
    if pending.is_empty() {
        println!("  None");
    }
    for trip in &pending {
        print_trip(trip);
    }
    Ok(())
}

async fn watch_trips(session: &Session, config: &Config) -> Result<()> {
    let period = config.poll_interval().unwrap_or(Duration::from_secs(10));
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                println!("\n{}", chrono::Local::now().format("%H:%M:%S"));
                if let Err(e) = print_trips(session).await {
                    tracing::warn!("Trip refresh failed: {:#}", e);
                    println!("  Could not refresh trips");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn earnings_cli(session: &Session, range: DateRange) -> Result<()> {
    let client = session.client();
    let (summary, earnings) = tokio::join!(client.get_summary(), client.get_earnings(range));
    let summary = summary?;
    let mut earnings = earnings?;
    earnings.sort_by(|a, b| b.date.cmp(&a.date));

    println!("Today       {}", format_currency(summary.today));
    println!("This Week   {}", format_currency(summary.week));
    println!("This Month  {}", format_currency(summary.month));
    println!("Total       {}", format_currency(summary.total));

    println!("\nHistory ({})", earnings.len());
    println!("{}", "─".repeat(40));
    if earnings.is_empty() {
        println!("  No earnings yet");
    }
    for earning in &earnings {
        println!(
            "  {:<12} {:<12} {}",
            format_date(earning.date),
            earning.trip_id,
            format_currency(earning.amount)
        );
    }
    Ok(())
}
