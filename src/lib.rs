//! # Captain 🚚
//!
//! A terminal client for captains (drivers) of a delivery and ride-hailing
//! platform.
//!
//! ## Overview
//!
//! Captain signs a driver in, lists incoming trip requests, walks the active
//! trip through accept, start and end (or cancel), and shows earnings and the
//! driver profile. The backend is the source of truth for every trip
//! transition; this crate only requests them and renders what comes back.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │   Terminal loop, screens, key handling, async worker        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ commands / results
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Session                             │
//! │   Restore, login, signup, OTP, logout, profile updates      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┴───────────────────┐
//!          ▼                                       ▼
//! ┌─────────────────┐                     ┌─────────────────┐
//! │       API       │                     │     Storage     │
//! │                 │                     │                 │
//! │ • HTTP backend  │                     │ • Encrypted     │
//! │ • Mock backend  │                     │   session file  │
//! │ • Unified trait │                     │ • In-memory     │
//! └─────────────────┘                     └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Backend access (HTTP and mock)
//! - [`app`] - TUI application state and event loop
//! - [`auth`] - Session controller
//! - [`config`] - Configuration management
//! - [`error`] - Error type shared by the API layer and the session
//! - [`format`] - Currency, date and distance formatting
//! - [`models`] - Data models (Captain, Trip, Earning)
//! - [`navigation`] - Maps deep links
//! - [`storage`] - Encrypted persisted session
//! - [`theme`] - Theme support via ratatui-themes
//!
//! ## Example
//!
//! ```no_run
//! use captain::{Config, app};
//!
//! fn main() -> anyhow::Result<()> {
//!     app::run(Config::load()?)
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/captain/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::similar_names)]
#![allow(clippy::if_same_then_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::branches_sharing_code)]
#![allow(clippy::wrong_self_convention)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod navigation;
pub mod paths;
pub mod storage;
pub mod theme;

// Re-export main types for convenience
pub use api::{CaptainApi, Client};
pub use app::AppState;
pub use auth::Session;
pub use config::Config;
pub use error::{CaptainError, Result};
pub use models::{Captain, Earning, EarningSummary, Trip, TripStatus};
pub use storage::SessionStore;
pub use theme::{Theme, ThemeColors};

// Re-export theme types from ratatui-themes crate
pub use ratatui_themes::{ThemeName, ThemePalette};

/// ASCII logo for the application
pub const LOGO: &str = r"  ___            _        _
 / __|__ _ _ __| |_ __ _(_)_ _
| (__/ _` | '_ \  _/ _` | | ' \
 \___\__,_| .__/\__\__,_|_|_||_|
          |_|";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
