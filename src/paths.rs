//! Common paths for Captain data storage
//!
//! All Captain data is stored under ~/.config/captain/ on all platforms:
//! - config.toml - User configuration
//! - session.enc - Encrypted session (auth token and cached profile)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the Captain data directory (~/.config/captain/)
pub fn captain_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let captain_dir = home.join(".config").join("captain");
    fs::create_dir_all(&captain_dir).context("Failed to create captain directory")?;
    Ok(captain_dir)
}

/// Get the config file path (~/.config/captain/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(captain_dir()?.join("config.toml"))
}

/// Get the session file path (~/.config/captain/session.enc)
pub fn session_path() -> Result<PathBuf> {
    Ok(captain_dir()?.join("session.enc"))
}
