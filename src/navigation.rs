//! Deep links into the platform maps application

use anyhow::{Context, Result};

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Coordinates {
    /// Create a coordinate pair
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Maps URL for the current platform
pub fn maps_url(to: Coordinates) -> String {
    if cfg!(any(target_os = "macos", target_os = "ios")) {
        format!("maps:?q={to}")
    } else if cfg!(target_os = "android") {
        format!("geo:{to}")
    } else {
        format!("https://www.google.com/maps/search/?api=1&query={to}")
    }
}

/// Open the maps application pointed at `to`
pub fn open_maps(to: Coordinates) -> Result<()> {
    let url = maps_url(to);
    tracing::debug!("Opening maps at {}", url);
    open::that(&url).with_context(|| format!("Failed to open maps: {url}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Coordinates::new(19.1197, 72.8468).to_string(), "19.1197,72.8468");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_web_fallback_on_linux() {
        assert_eq!(
            maps_url(Coordinates::new(19.06, 72.8365)),
            "https://www.google.com/maps/search/?api=1&query=19.06,72.8365"
        );
    }

    #[test]
    #[cfg(target_os = "macos")]
    fn test_apple_maps_scheme() {
        assert_eq!(maps_url(Coordinates::new(19.06, 72.8365)), "maps:?q=19.06,72.8365");
    }
}
