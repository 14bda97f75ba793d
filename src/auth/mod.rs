//! Session controller
//!
//! Owns the API client and the persisted store, and tracks which captain
//! is signed in. The session is authenticated exactly when a captain is held.

use crate::api::Client;
use crate::error::{CaptainError, Result};
use crate::models::{
    AuthResponse, Captain, LoginCredentials, MessageResponse, OtpVerification, ProfileUpdate,
    SignupData, SignupPayload,
};
use crate::storage::SessionStore;

/// Signed-in state for one captain
pub struct Session {
    client: Client,
    store: SessionStore,
    captain: Option<Captain>,
}

impl Session {
    /// Session over `client`, persisting to `store`
    pub const fn new(client: Client, store: SessionStore) -> Self {
        Self {
            client,
            store,
            captain: None,
        }
    }

    /// Current captain
    pub const fn captain(&self) -> Option<&Captain> {
        self.captain.as_ref()
    }

    /// Whether a captain is signed in
    pub const fn is_authenticated(&self) -> bool {
        self.captain.is_some()
    }

    /// API client used by this session
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Resume a persisted session.
    ///
    /// Any failure leaves the session signed out with both keys cleared.
    pub async fn restore(&mut self) -> Option<&Captain> {
        match self.store.token() {
            Ok(Some(_)) => {}
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Could not read stored session: {}", e);
                self.forget();
                return None;
            }
        }

        match self.client.get_profile().await {
            Ok(captain) => {
                tracing::info!("Restored session for {}", captain.id);
                Some(self.adopt(captain))
            }
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::info!("Stored session expired");
                } else {
                    tracing::warn!("Could not restore session: {}", e);
                }
                self.forget();
                None
            }
        }
    }

    /// Sign in with email and password
    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<&Captain> {
        let response = self.client.login(credentials).await?;
        self.adopt_response(response).await
    }

    /// Register a new captain; the session stays signed out
    pub async fn signup(&self, data: &SignupData) -> Result<MessageResponse> {
        self.client.signup(&SignupPayload::from(data)).await
    }

    /// Confirm the signup code and sign in
    pub async fn verify_otp(&mut self, verification: &OtpVerification) -> Result<&Captain> {
        let response = self.client.verify_otp(verification).await?;
        self.adopt_response(response).await
    }

    /// Request another signup code
    pub async fn resend_otp(&self, phone: &str) -> Result<MessageResponse> {
        self.client.resend_otp(phone).await
    }

    /// Sign out locally whatever the backend says
    pub async fn logout(&mut self) {
        if let Err(e) = self.client.logout().await {
            tracing::warn!("Remote logout failed: {}", e);
        }
        self.forget();
    }

    /// Re-fetch the profile; failures keep the current one
    pub async fn refresh_profile(&mut self) -> Option<&Captain> {
        match self.client.get_profile().await {
            Ok(captain) => return Some(self.adopt(captain)),
            Err(e) => tracing::warn!("Profile refresh failed: {}", e),
        }
        self.captain.as_ref()
    }

    /// Go online or offline, then refresh the profile
    pub async fn update_availability(&mut self, is_available: bool) -> Result<Option<&Captain>> {
        self.client.update_availability(is_available).await?;
        Ok(self.refresh_profile().await)
    }

    /// Change the home city, then refresh the profile
    pub async fn update_city(&mut self, city: &str) -> Result<Option<&Captain>> {
        let city = city.trim();
        if city.is_empty() {
            return Err(CaptainError::validation("City cannot be empty"));
        }
        self.client.update_profile(&ProfileUpdate::city(city)).await?;
        Ok(self.refresh_profile().await)
    }

    async fn adopt_response(&mut self, response: AuthResponse) -> Result<&Captain> {
        let captain = match response.captain {
            Some(captain) => captain,
            None => self.client.get_profile().await?,
        };
        Ok(self.adopt(captain))
    }

    fn adopt(&mut self, captain: Captain) -> &Captain {
        if let Err(e) = self.store.set_profile(&captain) {
            tracing::warn!("Could not cache profile: {:#}", e);
        }
        self.captain.insert(captain)
    }

    fn forget(&mut self) {
        self.captain = None;
        if let Err(e) = self.store.clear() {
            tracing::warn!("Could not clear stored session: {:#}", e);
        }
    }
}
