//! Credentials and authentication payloads

use serde::{Deserialize, Serialize};

use super::{Captain, ServiceScope, VehicleSubtype, VehicleType};

/// Email/password login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginCredentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Signup form as the captain fills it in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupData {
    /// Full name
    pub full_name: String,
    /// Email address
    pub email: String,
    /// Ten-digit phone number
    pub phone: String,
    /// Chosen password
    pub password: String,
    /// Password typed a second time
    pub confirm_password: String,
    /// Vehicle driven
    pub vehicle_type: VehicleType,
    /// Optional vehicle class
    pub vehicle_subtype: Option<VehicleSubtype>,
    /// Service scope
    pub service_scope: ServiceScope,
    /// Home city
    pub city: String,
}

/// Signup body as the backend expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    /// Sent as `fullName`
    pub full_name: String,
    /// Sent as `email`
    pub email: String,
    /// Sent as `phone`
    pub phone: String,
    /// Sent as `password`
    pub password: String,
    /// Sent as `confirmPassword`
    pub confirm_password: String,
    /// Sent as `vehicleType`
    pub vehicle_type: VehicleType,
    /// Sent as `vehicleSubtype`, omitted when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_subtype: Option<VehicleSubtype>,
    /// Sent as `serviceScope`
    pub service_scope: ServiceScope,
    /// Sent as `city`
    pub city: String,
}

impl From<&SignupData> for SignupPayload {
    fn from(data: &SignupData) -> Self {
        Self {
            full_name: data.full_name.trim().to_string(),
            email: data.email.trim().to_string(),
            phone: data.phone.trim().to_string(),
            password: data.password.clone(),
            confirm_password: data.confirm_password.clone(),
            vehicle_type: data.vehicle_type,
            vehicle_subtype: data.vehicle_subtype,
            service_scope: data.service_scope,
            city: data.city.trim().to_string(),
        }
    }
}

/// Phone + code submitted after signup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OtpVerification {
    /// Phone the code was sent to
    pub phone: String,
    /// Six-digit code
    pub otp: String,
}

/// Body of login and OTP verification responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token, when issued
    #[serde(default)]
    pub token: Option<String>,
    /// Captain profile, when included
    #[serde(default)]
    pub captain: Option<Captain>,
    /// Informational message
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of endpoints that only acknowledge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Informational message
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_payload_uses_wire_names() {
        let data = SignupData {
            full_name: " Ravi Kumar ".to_string(),
            email: "ravi@example.com".to_string(),
            phone: "9876543210".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            vehicle_type: VehicleType::Cab,
            vehicle_subtype: Some(VehicleSubtype::CabSuv),
            service_scope: ServiceScope::InterCity,
            city: "Pune".to_string(),
        };
        let value = serde_json::to_value(SignupPayload::from(&data)).unwrap();

        assert_eq!(value["fullName"], "Ravi Kumar");
        assert_eq!(value["confirmPassword"], "secret1");
        assert_eq!(value["vehicleType"], "cab");
        assert_eq!(value["vehicleSubtype"], "cab_suv");
        assert_eq!(value["serviceScope"], "inter_city");
        assert!(value.get("full_name").is_none());
    }

    #[test]
    fn test_signup_payload_omits_missing_subtype() {
        let value = serde_json::to_value(SignupPayload::from(&SignupData::default())).unwrap();
        assert!(value.get("vehicleSubtype").is_none());
        assert_eq!(value["vehicleType"], "bike");
    }

    #[test]
    fn test_auth_response_tolerates_missing_fields() {
        let response: AuthResponse = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert!(response.token.is_none());
        assert!(response.captain.is_none());
    }
}
