//! Input forms for the auth screens and trip dialogs

use regex_lite::Regex;
use std::sync::LazyLock;

use crate::error::{CaptainError, Result};
use crate::models::{
    LoginCredentials, OtpVerification, SignupData, VehicleSubtype, VehicleType,
};

/// Digits in the code a customer reads out to end a trip
pub const TRIP_OTP_LEN: usize = 4;

/// Digits in the signup verification code
pub const SIGNUP_OTP_LEN: usize = 6;

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").ok());
static PHONE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d{10}$").ok());

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// Fixed-length numeric code typed one digit at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpInput {
    value: String,
    len: usize,
}

impl OtpInput {
    /// Empty code of `len` digits
    pub const fn new(len: usize) -> Self {
        Self {
            value: String::new(),
            len,
        }
    }

    /// Digits typed so far
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expected number of digits
    pub const fn max_len(&self) -> usize {
        self.len
    }

    /// Append a digit; anything else, or a digit past the limit, is ignored
    pub fn push(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() || self.value.len() >= self.len {
            return false;
        }
        self.value.push(c);
        true
    }

    /// Remove the last digit
    pub fn pop(&mut self) {
        self.value.pop();
    }

    /// Clear the code
    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Whether all digits are present
    pub fn is_complete(&self) -> bool {
        self.value.len() == self.len
    }

    /// The full code, or a validation error naming the expected length
    pub fn validate(&self) -> Result<String> {
        if self.is_complete() {
            Ok(self.value.clone())
        } else {
            Err(CaptainError::validation(format!(
                "Please enter a valid {}-digit OTP",
                self.len
            )))
        }
    }
}

/// Free-text reason for rejecting or cancelling a trip
pub fn validate_reason(reason: &str, action: &str) -> Result<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        Err(CaptainError::validation(format!(
            "Please provide a reason for {action}"
        )))
    } else {
        Ok(reason.to_string())
    }
}

/// Login form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    /// Email
    #[default]
    Email,
    /// Password
    Password,
}

/// Email/password login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Email typed so far
    pub email: String,
    /// Password typed so far
    pub password: String,
    /// Field receiving input
    pub focus: LoginField,
}

impl LoginForm {
    /// Move to the other field
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    /// Type a character into the focused field
    pub fn push(&mut self, c: char) {
        self.field_mut().push(c);
    }

    /// Delete from the focused field
    pub fn pop(&mut self) {
        self.field_mut().pop();
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    /// Credentials, when both fields are filled
    pub fn validate(&self) -> Result<LoginCredentials> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(CaptainError::validation("Please enter email and password"));
        }
        Ok(LoginCredentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Signup form fields, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum SignupField {
    #[default]
    FullName,
    Email,
    Phone,
    City,
    VehicleType,
    VehicleSubtype,
    ServiceScope,
    Password,
    ConfirmPassword,
}

impl SignupField {
    /// All fields in tab order
    pub const fn all() -> &'static [Self] {
        &[
            Self::FullName,
            Self::Email,
            Self::Phone,
            Self::City,
            Self::VehicleType,
            Self::VehicleSubtype,
            Self::ServiceScope,
            Self::Password,
            Self::ConfirmPassword,
        ]
    }

    /// Field label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::City => "City",
            Self::VehicleType => "Vehicle Type",
            Self::VehicleSubtype => "Vehicle Model",
            Self::ServiceScope => "Service Scope",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm Password",
        }
    }

    /// Whether the field cycles through fixed choices
    pub const fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::VehicleType | Self::VehicleSubtype | Self::ServiceScope
        )
    }

    fn step(&self, forward: bool) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % all.len()
        } else {
            (idx + all.len() - 1) % all.len()
        };
        all[next]
    }
}

/// Captain registration form
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    /// Values entered so far
    pub data: SignupData,
    /// Field receiving input
    pub focus: SignupField,
    /// Validation errors from the last submit, per field
    pub errors: Vec<(SignupField, &'static str)>,
}

impl SignupForm {
    /// Focus the next field
    pub fn next_field(&mut self) {
        self.focus = self.focus.step(true);
    }

    /// Focus the previous field
    pub fn prev_field(&mut self) {
        self.focus = self.focus.step(false);
    }

    /// Error shown under `field`
    pub fn error(&self, field: SignupField) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, msg)| *msg)
    }

    /// Text shown for `field`
    pub fn display_value(&self, field: SignupField) -> String {
        let d = &self.data;
        match field {
            SignupField::FullName => d.full_name.clone(),
            SignupField::Email => d.email.clone(),
            SignupField::Phone => d.phone.clone(),
            SignupField::City => d.city.clone(),
            SignupField::VehicleType => d.vehicle_type.name().to_string(),
            SignupField::VehicleSubtype => d
                .vehicle_subtype
                .map_or_else(|| "Not specified".to_string(), |s| s.label().to_string()),
            SignupField::ServiceScope => d.service_scope.name().to_string(),
            SignupField::Password => "•".repeat(d.password.chars().count()),
            SignupField::ConfirmPassword => "•".repeat(d.confirm_password.chars().count()),
        }
    }

    /// Type a character; choice fields ignore text
    pub fn push(&mut self, c: char) {
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    /// Delete from the focused text field
    pub fn pop(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        let d = &mut self.data;
        match self.focus {
            SignupField::FullName => Some(&mut d.full_name),
            SignupField::Email => Some(&mut d.email),
            SignupField::Phone => Some(&mut d.phone),
            SignupField::City => Some(&mut d.city),
            SignupField::Password => Some(&mut d.password),
            SignupField::ConfirmPassword => Some(&mut d.confirm_password),
            SignupField::VehicleType | SignupField::VehicleSubtype | SignupField::ServiceScope => {
                None
            }
        }
    }

    /// Cycle the focused choice field
    pub fn cycle_choice(&mut self, forward: bool) {
        match self.focus {
            SignupField::VehicleType => {
                let next = if forward {
                    self.data.vehicle_type.next()
                } else {
                    self.data.vehicle_type.prev()
                };
                self.set_vehicle_type(next);
            }
            SignupField::VehicleSubtype => {
                self.data.vehicle_subtype =
                    cycle_subtype(self.data.vehicle_type, self.data.vehicle_subtype, forward);
            }
            SignupField::ServiceScope => {
                self.data.service_scope = self.data.service_scope.next();
            }
            _ => {}
        }
    }

    /// Change vehicle type; any chosen subtype no longer applies
    pub fn set_vehicle_type(&mut self, vehicle_type: VehicleType) {
        if self.data.vehicle_type != vehicle_type {
            self.data.vehicle_type = vehicle_type;
            self.data.vehicle_subtype = None;
        }
    }

    /// Check every field, recording errors; returns the data when valid
    pub fn validate(&mut self) -> Option<SignupData> {
        let d = &self.data;
        let mut errors = Vec::new();

        if d.full_name.trim().is_empty() {
            errors.push((SignupField::FullName, "Name is required"));
        }
        let email = d.email.trim();
        if email.is_empty() {
            errors.push((SignupField::Email, "Email is required"));
        } else if !matches(&EMAIL_RE, email) {
            errors.push((SignupField::Email, "Email is invalid"));
        }
        let phone = d.phone.trim();
        if phone.is_empty() {
            errors.push((SignupField::Phone, "Phone is required"));
        } else if !matches(&PHONE_RE, phone) {
            errors.push((SignupField::Phone, "Phone must be 10 digits"));
        }
        if d.password.is_empty() {
            errors.push((SignupField::Password, "Password is required"));
        } else if d.password.chars().count() < 6 {
            errors.push((SignupField::Password, "Password must be at least 6 characters"));
        }
        if d.password != d.confirm_password {
            errors.push((SignupField::ConfirmPassword, "Passwords do not match"));
        }
        if d.city.trim().is_empty() {
            errors.push((SignupField::City, "City is required"));
        }
        if let Some(subtype) = d.vehicle_subtype
            && !d.vehicle_type.subtypes().contains(&subtype)
        {
            errors.push((SignupField::VehicleSubtype, "Model does not match vehicle"));
        }

        self.errors = errors;
        self.errors.is_empty().then(|| self.data.clone())
    }
}

/// Step through `None` then each subtype of `vehicle_type`
fn cycle_subtype(
    vehicle_type: VehicleType,
    current: Option<VehicleSubtype>,
    forward: bool,
) -> Option<VehicleSubtype> {
    let mut choices: Vec<Option<VehicleSubtype>> = vec![None];
    choices.extend(vehicle_type.subtypes().iter().copied().map(Some));
    let idx = choices.iter().position(|c| *c == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % choices.len()
    } else {
        (idx + choices.len() - 1) % choices.len()
    };
    choices[next]
}

/// Signup code entry for one phone number
#[derive(Debug, Clone)]
pub struct VerifyOtpForm {
    /// Phone the code was sent to
    pub phone: String,
    /// Code typed so far
    pub otp: OtpInput,
}

impl VerifyOtpForm {
    /// Form for `phone`
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            otp: OtpInput::new(SIGNUP_OTP_LEN),
        }
    }

    /// Verification payload when the code is complete
    pub fn validate(&self) -> Result<OtpVerification> {
        Ok(OtpVerification {
            phone: self.phone.clone(),
            otp: self.otp.validate()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceScope;

    fn filled_signup() -> SignupForm {
        SignupForm {
            data: SignupData {
                full_name: "Ravi Kumar".to_string(),
                email: "ravi@example.com".to_string(),
                phone: "9876543210".to_string(),
                password: "secret1".to_string(),
                confirm_password: "secret1".to_string(),
                city: "Pune".to_string(),
                ..SignupData::default()
            },
            ..SignupForm::default()
        }
    }

    #[test]
    fn test_otp_rejects_non_digits_and_overflow() {
        let mut otp = OtpInput::new(TRIP_OTP_LEN);
        assert!(otp.push('1'));
        assert!(!otp.push('a'));
        assert!(otp.push('2'));
        assert_eq!(otp.value(), "12");
        assert!(otp.validate().is_err());

        assert!(otp.push('3'));
        assert!(otp.push('4'));
        assert!(!otp.push('5'));
        assert_eq!(otp.validate().unwrap(), "1234");
    }

    #[test]
    fn test_otp_error_names_length() {
        let otp = OtpInput::new(SIGNUP_OTP_LEN);
        let err = otp.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid 6-digit OTP");
    }

    #[test]
    fn test_reason_must_not_be_blank() {
        assert!(validate_reason("   ", "rejection").is_err());
        assert_eq!(validate_reason(" Too far ", "rejection").unwrap(), "Too far");
        assert_eq!(
            validate_reason("", "cancellation").unwrap_err().to_string(),
            "Please provide a reason for cancellation"
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        let mut form = LoginForm::default();
        "demo@captain.app".chars().for_each(|c| form.push(c));
        assert!(form.validate().is_err());

        form.toggle_focus();
        "password123".chars().for_each(|c| form.push(c));
        let credentials = form.validate().unwrap();
        assert_eq!(credentials.email, "demo@captain.app");
        assert_eq!(credentials.password, "password123");
    }

    #[test]
    fn test_valid_signup() {
        let mut form = filled_signup();
        assert!(form.validate().is_some());
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_signup_field_errors() {
        let mut form = filled_signup();
        form.data.email = "not-an-email".to_string();
        form.data.phone = "98765".to_string();
        form.data.password = "abc".to_string();
        form.data.city = "  ".to_string();

        assert!(form.validate().is_none());
        assert_eq!(form.error(SignupField::Email), Some("Email is invalid"));
        assert_eq!(form.error(SignupField::Phone), Some("Phone must be 10 digits"));
        assert_eq!(
            form.error(SignupField::Password),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(form.error(SignupField::ConfirmPassword), Some("Passwords do not match"));
        assert_eq!(form.error(SignupField::City), Some("City is required"));
        assert!(form.error(SignupField::FullName).is_none());
    }

    #[test]
    fn test_phone_must_be_exactly_ten_digits() {
        let mut form = filled_signup();
        form.data.phone = "98765432101".to_string();
        assert!(form.validate().is_none());
        form.data.phone = "98765a3210".to_string();
        assert!(form.validate().is_none());
    }

    #[test]
    fn test_subtype_resets_on_vehicle_change() {
        let mut form = filled_signup();
        form.set_vehicle_type(VehicleType::Cab);
        form.focus = SignupField::VehicleSubtype;
        form.cycle_choice(true);
        assert_eq!(form.data.vehicle_subtype, Some(VehicleSubtype::CabSedan));

        form.focus = SignupField::VehicleType;
        form.cycle_choice(true);
        assert_eq!(form.data.vehicle_type, VehicleType::Truck);
        assert!(form.data.vehicle_subtype.is_none());
    }

    #[test]
    fn test_subtype_cycle_wraps_through_none() {
        assert_eq!(
            cycle_subtype(VehicleType::Bike, None, true),
            Some(VehicleSubtype::BikeStandard)
        );
        assert_eq!(
            cycle_subtype(VehicleType::Bike, Some(VehicleSubtype::BikeStandard), true),
            None
        );
        assert_eq!(
            cycle_subtype(VehicleType::Cab, None, false),
            Some(VehicleSubtype::CabHatchback)
        );
    }

    #[test]
    fn test_text_input_skips_choice_fields() {
        let mut form = SignupForm {
            focus: SignupField::ServiceScope,
            ..SignupForm::default()
        };
        form.push('x');
        assert_eq!(form.data, SignupData::default());
        form.cycle_choice(true);
        assert_eq!(form.data.service_scope, ServiceScope::InterCity);
    }
}
