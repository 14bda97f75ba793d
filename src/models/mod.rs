//! Data models for Captain

mod auth;
mod captain;
mod earning;
mod trip;

pub use auth::{AuthResponse, LoginCredentials, MessageResponse, OtpVerification, SignupData, SignupPayload};
pub use captain::{Captain, ProfileUpdate, ServiceScope, VehicleSubtype, VehicleType};
pub use earning::{DateRange, Earning, EarningSummary, EarningsPeriod};
pub use trip::{Trip, TripAction, TripStatus};

#[cfg(test)]
pub(crate) use captain::sample_captain;
#[cfg(test)]
pub(crate) use trip::sample_trip;
