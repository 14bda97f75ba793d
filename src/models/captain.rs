//! Captain profile model

use serde::{Deserialize, Serialize};

/// Vehicle a captain drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Two-wheeler
    #[default]
    Bike,
    /// Car
    Cab,
    /// Goods vehicle
    Truck,
}

impl VehicleType {
    /// All vehicle types, in selection order
    pub const fn all() -> &'static [Self] {
        &[Self::Bike, Self::Cab, Self::Truck]
    }

    /// Display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bike => "Bike",
            Self::Cab => "Cab",
            Self::Truck => "Truck",
        }
    }

    /// Subtypes offered for this vehicle type
    pub const fn subtypes(&self) -> &'static [VehicleSubtype] {
        match self {
            Self::Bike => &[VehicleSubtype::BikeStandard],
            Self::Cab => &[
                VehicleSubtype::CabSedan,
                VehicleSubtype::CabSuv,
                VehicleSubtype::CabHatchback,
            ],
            Self::Truck => &[
                VehicleSubtype::Truck3Wheeler,
                VehicleSubtype::TruckMiniVan,
                VehicleSubtype::TruckPickup,
                VehicleSubtype::TruckFullSize,
            ],
        }
    }

    /// Next type in rotation
    pub fn next(&self) -> Self {
        cycle(Self::all(), *self, 1)
    }

    /// Previous type in rotation
    pub fn prev(&self) -> Self {
        cycle(Self::all(), *self, -1)
    }
}

/// Specific vehicle model class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum VehicleSubtype {
    BikeStandard,
    CabSedan,
    CabSuv,
    CabHatchback,
    #[serde(rename = "truck_3wheeler")]
    Truck3Wheeler,
    TruckMiniVan,
    TruckPickup,
    TruckFullSize,
}

impl VehicleSubtype {
    /// Display label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BikeStandard => "Standard",
            Self::CabSedan => "Sedan",
            Self::CabSuv => "SUV",
            Self::CabHatchback => "Hatchback",
            Self::Truck3Wheeler => "3 Wheeler",
            Self::TruckMiniVan => "Mini Van",
            Self::TruckPickup => "Pickup Truck",
            Self::TruckFullSize => "Full Size",
        }
    }
}

/// Whether the captain serves trips within a city or between cities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceScope {
    /// Trips inside one city
    #[default]
    IntraCity,
    /// Trips between cities
    InterCity,
}

impl ServiceScope {
    /// All scopes, in selection order
    pub const fn all() -> &'static [Self] {
        &[Self::IntraCity, Self::InterCity]
    }

    /// Display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IntraCity => "Intra City",
            Self::InterCity => "Inter City",
        }
    }

    /// Next scope in rotation
    pub fn next(&self) -> Self {
        cycle(Self::all(), *self, 1)
    }
}

fn cycle<T: Copy + PartialEq>(items: &[T], current: T, step: isize) -> T {
    let len = items.len() as isize;
    let idx = items.iter().position(|i| *i == current).unwrap_or(0) as isize;
    items[(idx + step).rem_euclid(len) as usize]
}

/// A captain's profile as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Captain {
    /// Backend identifier
    pub id: String,
    /// Full name
    pub full_name: String,
    /// Ten-digit phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Vehicle driven
    pub vehicle_type: VehicleType,
    /// Vehicle class, when the captain picked one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_subtype: Option<VehicleSubtype>,
    /// Service scope
    pub service_scope: ServiceScope,
    /// Whether the captain accepts new requests
    pub is_available: bool,
    /// Average customer rating
    pub rating: f64,
    /// Completed trip count
    pub total_trips: u32,
    /// Home city
    #[serde(default)]
    pub city: Option<String>,
}

impl Captain {
    /// First word of the full name
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("Captain")
    }

    /// Header line such as `BIKE • INTRA CITY`
    pub fn service_line(&self) -> String {
        format!(
            "{} • {}",
            self.vehicle_type.name().to_uppercase(),
            self.service_scope.name().to_uppercase()
        )
    }

    /// Services this captain can take requests for
    pub const fn service_categories(&self) -> &'static [&'static str] {
        match (self.vehicle_type, self.service_scope) {
            (VehicleType::Bike, ServiceScope::IntraCity) => &["Local Parcel Delivery", "Bike Ride"],
            (VehicleType::Cab, ServiceScope::IntraCity) => &["Cab Booking (Intra City)"],
            (VehicleType::Cab, ServiceScope::InterCity) => &["Cab Booking (Inter City)"],
            (VehicleType::Truck, ServiceScope::IntraCity) => &["Truck Booking"],
            (VehicleType::Truck, ServiceScope::InterCity) => &["Packers & Movers", "All India Parcel"],
            (VehicleType::Bike, ServiceScope::InterCity) => &[],
        }
    }
}

/// Partial profile update; only present fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl ProfileUpdate {
    /// Update only the city
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Default::default()
        }
    }

    /// Apply this update to a local copy
    pub fn apply_to(&self, captain: &mut Captain) {
        if let Some(name) = &self.full_name {
            captain.full_name.clone_from(name);
        }
        if let Some(email) = &self.email {
            captain.email.clone_from(email);
        }
        if let Some(phone) = &self.phone {
            captain.phone.clone_from(phone);
        }
        if let Some(city) = &self.city {
            captain.city = Some(city.clone());
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_captain() -> Captain {
    Captain {
        id: "cap_001".to_string(),
        full_name: "Demo Captain".to_string(),
        phone: "9999999999".to_string(),
        email: "demo@captain.app".to_string(),
        vehicle_type: VehicleType::Bike,
        vehicle_subtype: None,
        service_scope: ServiceScope::IntraCity,
        is_available: true,
        rating: 4.7,
        total_trips: 123,
        city: Some("Mumbai".to_string()),
    }
}
