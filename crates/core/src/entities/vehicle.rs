//! Vehicles in the dealership catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{FuelType, Transmission, VehicleId, VehicleStatus};

/// A vehicle as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub price: Decimal,
    pub mileage_km: u32,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Vehicle {
    /// Headline such as `2021 Toyota Corolla`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    /// First image, used on cards and list rows.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }

    /// Whether the vehicle can still be sold.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.status, VehicleStatus::Available)
    }

    /// Case-insensitive match against make, model, color and description.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.make, &self.model, &self.color, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Editable fields, for pre-filling the admin form.
    #[must_use]
    pub fn to_input(&self) -> VehicleInput {
        VehicleInput {
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year,
            price: self.price,
            mileage_km: self.mileage_km,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            color: self.color.clone(),
            description: self.description.clone(),
            image_urls: self.image_urls.clone(),
            status: self.status,
            featured: self.featured,
        }
    }
}

/// Create/update payload for a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub price: Decimal,
    pub mileage_km: u32,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub color: String,
    pub description: String,
    pub image_urls: Vec<String>,
    pub status: VehicleStatus,
    pub featured: bool,
}
