//! Promotions shown on the site and managed in the admin panel.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{PromotionId, VehicleId};

/// A dealership promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: PromotionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
}

impl Promotion {
    /// Active and inside its date window (bounds inclusive, open ends allowed).
    #[must_use]
    pub fn is_running(&self, today: NaiveDate) -> bool {
        self.active
            && self.starts_on.is_none_or(|start| start <= today)
            && self.ends_on.is_none_or(|end| today <= end)
    }

    /// Badge text such as `15% off`.
    #[must_use]
    pub fn discount_label(&self) -> Option<String> {
        self.discount_percent
            .filter(|pct| !pct.is_zero())
            .map(|pct| format!("{}% off", pct.normalize()))
    }

    /// Editable fields, for pre-filling the admin form.
    #[must_use]
    pub fn to_input(&self) -> PromotionInput {
        PromotionInput {
            title: self.title.clone(),
            description: self.description.clone(),
            discount_percent: self.discount_percent,
            starts_on: self.starts_on,
            ends_on: self.ends_on,
            active: self.active,
            image_url: self.image_url.clone(),
            vehicle_id: self.vehicle_id,
        }
    }
}

/// Create/update payload for a promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionInput {
    pub title: String,
    pub description: String,
    pub discount_percent: Option<Decimal>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub active: bool,
    pub image_url: Option<String>,
    pub vehicle_id: Option<VehicleId>,
}
