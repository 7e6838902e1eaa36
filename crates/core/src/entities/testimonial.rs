//! Customer testimonials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TestimonialId;

/// Highest rating a testimonial can carry.
pub const MAX_RATING: u8 = 5;

/// A customer testimonial. Only approved ones are public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: TestimonialId,
    pub customer_name: String,
    #[serde(default)]
    pub city: Option<String>,
    pub content: String,
    pub rating: u8,
    #[serde(default)]
    pub vehicle_label: Option<String>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Testimonial {
    /// Filled and empty stars, e.g. `★★★★☆`.
    #[must_use]
    pub fn stars(&self) -> String {
        let filled = usize::from(self.rating.min(MAX_RATING));
        let empty = usize::from(MAX_RATING) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }

    /// Editable fields, for pre-filling the admin form.
    #[must_use]
    pub fn to_input(&self) -> TestimonialInput {
        TestimonialInput {
            customer_name: self.customer_name.clone(),
            city: self.city.clone(),
            content: self.content.clone(),
            rating: self.rating,
            vehicle_label: self.vehicle_label.clone(),
            approved: self.approved,
        }
    }
}

/// Create/update payload for a testimonial.
///
/// Public submissions always arrive with `approved = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialInput {
    pub customer_name: String,
    pub city: Option<String>,
    pub content: String,
    pub rating: u8,
    pub vehicle_label: Option<String>,
    pub approved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_clamped() {
        let mut t = Testimonial {
            id: TestimonialId::new(1),
            customer_name: "Ana".to_string(),
            city: None,
            content: "Great service".to_string(),
            rating: 4,
            vehicle_label: None,
            approved: true,
            created_at: None,
        };
        assert_eq!(t.stars(), "★★★★☆");
        t.rating = 9;
        assert_eq!(t.stars(), "★★★★★");
    }
}
