//! Leads captured by the public site: contact requests and credit simulations.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{ContactId, CreditSimulationId, Email, LeadStatus, VehicleId};

/// A contact request submitted through the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for a public contact submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: String,
    pub vehicle_id: Option<VehicleId>,
}

/// Financing parameters for a fixed-rate loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTerms {
    /// Vehicle price.
    pub price: Decimal,
    /// Amount paid up front.
    pub down_payment: Decimal,
    /// Number of monthly installments.
    pub term_months: u32,
    /// Nominal annual interest rate as a fraction (`0.1899` is 18.99%).
    pub annual_rate: Decimal,
}

impl CreditTerms {
    /// Amount being financed. Never negative.
    #[must_use]
    pub fn principal(&self) -> Decimal {
        (self.price - self.down_payment).max(Decimal::ZERO)
    }

    /// Monthly installment of a fully amortized loan, rounded to cents.
    ///
    /// Uses `P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate; a zero
    /// rate divides the principal evenly. Returns `None` for a zero term or
    /// when the amounts overflow `Decimal`.
    #[must_use]
    pub fn monthly_payment(&self) -> Option<Decimal> {
        if self.term_months == 0 {
            return None;
        }
        let principal = self.principal();
        let months = Decimal::from(self.term_months);
        let rate = self.annual_rate / Decimal::from(12);

        let payment = if rate.is_zero() {
            principal / months
        } else {
            let mut growth = Decimal::ONE;
            for _ in 0..self.term_months {
                growth = growth.checked_mul(Decimal::ONE + rate)?;
            }
            principal
                .checked_mul(rate)?
                .checked_mul(growth)?
                .checked_div(growth.checked_sub(Decimal::ONE)?)?
        };

        Some(payment.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Sum of all installments, `None` when it does not fit in `Decimal`.
    #[must_use]
    pub fn total_paid(&self) -> Option<Decimal> {
        self.monthly_payment()?
            .checked_mul(Decimal::from(self.term_months))
    }
}

/// A credit simulation stored as a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSimulation {
    pub id: CreditSimulationId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    pub price: Decimal,
    pub down_payment: Decimal,
    pub term_months: u32,
    pub monthly_payment: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for a public credit simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSimulationInput {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub vehicle_id: Option<VehicleId>,
    pub price: Decimal,
    pub down_payment: Decimal,
    pub term_months: u32,
    pub monthly_payment: Decimal,
}
