//! Domain model for a payment submission.
//!
//! Amounts are integer minor currency units throughout, so the installment
//! computation is exact and recomputing it any number of times yields the
//! same value.

use serde::{Deserialize, Serialize};
use shared::{OrderStatus, PaymentMethod, PaymentType};

/// Smallest amount the payment gateway accepts, in minor currency units.
/// Submissions below this are rejected locally, before any network call.
pub const MIN_GATEWAY_AMOUNT: i64 = 10_000;

/// Installment percentage of the total order amount due now.
///
/// The gateway only accepts this closed set, so invalid percentages are
/// unrepresentable past the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InstallmentPercentage {
    P20,
    P30,
    P40,
    P50,
    P60,
    P70,
    P80,
    P90,
}

impl InstallmentPercentage {
    pub fn as_u8(self) -> u8 {
        match self {
            InstallmentPercentage::P20 => 20,
            InstallmentPercentage::P30 => 30,
            InstallmentPercentage::P40 => 40,
            InstallmentPercentage::P50 => 50,
            InstallmentPercentage::P60 => 60,
            InstallmentPercentage::P70 => 70,
            InstallmentPercentage::P80 => 80,
            InstallmentPercentage::P90 => 90,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            20 => Some(InstallmentPercentage::P20),
            30 => Some(InstallmentPercentage::P30),
            40 => Some(InstallmentPercentage::P40),
            50 => Some(InstallmentPercentage::P50),
            60 => Some(InstallmentPercentage::P60),
            70 => Some(InstallmentPercentage::P70),
            80 => Some(InstallmentPercentage::P80),
            90 => Some(InstallmentPercentage::P90),
            _ => None,
        }
    }
}

impl TryFrom<u8> for InstallmentPercentage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        InstallmentPercentage::from_u8(value)
            .ok_or_else(|| format!("invalid installment percentage: {}", value))
    }
}

impl From<InstallmentPercentage> for u8 {
    fn from(value: InstallmentPercentage) -> Self {
        value.as_u8()
    }
}

/// Payment terms: full settlement or a fixed installment percentage.
///
/// An installment without a percentage cannot be constructed, which is the
/// "required iff installment" rule enforced by the type instead of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTerms {
    Full,
    Installment(InstallmentPercentage),
}

impl PaymentTerms {
    /// Build terms from the wire pair (type, optional percentage).
    ///
    /// The percentage is ignored for full payments and required for
    /// installments.
    pub fn from_parts(
        payment_type: PaymentType,
        installment_percentage: Option<u8>,
    ) -> Result<Self, String> {
        match payment_type {
            PaymentType::Full => Ok(PaymentTerms::Full),
            PaymentType::Installment => {
                let raw = installment_percentage
                    .ok_or_else(|| "installment payments require a percentage".to_string())?;
                let percentage = InstallmentPercentage::from_u8(raw)
                    .ok_or_else(|| format!("invalid installment percentage: {}", raw))?;
                Ok(PaymentTerms::Installment(percentage))
            }
        }
    }

    pub fn payment_type(self) -> PaymentType {
        match self {
            PaymentTerms::Full => PaymentType::Full,
            PaymentTerms::Installment(_) => PaymentType::Installment,
        }
    }

    pub fn installment_percentage(self) -> Option<InstallmentPercentage> {
        match self {
            PaymentTerms::Full => None,
            PaymentTerms::Installment(percentage) => Some(percentage),
        }
    }

    /// Order status once a payment under these terms has settled
    pub fn settled_order_status(self) -> OrderStatus {
        match self {
            PaymentTerms::Full => OrderStatus::Paid,
            PaymentTerms::Installment(_) => OrderStatus::Partial,
        }
    }
}

/// A payment submission for one order
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub order_id: String,
    /// Total order amount in minor currency units
    pub total_order_amount: i64,
    pub method: PaymentMethod,
    pub terms: PaymentTerms,
}

impl PaymentRequest {
    /// Amount due now: the full total, or the installment share of it.
    ///
    /// Pure integer math; callers recompute this on every change to the
    /// terms rather than caching it.
    pub fn computed_amount(&self) -> i64 {
        match self.terms {
            PaymentTerms::Full => self.total_order_amount,
            PaymentTerms::Installment(percentage) => {
                self.total_order_amount * i64::from(percentage.as_u8()) / 100
            }
        }
    }
}
