//! Domain model for the pending gateway session.

use serde::{Deserialize, Serialize};
use shared::{PaymentType, StaffRole};

/// State carried across the gateway redirect.
///
/// Written exactly once, synchronously, right before the browser leaves for
/// the gateway; consumed (read and deleted) exactly once when it returns.
/// This is the only state in the service that outlives a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingGatewaySession {
    pub order_id: String,
    pub payment_type: PaymentType,
    /// Present for installment payments
    pub installment_percentage: Option<u8>,
    /// Identifier assigned by the gateway-payment creation call, when the
    /// gateway returned one
    pub payment_id: Option<String>,
    pub initiating_role: StaffRole,
    /// RFC 3339 creation timestamp, kept for operator forensics
    pub created_at: String,
}
