//! Domain model for the order being paid.

/// Read-only summary of an order, fetched from the dealer platform
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub order_id: String,
    /// Total order amount in minor currency units
    pub total_amount: i64,
    pub customer_label: String,
}
