//! Clients for the remote dealer platform.
//!
//! All order, payment, appointment, and debt data lives on the remote REST
//! backend. [`DealerApi`] is the seam the domain services work against, so
//! tests can substitute a recording implementation; [`HttpDealerApi`] is
//! the production implementation.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use shared::{OrderStatus, PaymentMethod, PaymentType};

use crate::domain::models::{Appointment, OrderSummary};

pub use http::HttpDealerApi;

/// Payment record created on the cash rail
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCreated {
    pub payment_id: String,
}

/// Debt record created for an installment payment
#[derive(Debug, Clone, PartialEq)]
pub struct DebtCreated {
    pub debt_id: String,
}

/// Gateway payment created on the redirect rail
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPaymentCreated {
    /// URL the browser must navigate to
    pub pay_url: String,
    /// Identifier of the created payment, when the gateway returns one
    pub payment_id: Option<String>,
}

/// Contract with the remote dealer platform
#[async_trait]
pub trait DealerApi: Send + Sync {
    /// Appointments scheduled for one dealer
    async fn fetch_appointments(&self, dealer_id: &str) -> Result<Vec<Appointment>>;

    /// Summary of the order being paid
    async fn fetch_order(&self, order_id: &str) -> Result<OrderSummary>;

    /// Record a payment settled in-app
    async fn create_payment(
        &self,
        order_id: &str,
        amount: i64,
        method: PaymentMethod,
        payment_type: PaymentType,
    ) -> Result<PaymentCreated>;

    /// Move the order to its post-payment status
    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()>;

    /// Create the debt record tracking the remaining balance of an
    /// installment payment
    async fn create_debt_from_payment(&self, payment_id: &str) -> Result<DebtCreated>;

    /// Create a gateway payment and obtain the redirect URL
    async fn create_gateway_payment(
        &self,
        order_id: &str,
        amount: i64,
        payment_type: PaymentType,
    ) -> Result<GatewayPaymentCreated>;
}
