//! Error taxonomy for the payment workflow.
//!
//! Every failing step maps to a distinct, step-identified error so the
//! dashboard can tell the user *which* part of the sequence failed instead
//! of showing a generic message. Failures that happen after money has
//! already moved are not errors at all; they are [`WorkflowWarning`]s
//! carried alongside a successful outcome.

use std::fmt;

use thiserror::Error;

/// The workflow step that failed.
///
/// Only steps that can fail before money moves appear here; once a payment
/// is committed, later problems are warnings instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStep {
    FetchOrder,
    CreatePayment,
    CreateGatewayPayment,
    PersistSession,
}

impl fmt::Display for PaymentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentStep::FetchOrder => "order lookup",
            PaymentStep::CreatePayment => "payment creation",
            PaymentStep::CreateGatewayPayment => "gateway payment creation",
            PaymentStep::PersistSession => "pending session persistence",
        };
        f.write_str(name)
    }
}

/// Hard failure of the payment workflow
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Rejected before any network call was made
    #[error("{0}")]
    Validation(String),

    /// A specific step of the sequence failed
    #[error("{step} failed: {source}")]
    Step {
        step: PaymentStep,
        #[source]
        source: anyhow::Error,
    },
}

impl PaymentError {
    pub fn step(step: PaymentStep, source: anyhow::Error) -> Self {
        PaymentError::Step { step, source }
    }
}

/// Non-fatal problem after a payment was already committed.
///
/// These never roll anything back; they flag work for manual follow-up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowWarning {
    #[error(
        "payment recorded but the status update for order {order_id} failed; \
         flagged for manual reconciliation: {detail}"
    )]
    StatusUpdateFailed { order_id: String, detail: String },

    #[error("payment {payment_id} succeeded but debt creation failed: {detail}")]
    DebtCreationFailed { payment_id: String, detail: String },
}
