//! Payment reconciliation workflow.
//!
//! One service, two rails. The cash rail settles in-app: create the
//! payment, move the order to its post-payment status, and (for installment
//! payments taken by dealer staff) create the debt record. The gateway rail
//! only creates the gateway payment and persists the pending session before
//! the browser leaves; status and debt work happens when the gateway
//! redirects back.
//!
//! The central correctness property is exactly-once consumption of the
//! pending session: the return handler takes (reads and deletes) the slot
//! before doing anything else, so reloads, back-buttons, and duplicate
//! callbacks degrade to silent no-ops.

use std::sync::Arc;

use log::{error, info, warn};
use shared::{OrderStatus, PaymentMethod, PaymentType, StaffRole};
use uuid::Uuid;

use crate::clients::DealerApi;
use crate::config::ReconciliationPolicy;
use crate::domain::models::{
    PaymentRequest, PaymentTerms, PendingGatewaySession, MIN_GATEWAY_AMOUNT,
};
use crate::error::{PaymentError, PaymentStep, WorkflowWarning};
use crate::storage::PendingSessionStorage;

/// Result-code pair the gateway sends on a successful payment
pub const GATEWAY_SUCCESS_RESULT_CODE: &str = "00";
pub const GATEWAY_SUCCESS_TRANSACTION_STATUS: &str = "00";

/// Outcome of a payment submission
#[derive(Debug)]
pub enum PaymentOutcome {
    /// Cash rail: settled in-app, possibly with reconciliation warnings
    Settled(CashSettlement),
    /// Gateway rail: the browser must navigate to `pay_url`
    RedirectToGateway { pay_url: String },
}

/// What the cash rail accomplished
#[derive(Debug)]
pub struct CashSettlement {
    pub payment_id: String,
    /// Status the order was moved to (or should have been; see `warnings`)
    pub order_status: OrderStatus,
    pub status_updated: bool,
    pub debt_id: Option<String>,
    pub warnings: Vec<WorkflowWarning>,
}

/// Query parameters the gateway sends to the return endpoint
#[derive(Debug, Clone)]
pub struct GatewayReturn {
    pub result_code: String,
    pub transaction_status: String,
    /// Role of whoever is looking at the return page; only used for the
    /// redirect target when no session exists
    pub viewer_role: StaffRole,
}

/// What the gateway return handler concluded
#[derive(Debug, PartialEq)]
pub enum GatewayReturnResult {
    /// Gateway reported success; the order was reconciled
    Completed {
        order_status: OrderStatus,
        debt_id: Option<String>,
    },
    /// Gateway reported failure or cancellation
    Failed,
    /// No session was pending; nothing happened
    NotInProgress,
}

/// Full outcome of a gateway return, including where to send the user
#[derive(Debug)]
pub struct GatewayReturnOutcome {
    pub result: GatewayReturnResult,
    pub warnings: Vec<WorkflowWarning>,
    pub redirect_to: &'static str,
}

/// Payment workflow service
pub struct PaymentService {
    api: Arc<dyn DealerApi>,
    sessions: Arc<dyn PendingSessionStorage>,
    reconciliation_policy: ReconciliationPolicy,
}

impl PaymentService {
    pub fn new(
        api: Arc<dyn DealerApi>,
        sessions: Arc<dyn PendingSessionStorage>,
        reconciliation_policy: ReconciliationPolicy,
    ) -> Self {
        Self {
            api,
            sessions,
            reconciliation_policy,
        }
    }

    /// Look up the order, then dispatch the payment for it.
    pub async fn submit_for_order(
        &self,
        order_id: &str,
        method: PaymentMethod,
        terms: PaymentTerms,
        role: StaffRole,
    ) -> Result<PaymentOutcome, PaymentError> {
        let order = self
            .api
            .fetch_order(order_id)
            .await
            .map_err(|e| PaymentError::step(PaymentStep::FetchOrder, e))?;
        let request = PaymentRequest {
            order_id: order_id.to_string(),
            total_order_amount: order.total_amount,
            method,
            terms,
        };
        self.submit(request, role).await
    }

    /// Dispatch a payment to its rail.
    ///
    /// Validation happens before any network call; in particular a gateway
    /// payment below the gateway minimum is rejected locally.
    pub async fn submit(
        &self,
        request: PaymentRequest,
        role: StaffRole,
    ) -> Result<PaymentOutcome, PaymentError> {
        let submission_id = Uuid::new_v4();
        info!(
            "Payment submission {}: order {} via {:?}, amount {}",
            submission_id,
            request.order_id,
            request.method,
            request.computed_amount()
        );

        match request.method {
            PaymentMethod::Cash => Ok(PaymentOutcome::Settled(
                self.settle_cash(&request, role).await?,
            )),
            PaymentMethod::GatewayRedirect => self.begin_gateway(&request, role).await,
        }
    }

    /// Cash rail: create payment, update order status, conditionally create
    /// the debt record. Each step's success gates the next.
    async fn settle_cash(
        &self,
        request: &PaymentRequest,
        role: StaffRole,
    ) -> Result<CashSettlement, PaymentError> {
        let amount = request.computed_amount();
        let created = self
            .api
            .create_payment(
                &request.order_id,
                amount,
                PaymentMethod::Cash,
                request.terms.payment_type(),
            )
            .await
            .map_err(|e| PaymentError::step(PaymentStep::CreatePayment, e))?;

        let mut warnings = Vec::new();
        let order_status = request.terms.settled_order_status();
        let status_updated = self
            .update_status_with_policy(&request.order_id, order_status, &mut warnings)
            .await;

        let mut debt_id = None;
        if status_updated
            && request.terms.payment_type() == PaymentType::Installment
            && role.creates_debt_on_installment()
        {
            debt_id = self
                .create_debt_with_warning(&created.payment_id, &mut warnings)
                .await;
        }

        Ok(CashSettlement {
            payment_id: created.payment_id,
            order_status,
            status_updated,
            debt_id,
            warnings,
        })
    }

    /// Gateway rail: validate, create the gateway payment, persist the
    /// session, and hand back the redirect URL.
    ///
    /// The session write is the last thing that happens before the browser
    /// leaves; nothing asynchronous can touch the slot afterwards.
    async fn begin_gateway(
        &self,
        request: &PaymentRequest,
        role: StaffRole,
    ) -> Result<PaymentOutcome, PaymentError> {
        let amount = request.computed_amount();
        if amount < MIN_GATEWAY_AMOUNT {
            return Err(PaymentError::Validation(format!(
                "gateway payments require at least {} (computed amount is {})",
                MIN_GATEWAY_AMOUNT, amount
            )));
        }

        let created = self
            .api
            .create_gateway_payment(&request.order_id, amount, request.terms.payment_type())
            .await
            .map_err(|e| PaymentError::step(PaymentStep::CreateGatewayPayment, e))?;

        let session = PendingGatewaySession {
            order_id: request.order_id.clone(),
            payment_type: request.terms.payment_type(),
            installment_percentage: request
                .terms
                .installment_percentage()
                .map(|p| p.as_u8()),
            payment_id: created.payment_id.clone(),
            initiating_role: role,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.sessions
            .store_session(&session)
            .map_err(|e| PaymentError::step(PaymentStep::PersistSession, e))?;

        info!(
            "Gateway payment created for order {}; redirecting",
            request.order_id
        );
        Ok(PaymentOutcome::RedirectToGateway {
            pay_url: created.pay_url,
        })
    }

    /// Handle the browser returning from the gateway.
    ///
    /// The session is consumed before any branching, so re-invoking this
    /// with no session present (reload, back-button, duplicate callback) is
    /// a safe no-op.
    pub async fn handle_gateway_return(
        &self,
        ret: GatewayReturn,
    ) -> anyhow::Result<GatewayReturnOutcome> {
        let session = match self.sessions.take_session()? {
            Some(session) => session,
            None => {
                info!("Gateway return with no pending session; ignoring");
                return Ok(GatewayReturnOutcome {
                    result: GatewayReturnResult::NotInProgress,
                    warnings: Vec::new(),
                    redirect_to: ret.viewer_role.orders_destination(),
                });
            }
        };

        let redirect_to = session.initiating_role.orders_destination();
        let success = ret.result_code == GATEWAY_SUCCESS_RESULT_CODE
            && ret.transaction_status == GATEWAY_SUCCESS_TRANSACTION_STATUS;

        if !success {
            info!(
                "Gateway reported failure for order {} (resultCode={}, transactionStatus={})",
                session.order_id, ret.result_code, ret.transaction_status
            );
            return Ok(GatewayReturnOutcome {
                result: GatewayReturnResult::Failed,
                warnings: Vec::new(),
                redirect_to,
            });
        }

        let order_status = match session.payment_type {
            PaymentType::Full => OrderStatus::Paid,
            PaymentType::Installment => OrderStatus::Partial,
        };

        let mut warnings = Vec::new();
        self.update_status_with_policy(&session.order_id, order_status, &mut warnings)
            .await;

        let mut debt_id = None;
        if session.payment_type == PaymentType::Installment
            && session.initiating_role.creates_debt_on_installment()
        {
            match &session.payment_id {
                Some(payment_id) => {
                    debt_id = self.create_debt_with_warning(payment_id, &mut warnings).await;
                }
                None => {
                    warn!(
                        "No payment id recorded for order {}; skipping debt creation",
                        session.order_id
                    );
                }
            }
        }

        Ok(GatewayReturnOutcome {
            result: GatewayReturnResult::Completed {
                order_status,
                debt_id,
            },
            warnings,
            redirect_to,
        })
    }

    /// Update the order status; a failure after the money has moved is a
    /// warning flagged for manual reconciliation, never a hard error.
    /// Returns whether the update went through.
    async fn update_status_with_policy(
        &self,
        order_id: &str,
        status: OrderStatus,
        warnings: &mut Vec<WorkflowWarning>,
    ) -> bool {
        let mut attempt = self.api.update_order_status(order_id, status).await;
        if attempt.is_err() && self.reconciliation_policy == ReconciliationPolicy::RetryOnce {
            warn!(
                "Order status update failed for {}; retrying once",
                order_id
            );
            attempt = self.api.update_order_status(order_id, status).await;
        }
        match attempt {
            Ok(()) => true,
            Err(err) => {
                error!("Order status update failed for {}: {:#}", order_id, err);
                warnings.push(WorkflowWarning::StatusUpdateFailed {
                    order_id: order_id.to_string(),
                    detail: format!("{:#}", err),
                });
                false
            }
        }
    }

    /// Create the debt record; a failure is a warning because the payment
    /// is already committed and must not be rolled back here.
    async fn create_debt_with_warning(
        &self,
        payment_id: &str,
        warnings: &mut Vec<WorkflowWarning>,
    ) -> Option<String> {
        match self.api.create_debt_from_payment(payment_id).await {
            Ok(debt) => {
                info!("Debt {} created for payment {}", debt.debt_id, payment_id);
                Some(debt.debt_id)
            }
            Err(err) => {
                error!("Debt creation failed for payment {}: {:#}", payment_id, err);
                warnings.push(WorkflowWarning::DebtCreationFailed {
                    payment_id: payment_id.to_string(),
                    detail: format!("{:#}", err),
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{DebtCreated, GatewayPaymentCreated, PaymentCreated};
    use crate::domain::models::{
        Appointment, InstallmentPercentage, OrderSummary,
    };
    use crate::storage::{SessionRepository, YamlConnection};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// DealerApi double that records every call in order and can be told
    /// to fail individual operations.
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
        order_total: i64,
        fail_create_payment: bool,
        fail_status_update: bool,
        fail_debt: bool,
        fail_gateway: bool,
    }

    impl RecordingApi {
        fn with_order_total(total: i64) -> Self {
            Self {
                order_total: total,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl DealerApi for RecordingApi {
        async fn fetch_appointments(&self, dealer_id: &str) -> Result<Vec<Appointment>> {
            self.record(format!("fetch_appointments:{}", dealer_id));
            Ok(Vec::new())
        }

        async fn fetch_order(&self, order_id: &str) -> Result<OrderSummary> {
            self.record(format!("fetch_order:{}", order_id));
            Ok(OrderSummary {
                order_id: order_id.to_string(),
                total_amount: self.order_total,
                customer_label: "Customer".to_string(),
            })
        }

        async fn create_payment(
            &self,
            order_id: &str,
            amount: i64,
            method: PaymentMethod,
            payment_type: PaymentType,
        ) -> Result<PaymentCreated> {
            self.record(format!(
                "create_payment:{}:{}:{:?}:{:?}",
                order_id, amount, method, payment_type
            ));
            if self.fail_create_payment {
                return Err(anyhow!("payment service down"));
            }
            Ok(PaymentCreated {
                payment_id: "pay-1".to_string(),
            })
        }

        async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
            self.record(format!("update_order_status:{}:{:?}", order_id, status));
            if self.fail_status_update {
                return Err(anyhow!("order service down"));
            }
            Ok(())
        }

        async fn create_debt_from_payment(&self, payment_id: &str) -> Result<DebtCreated> {
            self.record(format!("create_debt:{}", payment_id));
            if self.fail_debt {
                return Err(anyhow!("debt service down"));
            }
            Ok(DebtCreated {
                debt_id: "debt-1".to_string(),
            })
        }

        async fn create_gateway_payment(
            &self,
            order_id: &str,
            amount: i64,
            payment_type: PaymentType,
        ) -> Result<GatewayPaymentCreated> {
            self.record(format!(
                "create_gateway_payment:{}:{}:{:?}",
                order_id, amount, payment_type
            ));
            if self.fail_gateway {
                return Err(anyhow!("gateway down"));
            }
            Ok(GatewayPaymentCreated {
                pay_url: "https://gateway.example/pay/abc".to_string(),
                payment_id: Some("pay-gw-1".to_string()),
            })
        }
    }

    struct Harness {
        api: Arc<RecordingApi>,
        sessions: Arc<SessionRepository>,
        service: PaymentService,
        _dir: TempDir,
    }

    fn harness(api: RecordingApi) -> Harness {
        harness_with_policy(api, ReconciliationPolicy::FlagForManual)
    }

    fn harness_with_policy(api: RecordingApi, policy: ReconciliationPolicy) -> Harness {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(api);
        let sessions = Arc::new(SessionRepository::new(
            YamlConnection::new(dir.path()).unwrap(),
        ));
        let service = PaymentService::new(api.clone(), sessions.clone(), policy);
        Harness {
            api,
            sessions,
            service,
            _dir: dir,
        }
    }

    fn cash_request(total: i64, terms: PaymentTerms) -> PaymentRequest {
        PaymentRequest {
            order_id: "order-1".to_string(),
            total_order_amount: total,
            method: PaymentMethod::Cash,
            terms,
        }
    }

    fn gateway_request(total: i64, terms: PaymentTerms) -> PaymentRequest {
        PaymentRequest {
            order_id: "order-1".to_string(),
            total_order_amount: total,
            method: PaymentMethod::GatewayRedirect,
            terms,
        }
    }

    fn success_return(role: StaffRole) -> GatewayReturn {
        GatewayReturn {
            result_code: "00".to_string(),
            transaction_status: "00".to_string(),
            viewer_role: role,
        }
    }

    #[tokio::test]
    async fn cash_full_payment_settles_without_a_debt() {
        let h = harness(RecordingApi::default());
        let outcome = h
            .service
            .submit(
                cash_request(2_000_000, PaymentTerms::Full),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();

        let settlement = match outcome {
            PaymentOutcome::Settled(settlement) => settlement,
            other => panic!("expected cash settlement, got {:?}", other),
        };
        assert_eq!(settlement.payment_id, "pay-1");
        assert_eq!(settlement.order_status, OrderStatus::Paid);
        assert!(settlement.status_updated);
        assert!(settlement.debt_id.is_none());
        assert!(settlement.warnings.is_empty());

        assert_eq!(
            h.api.calls(),
            vec![
                "create_payment:order-1:2000000:Cash:Full".to_string(),
                "update_order_status:order-1:Paid".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn cash_installment_by_dealer_staff_creates_a_debt() {
        let h = harness(RecordingApi::default());
        let outcome = h
            .service
            .submit(
                cash_request(
                    1_000_000,
                    PaymentTerms::Installment(InstallmentPercentage::P30),
                ),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();

        let settlement = match outcome {
            PaymentOutcome::Settled(settlement) => settlement,
            other => panic!("expected cash settlement, got {:?}", other),
        };
        assert_eq!(settlement.order_status, OrderStatus::Partial);
        assert_eq!(settlement.debt_id.as_deref(), Some("debt-1"));

        assert_eq!(
            h.api.calls(),
            vec![
                "create_payment:order-1:300000:Cash:Installment".to_string(),
                "update_order_status:order-1:Partial".to_string(),
                "create_debt:pay-1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn cash_installment_by_other_roles_skips_the_debt() {
        for role in [
            StaffRole::Admin,
            StaffRole::EvmStaff,
            StaffRole::DealerManager,
        ] {
            let h = harness(RecordingApi::default());
            h.service
                .submit(
                    cash_request(
                        1_000_000,
                        PaymentTerms::Installment(InstallmentPercentage::P30),
                    ),
                    role,
                )
                .await
                .unwrap();
            assert!(
                !h.api.calls().iter().any(|call| call.starts_with("create_debt")),
                "role {:?} must not create a debt",
                role
            );
        }
    }

    #[tokio::test]
    async fn cash_payment_creation_failure_is_a_step_error() {
        let h = harness(RecordingApi {
            fail_create_payment: true,
            ..RecordingApi::default()
        });
        let err = h
            .service
            .submit(
                cash_request(2_000_000, PaymentTerms::Full),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap_err();
        match err {
            PaymentError::Step { step, .. } => assert_eq!(step, PaymentStep::CreatePayment),
            other => panic!("expected step error, got {:?}", other),
        }
        // Nothing after the failed step ran.
        assert_eq!(h.api.calls().len(), 1);
    }

    #[tokio::test]
    async fn cash_status_update_failure_warns_and_gates_the_debt() {
        let h = harness(RecordingApi {
            fail_status_update: true,
            ..RecordingApi::default()
        });
        let outcome = h
            .service
            .submit(
                cash_request(
                    1_000_000,
                    PaymentTerms::Installment(InstallmentPercentage::P30),
                ),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();

        let settlement = match outcome {
            PaymentOutcome::Settled(settlement) => settlement,
            other => panic!("expected cash settlement, got {:?}", other),
        };
        // The payment exists, so this is a warning, not an error.
        assert!(!settlement.status_updated);
        assert!(settlement.debt_id.is_none());
        assert_eq!(settlement.warnings.len(), 1);
        assert!(matches!(
            settlement.warnings[0],
            WorkflowWarning::StatusUpdateFailed { .. }
        ));
        assert!(
            !h.api.calls().iter().any(|call| call.starts_with("create_debt")),
            "debt creation is gated on the status update"
        );
    }

    #[tokio::test]
    async fn retry_once_policy_retries_the_status_update() {
        let h = harness_with_policy(
            RecordingApi {
                fail_status_update: true,
                ..RecordingApi::default()
            },
            ReconciliationPolicy::RetryOnce,
        );
        h.service
            .submit(
                cash_request(2_000_000, PaymentTerms::Full),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();
        let status_calls = h
            .api
            .calls()
            .iter()
            .filter(|call| call.starts_with("update_order_status"))
            .count();
        assert_eq!(status_calls, 2);
    }

    #[tokio::test]
    async fn debt_failure_is_a_warning_not_an_error() {
        let h = harness(RecordingApi {
            fail_debt: true,
            ..RecordingApi::default()
        });
        let outcome = h
            .service
            .submit(
                cash_request(
                    1_000_000,
                    PaymentTerms::Installment(InstallmentPercentage::P30),
                ),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();
        let settlement = match outcome {
            PaymentOutcome::Settled(settlement) => settlement,
            other => panic!("expected cash settlement, got {:?}", other),
        };
        assert!(settlement.status_updated);
        assert!(settlement.debt_id.is_none());
        assert!(matches!(
            settlement.warnings[0],
            WorkflowWarning::DebtCreationFailed { .. }
        ));
    }

    #[tokio::test]
    async fn sub_minimum_gateway_amount_is_rejected_with_zero_network_calls() {
        let h = harness(RecordingApi::default());
        let err = h
            .service
            .submit(
                gateway_request(5_000, PaymentTerms::Full),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Validation(_)));
        assert!(h.api.calls().is_empty());
        assert_eq!(h.sessions.take_session().unwrap(), None);
    }

    #[tokio::test]
    async fn gateway_submission_persists_the_session_and_redirects() {
        let h = harness(RecordingApi::default());
        let outcome = h
            .service
            .submit(
                gateway_request(
                    1_000_000,
                    PaymentTerms::Installment(InstallmentPercentage::P40),
                ),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();

        match outcome {
            PaymentOutcome::RedirectToGateway { pay_url } => {
                assert_eq!(pay_url, "https://gateway.example/pay/abc");
            }
            other => panic!("expected redirect, got {:?}", other),
        }
        assert_eq!(
            h.api.calls(),
            vec!["create_gateway_payment:order-1:400000:Installment".to_string()]
        );

        let session = h.sessions.take_session().unwrap().unwrap();
        assert_eq!(session.order_id, "order-1");
        assert_eq!(session.payment_type, PaymentType::Installment);
        assert_eq!(session.installment_percentage, Some(40));
        assert_eq!(session.payment_id.as_deref(), Some("pay-gw-1"));
        assert_eq!(session.initiating_role, StaffRole::DealerStaff);
    }

    #[tokio::test]
    async fn gateway_creation_failure_leaves_no_session_behind() {
        let h = harness(RecordingApi {
            fail_gateway: true,
            ..RecordingApi::default()
        });
        let err = h
            .service
            .submit(
                gateway_request(1_000_000, PaymentTerms::Full),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap_err();
        match err {
            PaymentError::Step { step, .. } => {
                assert_eq!(step, PaymentStep::CreateGatewayPayment)
            }
            other => panic!("expected step error, got {:?}", other),
        }
        assert_eq!(h.sessions.take_session().unwrap(), None);
    }

    #[tokio::test]
    async fn successful_return_updates_status_then_creates_the_debt() {
        let h = harness(RecordingApi::default());
        h.service
            .submit(
                gateway_request(
                    1_000_000,
                    PaymentTerms::Installment(InstallmentPercentage::P40),
                ),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();

        let outcome = h
            .service
            .handle_gateway_return(success_return(StaffRole::DealerStaff))
            .await
            .unwrap();

        assert_eq!(
            outcome.result,
            GatewayReturnResult::Completed {
                order_status: OrderStatus::Partial,
                debt_id: Some("debt-1".to_string()),
            }
        );
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.redirect_to, "/dealer/orders");

        // Status update strictly precedes debt creation.
        assert_eq!(
            h.api.calls(),
            vec![
                "create_gateway_payment:order-1:400000:Installment".to_string(),
                "update_order_status:order-1:Partial".to_string(),
                "create_debt:pay-gw-1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn return_handling_consumes_the_session_exactly_once() {
        let h = harness(RecordingApi::default());
        h.service
            .submit(
                gateway_request(
                    1_000_000,
                    PaymentTerms::Installment(InstallmentPercentage::P40),
                ),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();

        let first = h
            .service
            .handle_gateway_return(success_return(StaffRole::DealerStaff))
            .await
            .unwrap();
        assert!(matches!(first.result, GatewayReturnResult::Completed { .. }));
        let calls_after_first = h.api.calls();

        // A reload of the return page: nothing happens, nothing repeats.
        let second = h
            .service
            .handle_gateway_return(success_return(StaffRole::DealerStaff))
            .await
            .unwrap();
        assert_eq!(second.result, GatewayReturnResult::NotInProgress);
        assert_eq!(h.api.calls(), calls_after_first);
    }

    #[tokio::test]
    async fn full_gateway_payment_reconciles_to_paid_without_a_debt() {
        let h = harness(RecordingApi::default());
        h.service
            .submit(
                gateway_request(1_000_000, PaymentTerms::Full),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();

        let outcome = h
            .service
            .handle_gateway_return(success_return(StaffRole::DealerStaff))
            .await
            .unwrap();
        assert_eq!(
            outcome.result,
            GatewayReturnResult::Completed {
                order_status: OrderStatus::Paid,
                debt_id: None,
            }
        );
        assert!(
            !h.api.calls().iter().any(|call| call.starts_with("create_debt")),
            "full payments never create debts"
        );
    }

    #[tokio::test]
    async fn failure_codes_clear_the_session_and_touch_nothing() {
        let h = harness(RecordingApi::default());
        h.service
            .submit(
                gateway_request(1_000_000, PaymentTerms::Full),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();
        let calls_before = h.api.calls();

        let outcome = h
            .service
            .handle_gateway_return(GatewayReturn {
                result_code: "24".to_string(),
                transaction_status: "02".to_string(),
                viewer_role: StaffRole::DealerStaff,
            })
            .await
            .unwrap();

        assert_eq!(outcome.result, GatewayReturnResult::Failed);
        // No status update, no debt.
        assert_eq!(h.api.calls(), calls_before);
        // Session is gone: the next return is a no-op.
        assert_eq!(h.sessions.take_session().unwrap(), None);
    }

    #[tokio::test]
    async fn return_with_no_session_redirects_by_viewer_role() {
        let h = harness(RecordingApi::default());
        let outcome = h
            .service
            .handle_gateway_return(success_return(StaffRole::Admin))
            .await
            .unwrap();
        assert_eq!(outcome.result, GatewayReturnResult::NotInProgress);
        assert_eq!(outcome.redirect_to, "/admin/orders");
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn return_debt_failure_warns_but_still_completes() {
        let h = harness(RecordingApi {
            fail_debt: true,
            ..RecordingApi::default()
        });
        h.service
            .submit(
                gateway_request(
                    1_000_000,
                    PaymentTerms::Installment(InstallmentPercentage::P40),
                ),
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();

        let outcome = h
            .service
            .handle_gateway_return(success_return(StaffRole::DealerStaff))
            .await
            .unwrap();
        assert_eq!(
            outcome.result,
            GatewayReturnResult::Completed {
                order_status: OrderStatus::Partial,
                debt_id: None,
            }
        );
        assert!(matches!(
            outcome.warnings[0],
            WorkflowWarning::DebtCreationFailed { .. }
        ));
    }

    #[tokio::test]
    async fn submit_for_order_uses_the_fetched_total() {
        let h = harness(RecordingApi::with_order_total(2_000_000));
        h.service
            .submit_for_order(
                "order-9",
                PaymentMethod::Cash,
                PaymentTerms::Full,
                StaffRole::DealerStaff,
            )
            .await
            .unwrap();
        assert_eq!(
            h.api.calls(),
            vec![
                "fetch_order:order-9".to_string(),
                "create_payment:order-9:2000000:Cash:Full".to_string(),
                "update_order_status:order-9:Paid".to_string(),
            ]
        );
    }
}
