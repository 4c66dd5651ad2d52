//! REST API layer for the dashboard frontend.
//!
//! Handlers translate between transport and the domain services; no
//! workflow error escapes as a panic, and partial-success warnings ride
//! along in the response body instead of turning into failures.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::{
    CalendarNavigationRequest, GatewayReturnResponse, GatewayReturnStatus, PaymentSubmitRequest,
    PaymentSubmitResponse, StaffRole,
};
use tracing::{error, info};

use crate::clients::DealerApi;
use crate::domain::models::PaymentTerms;
use crate::domain::payment_service::{
    GatewayReturn, GatewayReturnResult, PaymentOutcome,
};
use crate::domain::{CalendarService, PaymentService};
use crate::error::PaymentError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub calendar_service: Arc<CalendarService>,
    pub payment_service: Arc<PaymentService>,
    pub api: Arc<dyn DealerApi>,
}

impl AppState {
    pub fn new(
        calendar_service: Arc<CalendarService>,
        payment_service: Arc<PaymentService>,
        api: Arc<dyn DealerApi>,
    ) -> Self {
        Self {
            calendar_service,
            payment_service,
            api,
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/appointments", get(get_appointments))
        .route("/api/calendar/week", get(get_week))
        .route("/api/calendar/day", get(get_day))
        .route("/api/calendar/month", get(get_month))
        .route("/api/calendar/year", get(get_year))
        .route("/api/calendar/view", get(get_view).post(post_view))
        .route("/api/payments", post(post_payment))
        .route("/api/payments/gateway-return", get(gateway_return))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Deserialize, Debug)]
struct DealerQuery {
    dealer_id: String,
}

/// GET /api/appointments
async fn get_appointments(
    State(state): State<AppState>,
    Query(query): Query<DealerQuery>,
) -> impl IntoResponse {
    info!("GET /api/appointments - {:?}", query);
    let list = state
        .calendar_service
        .appointment_list_for_dealer(state.api.as_ref(), &query.dealer_id)
        .await;
    Json(list)
}

#[derive(Deserialize, Debug)]
struct DealerDateQuery {
    dealer_id: String,
    /// Defaults to the current navigation reference date
    date: Option<NaiveDate>,
}

/// GET /api/calendar/week
async fn get_week(
    State(state): State<AppState>,
    Query(query): Query<DealerDateQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/week - {:?}", query);
    let date = query
        .date
        .unwrap_or_else(|| state.calendar_service.view_state().reference_date);
    let grid = state
        .calendar_service
        .week_grid_for_dealer(state.api.as_ref(), &query.dealer_id, date)
        .await;
    Json(grid)
}

/// GET /api/calendar/day
async fn get_day(
    State(state): State<AppState>,
    Query(query): Query<DealerDateQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/day - {:?}", query);
    let date = query
        .date
        .unwrap_or_else(|| state.calendar_service.view_state().reference_date);
    let grid = state
        .calendar_service
        .day_grid_for_dealer(state.api.as_ref(), &query.dealer_id, date)
        .await;
    Json(grid)
}

#[derive(Deserialize, Debug)]
struct MonthQuery {
    dealer_id: String,
    month: u32,
    year: u32,
}

/// GET /api/calendar/month
async fn get_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/month - {:?}", query);
    if !(1..=12).contains(&query.month) {
        return (
            StatusCode::BAD_REQUEST,
            format!("invalid month: {}", query.month),
        )
            .into_response();
    }
    let summary = state
        .calendar_service
        .month_summary_for_dealer(state.api.as_ref(), &query.dealer_id, query.month, query.year)
        .await;
    Json(summary).into_response()
}

#[derive(Deserialize, Debug)]
struct YearQuery {
    dealer_id: String,
    year: u32,
}

/// GET /api/calendar/year
async fn get_year(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/year - {:?}", query);
    let summary = state
        .calendar_service
        .year_summary_for_dealer(state.api.as_ref(), &query.dealer_id, query.year)
        .await;
    Json(summary)
}

/// GET /api/calendar/view
async fn get_view(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.calendar_service.view_response())
}

/// POST /api/calendar/view
async fn post_view(
    State(state): State<AppState>,
    Json(request): Json<CalendarNavigationRequest>,
) -> impl IntoResponse {
    info!("POST /api/calendar/view - {:?}", request);
    match state.calendar_service.navigate(request) {
        Ok(response) => Json(response).into_response(),
        Err(message) => (StatusCode::BAD_REQUEST, message).into_response(),
    }
}

/// POST /api/payments
async fn post_payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentSubmitRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/payments - order {} via {:?}",
        request.order_id, request.payment_method
    );

    let terms =
        match PaymentTerms::from_parts(request.payment_type, request.installment_percentage) {
            Ok(terms) => terms,
            Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
        };

    let outcome = state
        .payment_service
        .submit_for_order(
            &request.order_id,
            request.payment_method,
            terms,
            request.initiating_role,
        )
        .await;

    match outcome {
        Ok(PaymentOutcome::Settled(settlement)) => Json(PaymentSubmitResponse::Settled {
            payment_id: settlement.payment_id,
            order_status: settlement.order_status,
            debt_id: settlement.debt_id,
            warnings: settlement
                .warnings
                .iter()
                .map(|warning| warning.to_string())
                .collect(),
        })
        .into_response(),
        Ok(PaymentOutcome::RedirectToGateway { pay_url }) => {
            Json(PaymentSubmitResponse::RedirectToGateway { pay_url }).into_response()
        }
        Err(PaymentError::Validation(message)) => {
            (StatusCode::BAD_REQUEST, message).into_response()
        }
        Err(err @ PaymentError::Step { .. }) => {
            error!("Payment submission failed: {}", err);
            (StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
    }
}

#[derive(Deserialize, Debug)]
struct GatewayReturnQuery {
    #[serde(rename = "resultCode")]
    result_code: Option<String>,
    #[serde(rename = "transactionStatus")]
    transaction_status: Option<String>,
    /// Role of the viewer, for the no-session redirect target
    role: Option<StaffRole>,
}

/// GET /api/payments/gateway-return
async fn gateway_return(
    State(state): State<AppState>,
    Query(query): Query<GatewayReturnQuery>,
) -> impl IntoResponse {
    info!("GET /api/payments/gateway-return - {:?}", query);

    let params = GatewayReturn {
        result_code: query.result_code.unwrap_or_default(),
        transaction_status: query.transaction_status.unwrap_or_default(),
        viewer_role: query.role.unwrap_or(StaffRole::DealerStaff),
    };

    match state.payment_service.handle_gateway_return(params).await {
        Ok(outcome) => {
            let (status, order_status, debt_id) = match outcome.result {
                GatewayReturnResult::Completed {
                    order_status,
                    debt_id,
                } => (GatewayReturnStatus::Completed, Some(order_status), debt_id),
                GatewayReturnResult::Failed => (GatewayReturnStatus::Failed, None, None),
                GatewayReturnResult::NotInProgress => {
                    (GatewayReturnStatus::NotInProgress, None, None)
                }
            };
            Json(GatewayReturnResponse {
                status,
                order_status,
                debt_id,
                warnings: outcome
                    .warnings
                    .iter()
                    .map(|warning| warning.to_string())
                    .collect(),
                redirect_to: outcome.redirect_to.to_string(),
            })
            .into_response()
        }
        Err(err) => {
            error!("Gateway return handling failed: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "gateway return handling failed".to_string(),
            )
                .into_response()
        }
    }
}
