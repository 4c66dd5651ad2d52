//! HTTP implementation of the dealer platform client.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use log::warn;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use shared::{OrderStatus, PaymentMethod, PaymentType};
use tracing::debug;

use crate::domain::models::{Appointment, AppointmentStatus, OrderSummary};

use super::{DealerApi, DebtCreated, GatewayPaymentCreated, PaymentCreated};

/// Dealer platform client over HTTP/JSON
pub struct HttpDealerApi {
    client: Client,
    base_url: String,
}

impl HttpDealerApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Deserialize a successful JSON response, or turn a non-success status
    /// into an error carrying the response body.
    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} request failed: {} - {}", what, status, body));
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("decoding {} response", what))
    }

    async fn ensure_success(response: reqwest::Response, what: &str) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} request failed: {} - {}", what, status, body));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentWire {
    id: String,
    scheduled_start: String,
    status: String,
    #[serde(default)]
    customer_label: String,
    #[serde(default)]
    vehicle_label: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderWire {
    total_amount: i64,
    #[serde(default)]
    customer_label: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentCreatedWire {
    payment_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebtCreatedWire {
    debt_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayPaymentWire {
    pay_url: String,
    #[serde(default)]
    payment_id: Option<String>,
}

/// Parse one wire appointment; `None` if the timestamp is unusable.
fn parse_appointment(wire: AppointmentWire) -> Option<Appointment> {
    match DateTime::parse_from_rfc3339(&wire.scheduled_start) {
        Ok(scheduled_start) => Some(Appointment {
            id: wire.id,
            scheduled_start,
            status: AppointmentStatus::parse(&wire.status),
            customer_label: wire.customer_label,
            vehicle_label: wire.vehicle_label,
            notes: wire.notes,
        }),
        Err(err) => {
            warn!(
                "Skipping appointment {} with unparseable start '{}': {}",
                wire.id, wire.scheduled_start, err
            );
            None
        }
    }
}

#[async_trait]
impl DealerApi for HttpDealerApi {
    async fn fetch_appointments(&self, dealer_id: &str) -> Result<Vec<Appointment>> {
        let url = self.url(&format!("/dealers/{}/appointments", dealer_id));
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await.context("fetching appointments")?;
        let wires: Vec<AppointmentWire> = Self::read_json(response, "appointments").await?;
        Ok(wires.into_iter().filter_map(parse_appointment).collect())
    }

    async fn fetch_order(&self, order_id: &str) -> Result<OrderSummary> {
        let url = self.url(&format!("/orders/{}", order_id));
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await.context("fetching order")?;
        let wire: OrderWire = Self::read_json(response, "order").await?;
        Ok(OrderSummary {
            order_id: order_id.to_string(),
            total_amount: wire.total_amount,
            customer_label: wire.customer_label,
        })
    }

    async fn create_payment(
        &self,
        order_id: &str,
        amount: i64,
        method: PaymentMethod,
        payment_type: PaymentType,
    ) -> Result<PaymentCreated> {
        let url = self.url("/payments");
        debug!("POST {} for order {}", url, order_id);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "orderId": order_id,
                "amount": amount,
                "method": method,
                "paymentType": payment_type,
            }))
            .send()
            .await
            .context("creating payment")?;
        let wire: PaymentCreatedWire = Self::read_json(response, "payment creation").await?;
        Ok(PaymentCreated {
            payment_id: wire.payment_id,
        })
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<()> {
        let url = self.url(&format!("/orders/{}/status", order_id));
        debug!("PUT {} -> {:?}", url, status);
        let response = self
            .client
            .put(&url)
            .json(&json!({ "status": status }))
            .send()
            .await
            .context("updating order status")?;
        Self::ensure_success(response, "order status update").await
    }

    async fn create_debt_from_payment(&self, payment_id: &str) -> Result<DebtCreated> {
        let url = self.url("/debts/from-payment");
        debug!("POST {} for payment {}", url, payment_id);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "paymentId": payment_id }))
            .send()
            .await
            .context("creating debt")?;
        let wire: DebtCreatedWire = Self::read_json(response, "debt creation").await?;
        Ok(DebtCreated {
            debt_id: wire.debt_id,
        })
    }

    async fn create_gateway_payment(
        &self,
        order_id: &str,
        amount: i64,
        payment_type: PaymentType,
    ) -> Result<GatewayPaymentCreated> {
        let url = self.url("/payments/gateway");
        debug!("POST {} for order {}", url, order_id);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "orderId": order_id,
                "amount": amount,
                "paymentType": payment_type,
            }))
            .send()
            .await
            .context("creating gateway payment")?;
        let wire: GatewayPaymentWire = Self::read_json(response, "gateway payment creation").await?;
        Ok(GatewayPaymentCreated {
            pay_url: wire.pay_url,
            payment_id: wire.payment_id,
        })
    }
}
