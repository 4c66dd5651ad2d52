//! # Dealer Portal Backend
//!
//! Backend-for-frontend service for the vehicle-dealer administration
//! dashboard. It owns the two pieces of logic the dashboard leans on:
//!
//! - **Calendar engine** (`domain::schedule_grid`, `domain::calendar_service`):
//!   projects test-drive appointments onto day/week time-slot grids and
//!   month/year summary cells, and drives calendar navigation.
//! - **Payment workflow** (`domain::payment_service`): computes payable
//!   amounts, dispatches to the cash or gateway rail, and reconciles the
//!   order after the gateway redirects back, with exactly-once consumption
//!   of the pending-session slot.
//!
//! All order, payment, and appointment data lives on the remote dealer
//! platform, reached through the [`clients::DealerApi`] trait. The only
//! local durable state is the single pending-gateway-session file managed
//! by the [`storage`] layer.

pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod rest;
pub mod storage;
