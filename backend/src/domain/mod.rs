//! # Domain Module
//!
//! Business logic for the dealer dashboard, independent of the REST layer
//! and of any particular storage or HTTP client.
//!
//! - **schedule_grid**: pure time-slot math placing appointments on the
//!   day/week grids
//! - **calendar_service**: navigation state machine and assembly of the
//!   week/day/month/year views
//! - **payment_service**: the payment reconciliation workflow across the
//!   cash and gateway rails
//! - **models**: domain models for appointments, orders, payments, and the
//!   pending gateway session

pub mod calendar_service;
pub mod models;
pub mod payment_service;
pub mod schedule_grid;

pub use calendar_service::CalendarService;
pub use payment_service::PaymentService;
