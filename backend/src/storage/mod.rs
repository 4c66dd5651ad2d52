//! # Storage Module
//!
//! The only durable state this service keeps is the pending gateway
//! session: a single-slot mailbox that survives the full-page redirect to
//! the payment gateway. Everything else lives on the remote dealer
//! platform.

pub mod traits;
pub mod yaml;

pub use traits::PendingSessionStorage;
pub use yaml::{SessionRepository, YamlConnection};
