//! # Storage Traits
//!
//! Abstraction over the pending-session slot so the payment workflow does
//! not care where the slot lives, only that it survives a full navigation
//! and can be consumed exactly once.

use anyhow::Result;

use crate::domain::models::PendingGatewaySession;

/// Single-slot store for the session carried across the gateway redirect.
///
/// Only the submission step writes the slot; only the return handler
/// consumes it. A second store before a take overwrites the first.
pub trait PendingSessionStorage: Send + Sync {
    /// Persist the session, replacing any existing one
    fn store_session(&self, session: &PendingGatewaySession) -> Result<()>;

    /// Read and delete the session in one step.
    ///
    /// The slot is cleared even when the stored content turns out to be
    /// unreadable, so a reload can never reprocess the same session.
    fn take_session(&self) -> Result<Option<PendingGatewaySession>>;

    /// Remove the session without reading it
    fn clear_session(&self) -> Result<()>;
}
