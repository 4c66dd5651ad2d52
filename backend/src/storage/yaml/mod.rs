//! # YAML Storage Module
//!
//! File-based implementation of the pending-session slot: one YAML
//! document at the root of the data directory, written atomically via a
//! temp file and consumed with read-then-delete semantics.
//!
//! ## File layout
//!
//! ```text
//! data/
//! └── pending_gateway_session.yaml    ← single-slot mailbox
//! ```

pub mod connection;
pub mod session_repository;

pub use connection::YamlConnection;
pub use session_repository::SessionRepository;
