//! Runtime configuration, read from environment variables at startup.

use std::env;
use std::path::PathBuf;

/// What to do when the order-status update fails after a payment has
/// already been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationPolicy {
    /// Surface a warning and leave the mismatch for manual follow-up
    FlagForManual,
    /// Retry the status update once, then flag if it still fails
    RetryOnce,
}

impl ReconciliationPolicy {
    /// Parse the `RECONCILIATION_POLICY` value; unknown values fall back to
    /// flagging, never to retrying.
    pub fn parse(value: &str) -> Self {
        match value {
            "retry-once" => ReconciliationPolicy::RetryOnce,
            _ => ReconciliationPolicy::FlagForManual,
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote dealer platform API
    pub dealer_api_base_url: String,
    /// Directory holding the pending-gateway-session slot
    pub data_dir: PathBuf,
    /// Port the HTTP server binds to
    pub port: u16,
    pub reconciliation_policy: ReconciliationPolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let dealer_api_base_url = env::var("DEALER_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".to_string());

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(3000);

        let reconciliation_policy = env::var("RECONCILIATION_POLICY")
            .map(|value| ReconciliationPolicy::parse(&value))
            .unwrap_or(ReconciliationPolicy::FlagForManual);

        Self {
            dealer_api_base_url,
            data_dir,
            port,
            reconciliation_policy,
        }
    }
}
