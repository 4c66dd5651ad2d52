//! YAML-backed pending-session repository.
//!
//! The slot must survive the browser's round trip to the payment gateway,
//! which outlives any in-process state, so it is a file rather than memory.
//! Consumption is read-then-delete under a lock: once `take_session`
//! returns, the file is gone no matter what the caller does next.

use std::fs;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use super::connection::YamlConnection;
use crate::domain::models::PendingGatewaySession;
use crate::storage::traits::PendingSessionStorage;

/// File-based single-slot session store
#[derive(Clone)]
pub struct SessionRepository {
    connection: YamlConnection,
    /// Serializes store/take/clear so read-then-delete stays one step
    lock: Arc<Mutex<()>>,
}

impl SessionRepository {
    pub fn new(connection: YamlConnection) -> Self {
        Self {
            connection,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Write the slot atomically: serialize to a temp file in the same
    /// directory, then rename over the target.
    fn write_slot(&self, session: &PendingGatewaySession) -> Result<()> {
        let path = self.connection.pending_session_path();
        let yaml = serde_yaml::to_string(session).context("serializing pending session")?;

        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml).context("writing pending session temp file")?;
        fs::rename(&temp_path, &path).context("replacing pending session file")?;

        debug!("Stored pending gateway session at {:?}", path);
        Ok(())
    }
}

impl PendingSessionStorage for SessionRepository {
    fn store_session(&self, session: &PendingGatewaySession) -> Result<()> {
        let _guard = self.lock.lock().unwrap();
        info!(
            "Persisting pending gateway session for order {}",
            session.order_id
        );
        self.write_slot(session)
    }

    fn take_session(&self) -> Result<Option<PendingGatewaySession>> {
        let _guard = self.lock.lock().unwrap();
        let path = self.connection.pending_session_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).context("reading pending session file")?;
        // Delete before parsing: a reload must never see this session
        // again, even if the content turns out to be unreadable.
        fs::remove_file(&path).context("clearing pending session file")?;

        match serde_yaml::from_str::<PendingGatewaySession>(&content) {
            Ok(session) => {
                info!(
                    "Consumed pending gateway session for order {}",
                    session.order_id
                );
                Ok(Some(session))
            }
            Err(err) => {
                warn!("Pending session file was unreadable and has been cleared: {}", err);
                Err(err).context("parsing pending session file")
            }
        }
    }

    fn clear_session(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap();
        let path = self.connection.pending_session_path();
        if path.exists() {
            fs::remove_file(&path).context("clearing pending session file")?;
            debug!("Cleared pending gateway session");
        }
        Ok(())
    }
}
