//! Connection to the file-based storage directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Owner of the data directory the YAML repositories write under
#[derive(Debug, Clone)]
pub struct YamlConnection {
    base_directory: PathBuf,
}

impl YamlConnection {
    /// Open (and create if missing) the data directory.
    pub fn new(base_directory: impl AsRef<Path>) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        fs::create_dir_all(&base_directory)?;
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the pending-gateway-session slot
    pub(crate) fn pending_session_path(&self) -> PathBuf {
        self.base_directory.join("pending_gateway_session.yaml")
    }
}
