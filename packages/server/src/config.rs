//! Runtime configuration of the relay server.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::domain::ConversationRecord;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound of every store call
    pub store_timeout: Duration,
    /// JSON file with the initial conversation documents
    pub seed: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            seed: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a seed document: a JSON array of conversation records.
pub fn parse_seed(json: &str) -> Result<Vec<ConversationRecord>, SeedError> {
    Ok(serde_json::from_str(json)?)
}

pub async fn load_seed(path: &std::path::Path) -> Result<Vec<ConversationRecord>, SeedError> {
    let json = tokio::fs::read_to_string(path).await?;
    parse_seed(&json)
}
