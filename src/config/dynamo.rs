//! DynamoDB connection configuration.

use serde::Deserialize;

/// Connection settings for DynamoDB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DynamoConfig {
    /// AWS region (e.g., "us-east-1"). Uses the default provider chain if not set.
    pub region: Option<String>,
    /// Custom endpoint URL (for DynamoDB Local, e.g. `http://localhost:8000`).
    pub endpoint_url: Option<String>,
    /// Per-operation timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl DynamoConfig {
    /// Set AWS region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set custom endpoint URL.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set per-operation timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}
