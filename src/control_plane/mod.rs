//! Table control-plane client.
//!
//! The provisioner talks to the store only through [`ControlPlane`]:
//! one existence probe and, for missing tables, one create call.
//!
//! Implementations:
//! - `DynamoControlPlane`: AWS DynamoDB (feature `dynamo`)
//! - `MockControlPlane`: in-memory tables for tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::schema::{AttributeDefinition, KeySchema, TableSchema};

#[cfg(feature = "dynamo")]
pub mod dynamo;
pub mod mock;

#[cfg(feature = "dynamo")]
pub use dynamo::DynamoControlPlane;
pub use mock::MockControlPlane;

/// Result type for control-plane calls.
pub type Result<T> = std::result::Result<T, ControlPlaneError>;

/// Errors reported by a control-plane client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlPlaneError {
    #[error("Table already exists: {0}")]
    AlreadyExists(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Lifecycle state of a remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TableState {
    Creating,
    Active,
    Updating,
    Deleting,
    Archived,
    Other(String),
}

impl std::fmt::Display for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableState::Creating => write!(f, "CREATING"),
            TableState::Active => write!(f, "ACTIVE"),
            TableState::Updating => write!(f, "UPDATING"),
            TableState::Deleting => write!(f, "DELETING"),
            TableState::Archived => write!(f, "ARCHIVED"),
            TableState::Other(state) => write!(f, "{}", state),
        }
    }
}

/// Identity and status of a remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub table_name: String,
    pub table_id: Option<String>,
    pub table_arn: Option<String>,
    pub status: TableState,
}

/// Attributes copied into a secondary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Projection {
    /// Every item attribute.
    All,
}

/// Capacity mode of a created table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BillingMode {
    /// On-demand capacity, no provisioned throughput.
    PayPerRequest,
}

/// One secondary index of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryIndex {
    pub index_name: String,
    pub key_schema: KeySchema,
    pub projection: Projection,
}

/// Everything needed to create a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTableRequest {
    pub table_name: String,
    pub key_schema: KeySchema,
    pub secondary_indexes: Vec<SecondaryIndex>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub billing_mode: BillingMode,
}

impl CreateTableRequest {
    /// Build an on-demand create request projecting all attributes into
    /// every secondary index.
    pub fn from_schema(table_name: impl Into<String>, schema: &TableSchema) -> Self {
        Self {
            table_name: table_name.into(),
            key_schema: schema.primary_key.clone(),
            secondary_indexes: index_list(&schema.secondary_indexes),
            attribute_definitions: schema.attribute_definitions.clone(),
            billing_mode: BillingMode::PayPerRequest,
        }
    }
}

fn index_list(indexes: &BTreeMap<String, KeySchema>) -> Vec<SecondaryIndex> {
    indexes
        .iter()
        .map(|(name, key_schema)| SecondaryIndex {
            index_name: name.clone(),
            key_schema: key_schema.clone(),
            projection: Projection::All,
        })
        .collect()
}

/// Interface for table existence checks and creation.
///
/// Clients must distinguish a missing table from every other failure:
/// `describe_table` returns `Ok(None)` only when the table does not exist.
/// Timeouts and retries are the client's concern.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Look up a table by name.
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableStatus>>;

    /// Create a table.
    async fn create_table(&self, request: CreateTableRequest) -> Result<TableStatus>;
}
