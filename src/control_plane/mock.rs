//! In-memory control plane for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ControlPlane, ControlPlaneError, CreateTableRequest, Result, TableState, TableStatus};

/// Region and account used in mock table ARNs.
const MOCK_ARN_PREFIX: &str = "arn:aws:dynamodb:ddblocal:000000000000:table";

/// Mock control plane that keeps tables in memory.
#[derive(Default)]
pub struct MockControlPlane {
    tables: RwLock<HashMap<String, TableStatus>>,
    requests: RwLock<Vec<CreateTableRequest>>,
    describe_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fail_on_describe: RwLock<Option<ControlPlaneError>>,
    fail_on_create: RwLock<Option<ControlPlaneError>>,
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing active table.
    pub async fn add_table(&self, table_name: &str) {
        let status = Self::status_for(table_name, TableState::Active);
        self.tables
            .write()
            .await
            .insert(table_name.to_string(), status);
    }

    pub async fn set_fail_on_describe(&self, error: Option<ControlPlaneError>) {
        *self.fail_on_describe.write().await = error;
    }

    pub async fn set_fail_on_create(&self, error: Option<ControlPlaneError>) {
        *self.fail_on_create.write().await = error;
    }

    pub async fn has_table(&self, table_name: &str) -> bool {
        self.tables.read().await.contains_key(table_name)
    }

    /// Create requests received so far, including failed ones.
    pub async fn create_requests(&self) -> Vec<CreateTableRequest> {
        self.requests.read().await.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn status_for(table_name: &str, status: TableState) -> TableStatus {
        TableStatus {
            table_name: table_name.to_string(),
            table_id: Some(Uuid::new_v4().to_string()),
            table_arn: Some(format!("{}/{}", MOCK_ARN_PREFIX, table_name)),
            status,
        }
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableStatus>> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.fail_on_describe.read().await.clone() {
            return Err(error);
        }

        Ok(self.tables.read().await.get(table_name).cloned())
    }

    async fn create_table(&self, request: CreateTableRequest) -> Result<TableStatus> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.write().await.push(request.clone());

        if let Some(error) = self.fail_on_create.read().await.clone() {
            return Err(error);
        }

        let mut tables = self.tables.write().await;
        if tables.contains_key(&request.table_name) {
            return Err(ControlPlaneError::AlreadyExists(request.table_name));
        }

        let created = Self::status_for(&request.table_name, TableState::Creating);
        let mut stored = created.clone();
        stored.status = TableState::Active;
        tables.insert(request.table_name, stored);

        Ok(created)
    }
}
