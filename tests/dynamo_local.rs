//! DynamoDB control plane integration tests using testcontainers.
//!
//! Run with: cargo test --test dynamo_local --features dynamo -- --ignored --nocapture
//!
//! Uses DynamoDB Local. Tests share a single container to avoid rootless
//! port conflicts.

#![cfg(feature = "dynamo")]

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::config::Credentials;
use ddb_provisioner::config::DynamoConfig;
use ddb_provisioner::control_plane::{DynamoControlPlane, TableState};
use ddb_provisioner::entities::Book;
use ddb_provisioner::{
    ControlPlane, ControlPlaneError, Ensured, Entity, EntityDescriptor, FieldDescriptor,
    Provisioner, ValueKind,
};
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;

/// Shared DynamoDB Local container and endpoint URL.
static DYNAMO_LOCAL: OnceCell<(ContainerAsync<GenericImage>, String)> = OnceCell::const_new();

async fn get_dynamo_endpoint() -> String {
    let (_, endpoint) = DYNAMO_LOCAL
        .get_or_init(|| async {
            println!("Starting shared DynamoDB Local container...");
            let (container, endpoint) = start_dynamo_local_internal().await;
            println!("DynamoDB Local available at: {}", endpoint);
            (container, endpoint)
        })
        .await;
    endpoint.clone()
}

async fn start_dynamo_local_internal() -> (ContainerAsync<GenericImage>, String) {
    let image = GenericImage::new("amazon/dynamodb-local", "latest")
        .with_exposed_port(8000.tcp())
        .with_wait_for(WaitFor::message_on_stdout(
            "Initializing DynamoDB Local with the following configuration",
        ));

    let container = image
        .with_cmd(["-jar", "DynamoDBLocal.jar", "-inMemory"])
        .with_startup_timeout(Duration::from_secs(120))
        .start()
        .await
        .expect("Failed to start dynamodb-local container");

    let host_port = container
        .get_host_port_ipv4(8000)
        .await
        .expect("Failed to get mapped port");

    let host = container
        .get_host()
        .await
        .expect("Failed to get container host");

    (container, format!("http://{}:{}", host, host_port))
}

/// DynamoDB Local accepts any credentials.
async fn control_plane() -> DynamoControlPlane {
    let endpoint = get_dynamo_endpoint().await;
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("local", "local", None, None, "static"))
        .load()
        .await;

    let config = DynamoConfig::default()
        .with_endpoint(endpoint)
        .with_timeout_ms(10_000);

    DynamoControlPlane::from_sdk_config(&sdk_config, &config)
}

fn unique_table(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn test_describe_missing_table_is_none() {
    let control_plane = control_plane().await;

    let status = control_plane
        .describe_table(&unique_table("missing"))
        .await
        .unwrap();

    assert!(status.is_none());
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn test_books_created_then_skipped() {
    let provisioner = Provisioner::new(Arc::new(control_plane().await));
    let table = unique_table("books");
    let model = Book::descriptor();

    let first = provisioner.ensure_table(&table, &model).await.unwrap();
    let second = provisioner.ensure_table(&table, &model).await.unwrap();

    match first {
        Ensured::Created(status) => {
            assert_eq!(status.table_name, table);
            assert!(status.table_arn.is_some());
        }
        other => panic!("Expected Created, got {:?}", other),
    }
    assert!(matches!(second, Ensured::AlreadyExists(_)));
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn test_created_table_is_described() {
    let control_plane = Arc::new(control_plane().await);
    let provisioner = Provisioner::new(control_plane.clone());
    let table = unique_table("ledger");
    let model = EntityDescriptor::new("Ledger")
        .field(FieldDescriptor::new("getAccount", ValueKind::String).partition_key())
        .field(FieldDescriptor::new("getSequence", ValueKind::Long).sort_key());

    provisioner.ensure_table(&table, &model).await.unwrap();

    let status = control_plane
        .describe_table(&table)
        .await
        .unwrap()
        .expect("table should exist after create");
    assert_eq!(status.table_name, table);
    assert!(matches!(
        status.status,
        TableState::Active | TableState::Creating
    ));
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn test_duplicate_create_is_already_exists() {
    let control_plane = control_plane().await;
    let table = unique_table("dup");
    let request = ddb_provisioner::provisioner::plan_table(
        &table,
        &Book::descriptor(),
        Default::default(),
    )
    .unwrap();

    control_plane.create_table(request.clone()).await.unwrap();
    let err = control_plane.create_table(request).await.unwrap_err();

    assert!(matches!(err, ControlPlaneError::AlreadyExists(_)));
}
