//! AWS DynamoDB control plane.
//!
//! Probes with `DescribeTable` and creates with `CreateTable`. A
//! `ResourceNotFoundException` from `DescribeTable` is the only response
//! treated as "table missing".

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::timeout::TimeoutConfig;
use aws_sdk_dynamodb::error::{BuildError, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    self as ddb, GlobalSecondaryIndex, KeySchemaElement, KeyType, ProjectionType,
    ScalarAttributeType, TableDescription,
};
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use super::{
    BillingMode, ControlPlane, ControlPlaneError, CreateTableRequest, Projection, Result,
    TableState, TableStatus,
};
use crate::config::DynamoConfig;
use crate::schema::{KeySchema, ScalarType};

/// DynamoDB implementation of ControlPlane.
#[derive(Clone)]
pub struct DynamoControlPlane {
    client: Client,
}

impl std::fmt::Debug for DynamoControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoControlPlane").finish_non_exhaustive()
    }
}

impl DynamoControlPlane {
    /// Connect using the default AWS provider chain plus `config` overrides.
    pub async fn new(config: &DynamoConfig) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_sdk_config(&sdk_config, config)
    }

    /// Build from an already loaded SDK config.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, config: &DynamoConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(ref region) = config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region.clone()));
        }

        if let Some(ref endpoint) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        info!(
            region = ?config.region,
            endpoint = ?config.endpoint_url,
            "Configured DynamoDB control plane"
        );

        Self::from_client(Client::from_conf(builder.build()))
    }

    /// Wrap a pre-built client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ControlPlane for DynamoControlPlane {
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableStatus>> {
        let response = match self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if is_resource_not_found(&err) => {
                debug!(table = %table_name, "DescribeTable: table not found");
                return Ok(None);
            }
            Err(err) => return Err(map_sdk_error(err, table_name)),
        };

        Ok(response
            .table()
            .map(|description| table_status(table_name, description)))
    }

    async fn create_table(&self, request: CreateTableRequest) -> Result<TableStatus> {
        let parts = SdkCreateParts::try_from(&request).map_err(|e| {
            ControlPlaneError::Rejected(format!("invalid CreateTable input: {}", e))
        })?;

        let mut builder = self
            .client
            .create_table()
            .table_name(&request.table_name)
            .set_key_schema(Some(parts.key_schema))
            .set_attribute_definitions(Some(parts.attribute_definitions))
            .billing_mode(sdk_billing_mode(request.billing_mode));

        // CreateTable rejects an empty index list
        if !parts.global_secondary_indexes.is_empty() {
            builder = builder.set_global_secondary_indexes(Some(parts.global_secondary_indexes));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &request.table_name))?;

        response
            .table_description()
            .map(|description| table_status(&request.table_name, description))
            .ok_or_else(|| {
                ControlPlaneError::Service(format!(
                    "CreateTable for {} returned no table description",
                    request.table_name
                ))
            })
    }
}

/// SDK shapes for one CreateTable call.
struct SdkCreateParts {
    key_schema: Vec<KeySchemaElement>,
    attribute_definitions: Vec<ddb::AttributeDefinition>,
    global_secondary_indexes: Vec<GlobalSecondaryIndex>,
}

impl TryFrom<&CreateTableRequest> for SdkCreateParts {
    type Error = BuildError;

    fn try_from(request: &CreateTableRequest) -> std::result::Result<Self, BuildError> {
        let key_schema = key_schema_elements(&request.key_schema)?;

        let attribute_definitions = request
            .attribute_definitions
            .iter()
            .map(|def| {
                ddb::AttributeDefinition::builder()
                    .attribute_name(&def.name)
                    .attribute_type(scalar_attribute_type(def.scalar_type))
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let global_secondary_indexes = request
            .secondary_indexes
            .iter()
            .map(|index| {
                GlobalSecondaryIndex::builder()
                    .index_name(&index.index_name)
                    .set_key_schema(Some(key_schema_elements(&index.key_schema)?))
                    .projection(
                        ddb::Projection::builder()
                            .projection_type(projection_type(index.projection))
                            .build(),
                    )
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            key_schema,
            attribute_definitions,
            global_secondary_indexes,
        })
    }
}

fn key_schema_elements(
    key_schema: &KeySchema,
) -> std::result::Result<Vec<KeySchemaElement>, BuildError> {
    let mut elements = vec![KeySchemaElement::builder()
        .attribute_name(&key_schema.partition_key)
        .key_type(KeyType::Hash)
        .build()?];

    if let Some(ref sort_key) = key_schema.sort_key {
        elements.push(
            KeySchemaElement::builder()
                .attribute_name(sort_key)
                .key_type(KeyType::Range)
                .build()?,
        );
    }

    Ok(elements)
}

fn scalar_attribute_type(scalar_type: ScalarType) -> ScalarAttributeType {
    match scalar_type {
        ScalarType::String => ScalarAttributeType::S,
        ScalarType::Number => ScalarAttributeType::N,
    }
}

fn projection_type(projection: Projection) -> ProjectionType {
    match projection {
        Projection::All => ProjectionType::All,
    }
}

fn sdk_billing_mode(billing_mode: BillingMode) -> ddb::BillingMode {
    match billing_mode {
        BillingMode::PayPerRequest => ddb::BillingMode::PayPerRequest,
    }
}

fn table_status(requested_name: &str, description: &TableDescription) -> TableStatus {
    let status = match description.table_status() {
        Some(ddb::TableStatus::Creating) => TableState::Creating,
        Some(ddb::TableStatus::Active) => TableState::Active,
        Some(ddb::TableStatus::Updating) => TableState::Updating,
        Some(ddb::TableStatus::Deleting) => TableState::Deleting,
        Some(ddb::TableStatus::Archived) => TableState::Archived,
        Some(other) => TableState::Other(other.as_str().to_string()),
        None => TableState::Other("UNKNOWN".to_string()),
    };

    TableStatus {
        table_name: description
            .table_name()
            .unwrap_or(requested_name)
            .to_string(),
        table_id: description.table_id().map(str::to_string),
        table_arn: description.table_arn().map(str::to_string),
        status,
    }
}

/// Check if a DescribeTable error means the table does not exist.
fn is_resource_not_found(err: &SdkError<DescribeTableError>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => {
            matches!(
                service_err.err(),
                DescribeTableError::ResourceNotFoundException(_)
            )
        }
        _ => false,
    }
}

/// Map an SDK error to ControlPlaneError.
fn map_sdk_error<E>(err: SdkError<E>, table_name: &str) -> ControlPlaneError
where
    E: ProvideErrorMetadata + std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(service_err) => {
            let code = service_err.err().code().unwrap_or("Unknown");
            let message = service_err.err().message().unwrap_or_default();
            match code {
                "ResourceInUseException" => {
                    ControlPlaneError::AlreadyExists(table_name.to_string())
                }
                "ValidationException" | "LimitExceededException" => ControlPlaneError::Rejected(
                    format!("{} for {}: {}", code, table_name, message),
                ),
                _ => ControlPlaneError::Service(format!(
                    "{} for {}: {}",
                    code, table_name, message
                )),
            }
        }
        SdkError::TimeoutError(_) => {
            ControlPlaneError::Timeout(format!("DynamoDB timeout for {}: {:?}", table_name, err))
        }
        SdkError::DispatchFailure(_) => ControlPlaneError::Connection(format!(
            "DynamoDB connection error for {}: {:?}",
            table_name, err
        )),
        _ => ControlPlaneError::Service(format!("DynamoDB error for {}: {:?}", table_name, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Book, BOOKS_TABLE};
    use crate::model::Entity;
    use crate::schema::{classify, synthesize, AttributeTyping};

    fn book_request() -> CreateTableRequest {
        let classified = classify(&Book::descriptor()).unwrap();
        let schema = synthesize(&classified, AttributeTyping::ValueKind).unwrap();
        CreateTableRequest::from_schema(BOOKS_TABLE, &schema)
    }

    #[test]
    fn test_primary_key_elements() {
        let parts = SdkCreateParts::try_from(&book_request()).unwrap();

        assert_eq!(parts.key_schema.len(), 2);
        assert_eq!(parts.key_schema[0].attribute_name(), "country");
        assert_eq!(parts.key_schema[0].key_type(), &KeyType::Hash);
        assert_eq!(parts.key_schema[1].attribute_name(), "isbnNumber");
        assert_eq!(parts.key_schema[1].key_type(), &KeyType::Range);
    }

    #[test]
    fn test_indexes_project_all() {
        let parts = SdkCreateParts::try_from(&book_request()).unwrap();

        assert_eq!(parts.global_secondary_indexes.len(), 2);
        for gsi in &parts.global_secondary_indexes {
            assert_eq!(
                gsi.projection().unwrap().projection_type(),
                Some(&ProjectionType::All)
            );
        }

        let time_based = parts
            .global_secondary_indexes
            .iter()
            .find(|gsi| gsi.index_name() == "idxTimeBased")
            .unwrap();
        let keys: Vec<_> = time_based
            .key_schema()
            .iter()
            .map(|k| (k.attribute_name(), k.key_type().clone()))
            .collect();
        assert_eq!(
            keys,
            vec![("category", KeyType::Hash), ("publishDate", KeyType::Range)]
        );
    }

    #[test]
    fn test_attribute_definitions() {
        let parts = SdkCreateParts::try_from(&book_request()).unwrap();

        let names: Vec<_> = parts
            .attribute_definitions
            .iter()
            .map(|d| d.attribute_name())
            .collect();
        assert_eq!(names, vec!["category", "country", "isbnNumber", "publishDate"]);
        assert!(parts
            .attribute_definitions
            .iter()
            .all(|d| d.attribute_type() == &ScalarAttributeType::S));
    }

    #[test]
    fn test_table_status_mapping() {
        let description = TableDescription::builder()
            .table_name("books")
            .table_id("0b3e")
            .table_arn("arn:aws:dynamodb:us-east-1:123456789012:table/books")
            .table_status(ddb::TableStatus::Creating)
            .build();

        let status = table_status("books", &description);
        assert_eq!(status.status, TableState::Creating);
        assert_eq!(status.table_id.as_deref(), Some("0b3e"));
        assert_eq!(
            status.table_arn.as_deref(),
            Some("arn:aws:dynamodb:us-east-1:123456789012:table/books")
        );
    }
}
