//! Create-if-absent table provisioning.
//!
//! ```text
//! ensure_table(name, model)
//!   Probe:  describe_table(name)
//!     found     -> AlreadyExists(status)
//!     not found -> Create
//!     error     -> ProvisionError::ProbeFailed
//!   Create: classify -> synthesize -> create_table
//!     ok        -> Created(status)
//!     error     -> ProvisionError::CreateFailed
//! ```
//!
//! Concurrent calls for the same table are not coordinated here; the store
//! decides which create wins and the loser surfaces as `CreateFailed`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::control_plane::{ControlPlane, ControlPlaneError, CreateTableRequest, TableStatus};
use crate::model::MetadataSource;
use crate::schema::{classify, synthesize, AttributeTyping, SchemaError};

/// Result type for provisioning.
pub type Result<T> = std::result::Result<T, Error>;

/// Remote store failures while provisioning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    #[error("Failed to describe table {table}: {source}")]
    ProbeFailed {
        table: String,
        #[source]
        source: ControlPlaneError,
    },

    #[error("Failed to create table {table}: {source}")]
    CreateFailed {
        table: String,
        #[source]
        source: ControlPlaneError,
    },
}

/// Provisioning failure: either the model is misannotated or the store failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Provision error: {0}")]
    Provision(#[from] ProvisionError),
}

/// Outcome of `ensure_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ensured {
    /// The table was found; nothing was created.
    AlreadyExists(TableStatus),
    /// The table was missing and has been created.
    Created(TableStatus),
}

impl Ensured {
    pub fn status(&self) -> &TableStatus {
        match self {
            Ensured::AlreadyExists(status) | Ensured::Created(status) => status,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Ensured::Created(_))
    }
}

/// Derive the create request for a model.
pub fn plan_table(
    table_name: &str,
    model: &dyn MetadataSource,
    typing: AttributeTyping,
) -> std::result::Result<CreateTableRequest, SchemaError> {
    let classified = classify(model)?;
    let schema = synthesize(&classified, typing)?;
    Ok(CreateTableRequest::from_schema(table_name, &schema))
}

/// Ensures tables exist with a schema derived from entity metadata.
///
/// Holds no state besides its collaborators; calls for different tables
/// may run concurrently.
#[derive(Clone)]
pub struct Provisioner {
    control_plane: Arc<dyn ControlPlane>,
    typing: AttributeTyping,
}

impl Provisioner {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self {
            control_plane,
            typing: AttributeTyping::default(),
        }
    }

    /// Set how key attribute types are derived.
    pub fn with_attribute_typing(mut self, typing: AttributeTyping) -> Self {
        self.typing = typing;
        self
    }

    /// Build the create request for a model without touching the store.
    pub fn plan(
        &self,
        table_name: &str,
        model: &dyn MetadataSource,
    ) -> std::result::Result<CreateTableRequest, SchemaError> {
        plan_table(table_name, model, self.typing)
    }

    /// Create the table if it does not exist.
    ///
    /// Makes at most one describe call and one create call. Schema errors are
    /// only discovered when the table is missing.
    pub async fn ensure_table(
        &self,
        table_name: &str,
        model: &dyn MetadataSource,
    ) -> Result<Ensured> {
        let existing = self
            .control_plane
            .describe_table(table_name)
            .await
            .map_err(|source| ProvisionError::ProbeFailed {
                table: table_name.to_string(),
                source,
            })?;

        if let Some(status) = existing {
            info!(
                table = %table_name,
                status = %status.status,
                "Table already exists, will not attempt to create a new one"
            );
            return Ok(Ensured::AlreadyExists(status));
        }

        info!(
            table = %table_name,
            entity = %model.entity_name(),
            "Table does not exist, creating from entity metadata"
        );

        let request = self.plan(table_name, model)?;
        debug!(table = %table_name, request = ?request, "Creating table");

        let status = self
            .control_plane
            .create_table(request)
            .await
            .map_err(|source| ProvisionError::CreateFailed {
                table: table_name.to_string(),
                source,
            })?;

        info!(
            table = %status.table_name,
            table_id = ?status.table_id,
            table_arn = ?status.table_arn,
            status = %status.status,
            "Created table"
        );

        Ok(Ensured::Created(status))
    }

    /// Ensure each table in order, stopping at the first failure.
    pub async fn ensure_all(
        &self,
        tables: &[(&str, &dyn MetadataSource)],
    ) -> Result<Vec<Ensured>> {
        let mut outcomes = Vec::with_capacity(tables.len());
        for (table_name, model) in tables {
            outcomes.push(self.ensure_table(table_name, *model).await?);
        }
        Ok(outcomes)
    }
}
