//! ddb-provisioner - create-if-absent DynamoDB tables from entity metadata
//!
//! Derives a table schema (primary key, secondary indexes, key attribute
//! types) from an entity model's key-role metadata and ensures the table
//! exists in the store.
//!
//! ```text
//! EntityDescriptor --classify/synthesize--> TableSchema
//!                                               |
//! Provisioner::ensure_table --describe/create--> ControlPlane
//! ```

pub mod config;
pub mod control_plane;
pub mod entities;
pub mod model;
pub mod provisioner;
pub mod schema;
pub mod utils;

pub use control_plane::{ControlPlane, ControlPlaneError, CreateTableRequest, TableStatus};
pub use model::{Entity, EntityDescriptor, FieldDescriptor, MetadataSource, ValueKind};
pub use provisioner::{Ensured, Error, ProvisionError, Provisioner};
pub use schema::{SchemaError, TableSchema};
