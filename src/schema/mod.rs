//! Table schema derivation.
//!
//! Derives a [`TableSchema`] from entity metadata in two pure steps:
//!
//! ```text
//! MetadataSource --classify--> ClassifiedFields --synthesize--> TableSchema
//! ```
//!
//! `classify` validates key-role structure and resolves attribute names;
//! `synthesize` turns the validated groups into key schemas and attribute
//! type declarations.

pub mod introspect;
pub mod synthesize;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use introspect::{classify, ClassifiedFields, IndexFields, KeyField};
pub use synthesize::synthesize;

/// Errors in an entity model's key metadata.
///
/// These are configuration defects in the model and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{entity} must declare a partition key")]
    NoPartitionKey { entity: String },

    #[error("{entity} must only declare a single partition key, found {count}")]
    MultiplePartitionKeys { entity: String, count: usize },

    #[error("{entity} must only declare a single sort key, found {count}")]
    MultipleSortKeys { entity: String, count: usize },

    #[error("index {index} on {entity} must declare a partition key")]
    IndexMissingPartitionKey { entity: String, index: String },

    #[error("index {index} on {entity} must declare only 1 partition key, found {count}")]
    IndexMultiplePartitionKeys {
        entity: String,
        index: String,
        count: usize,
    },

    #[error("index {index} on {entity} must only declare a single sort key, found {count}")]
    IndexMultipleSortKeys {
        entity: String,
        index: String,
        count: usize,
    },

    #[error("unable to find a property for accessor {accessor} on {entity}")]
    UnresolvedAttributeName { entity: String, accessor: String },

    #[error("{scope} on {entity} uses attribute {attribute} as both partition and sort key")]
    KeyAttributeCollision {
        entity: String,
        scope: String,
        attribute: String,
    },

    #[error("attribute {attribute} on {entity} is declared as both {first} and {second}")]
    ConflictingAttributeType {
        entity: String,
        attribute: String,
        first: ScalarType,
        second: ScalarType,
    },
}

/// Store-level scalar type of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    /// String (`S`).
    #[serde(rename = "S")]
    String,
    /// Number (`N`).
    #[serde(rename = "N")]
    Number,
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarType::String => write!(f, "S"),
            ScalarType::Number => write!(f, "N"),
        }
    }
}

/// How key attribute types are derived from field value kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeTyping {
    /// Numeric value kinds are `N`, all others `S`.
    #[default]
    ValueKind,
    /// Every key attribute is `S`, matching tables created by older tooling
    /// that never emitted numeric key types.
    StringOnly,
}

/// Partition key and optional sort key of the table or of one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl KeySchema {
    pub fn new(partition_key: impl Into<String>, sort_key: Option<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key,
        }
    }

    /// Attribute names in key order (partition first).
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition_key.as_str()).chain(self.sort_key.as_deref())
    }
}

/// Declared type of one key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub scalar_type: ScalarType,
}

/// Validated description of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub primary_key: KeySchema,
    /// Secondary indexes keyed by index name.
    pub secondary_indexes: BTreeMap<String, KeySchema>,
    /// One declaration per key attribute, sorted by name.
    pub attribute_definitions: Vec<AttributeDefinition>,
}

impl TableSchema {
    /// Every attribute referenced by the primary key or an index, deduplicated.
    pub fn key_attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .primary_key
            .attributes()
            .chain(self.secondary_indexes.values().flat_map(KeySchema::attributes))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Declared type of an attribute.
    pub fn attribute_type(&self, name: &str) -> Option<ScalarType> {
        self.attribute_definitions
            .iter()
            .find(|def| def.name == name)
            .map(|def| def.scalar_type)
    }
}

#[cfg(test)]
mod tests;
