//! Key-role classification of entity fields.

use std::collections::BTreeMap;

use super::SchemaError;
use crate::model::{FieldDescriptor, MetadataSource, ValueKind};

/// A key field with its resolved storage attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyField {
    pub accessor: String,
    pub attribute: String,
    pub value_kind: ValueKind,
}

/// Key fields of one secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFields {
    pub partition: KeyField,
    pub sort: Option<KeyField>,
}

/// Validated key fields of an entity, grouped by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFields {
    pub entity: String,
    pub partition: KeyField,
    pub sort: Option<KeyField>,
    /// Secondary indexes keyed by index name.
    pub indexes: BTreeMap<String, IndexFields>,
}

#[derive(Default)]
struct IndexMembers<'a> {
    partitions: Vec<&'a FieldDescriptor>,
    sorts: Vec<&'a FieldDescriptor>,
}

/// Classify and validate the key fields of an entity model.
///
/// Structural checks run first (primary partition key, primary sort key,
/// then each secondary index in name order); attribute names are resolved
/// only once the structure is valid. The first failure is returned.
pub fn classify(source: &dyn MetadataSource) -> Result<ClassifiedFields, SchemaError> {
    let entity = source.entity_name();
    let fields = source.fields();

    let partitions: Vec<&FieldDescriptor> =
        fields.iter().filter(|f| f.is_partition_key()).collect();
    let partition = match partitions.as_slice() {
        [] => {
            return Err(SchemaError::NoPartitionKey {
                entity: entity.to_string(),
            })
        }
        [single] => *single,
        many => {
            return Err(SchemaError::MultiplePartitionKeys {
                entity: entity.to_string(),
                count: many.len(),
            })
        }
    };

    let sorts: Vec<&FieldDescriptor> = fields.iter().filter(|f| f.is_sort_key()).collect();
    if sorts.len() > 1 {
        return Err(SchemaError::MultipleSortKeys {
            entity: entity.to_string(),
            count: sorts.len(),
        });
    }
    let sort = sorts.first().copied();

    let mut members: BTreeMap<&str, IndexMembers<'_>> = BTreeMap::new();
    for field in fields {
        for index in field.secondary_partition_indexes() {
            members.entry(index).or_default().partitions.push(field);
        }
        for index in field.secondary_sort_indexes() {
            members.entry(index).or_default().sorts.push(field);
        }
    }

    let mut index_keys = Vec::with_capacity(members.len());
    for (index, group) in &members {
        let index_partition = match group.partitions.as_slice() {
            [] => {
                return Err(SchemaError::IndexMissingPartitionKey {
                    entity: entity.to_string(),
                    index: index.to_string(),
                })
            }
            [single] => *single,
            many => {
                return Err(SchemaError::IndexMultiplePartitionKeys {
                    entity: entity.to_string(),
                    index: index.to_string(),
                    count: many.len(),
                })
            }
        };
        if group.sorts.len() > 1 {
            return Err(SchemaError::IndexMultipleSortKeys {
                entity: entity.to_string(),
                index: index.to_string(),
                count: group.sorts.len(),
            });
        }
        index_keys.push((*index, index_partition, group.sorts.first().copied()));
    }

    let partition = resolve(source, partition)?;
    let sort = sort.map(|f| resolve(source, f)).transpose()?;
    check_distinct(entity, "primary key", &partition, sort.as_ref())?;

    let mut indexes = BTreeMap::new();
    for (index, index_partition, index_sort) in index_keys {
        let partition = resolve(source, index_partition)?;
        let sort = index_sort.map(|f| resolve(source, f)).transpose()?;
        check_distinct(entity, &format!("index {index}"), &partition, sort.as_ref())?;
        indexes.insert(index.to_string(), IndexFields { partition, sort });
    }

    Ok(ClassifiedFields {
        entity: entity.to_string(),
        partition,
        sort,
        indexes,
    })
}

fn resolve(source: &dyn MetadataSource, field: &FieldDescriptor) -> Result<KeyField, SchemaError> {
    let attribute =
        source
            .attribute_name(field)
            .ok_or_else(|| SchemaError::UnresolvedAttributeName {
                entity: source.entity_name().to_string(),
                accessor: field.accessor.clone(),
            })?;

    Ok(KeyField {
        accessor: field.accessor.clone(),
        attribute,
        value_kind: field.value_kind.clone(),
    })
}

fn check_distinct(
    entity: &str,
    scope: &str,
    partition: &KeyField,
    sort: Option<&KeyField>,
) -> Result<(), SchemaError> {
    match sort {
        Some(sort) if sort.attribute == partition.attribute => {
            Err(SchemaError::KeyAttributeCollision {
                entity: entity.to_string(),
                scope: scope.to_string(),
                attribute: partition.attribute.clone(),
            })
        }
        _ => Ok(()),
    }
}
