//! Table schema synthesis from classified key fields.

use std::collections::BTreeMap;

use super::introspect::{ClassifiedFields, KeyField};
use super::{AttributeDefinition, AttributeTyping, KeySchema, ScalarType, SchemaError, TableSchema};

/// Build the table schema for classified key fields.
///
/// Every attribute used by the primary key or by an index is declared
/// exactly once. Two fields resolving to the same attribute must agree on
/// its scalar type.
pub fn synthesize(
    fields: &ClassifiedFields,
    typing: AttributeTyping,
) -> Result<TableSchema, SchemaError> {
    let mut declarations: BTreeMap<String, ScalarType> = BTreeMap::new();
    let mut declare = |field: &KeyField| -> Result<(), SchemaError> {
        let scalar_type = scalar_type(field, typing);
        match declarations.get(&field.attribute) {
            Some(existing) if *existing != scalar_type => {
                Err(SchemaError::ConflictingAttributeType {
                    entity: fields.entity.clone(),
                    attribute: field.attribute.clone(),
                    first: *existing,
                    second: scalar_type,
                })
            }
            Some(_) => Ok(()),
            None => {
                declarations.insert(field.attribute.clone(), scalar_type);
                Ok(())
            }
        }
    };

    declare(&fields.partition)?;
    if let Some(sort) = &fields.sort {
        declare(sort)?;
    }
    let primary_key = key_schema(&fields.partition, fields.sort.as_ref());

    let mut secondary_indexes = BTreeMap::new();
    for (name, index) in &fields.indexes {
        declare(&index.partition)?;
        if let Some(sort) = &index.sort {
            declare(sort)?;
        }
        secondary_indexes.insert(
            name.clone(),
            key_schema(&index.partition, index.sort.as_ref()),
        );
    }

    let attribute_definitions = declarations
        .into_iter()
        .map(|(name, scalar_type)| AttributeDefinition { name, scalar_type })
        .collect();

    Ok(TableSchema {
        primary_key,
        secondary_indexes,
        attribute_definitions,
    })
}

fn key_schema(partition: &KeyField, sort: Option<&KeyField>) -> KeySchema {
    KeySchema::new(
        partition.attribute.clone(),
        sort.map(|field| field.attribute.clone()),
    )
}

fn scalar_type(field: &KeyField, typing: AttributeTyping) -> ScalarType {
    match typing {
        AttributeTyping::ValueKind if field.value_kind.is_numeric() => ScalarType::Number,
        _ => ScalarType::String,
    }
}
