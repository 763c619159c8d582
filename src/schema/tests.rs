use super::*;
use crate::entities::Book;
use crate::model::{Entity, EntityDescriptor, FieldDescriptor, PropertyNaming, ValueKind};

fn derive(model: &EntityDescriptor, typing: AttributeTyping) -> Result<TableSchema, SchemaError> {
    let classified = classify(model)?;
    synthesize(&classified, typing)
}

fn assert_declarations_complete(schema: &TableSchema) {
    let mut declared: Vec<&str> = schema
        .attribute_definitions
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    let before = declared.len();
    declared.dedup();
    assert_eq!(before, declared.len(), "duplicate attribute declaration");
    assert_eq!(declared, schema.key_attribute_names());
}

#[test]
fn test_book_schema() {
    let schema = derive(&Book::descriptor(), AttributeTyping::ValueKind).unwrap();

    assert_eq!(
        schema.primary_key,
        KeySchema::new("country", Some("isbnNumber".to_string()))
    );
    assert_eq!(schema.secondary_indexes.len(), 2);
    assert_eq!(
        schema.secondary_indexes["idxType"],
        KeySchema::new("category", None)
    );
    assert_eq!(
        schema.secondary_indexes["idxTimeBased"],
        KeySchema::new("category", Some("publishDate".to_string()))
    );

    // category is shared by both indexes but declared once
    assert_eq!(
        schema.key_attribute_names(),
        vec!["category", "country", "isbnNumber", "publishDate"]
    );
    assert_declarations_complete(&schema);
    assert!(schema
        .attribute_definitions
        .iter()
        .all(|d| d.scalar_type == ScalarType::String));
}

#[test]
fn test_partition_only_has_no_sort_key() {
    for kind in [ValueKind::String, ValueKind::Long, ValueKind::Date] {
        let model = EntityDescriptor::new("Session")
            .field(FieldDescriptor::new("getSessionId", kind).partition_key())
            .field(FieldDescriptor::new("getUser", ValueKind::String));

        let schema = derive(&model, AttributeTyping::ValueKind).unwrap();
        assert_eq!(schema.primary_key.sort_key, None);
        assert!(schema.secondary_indexes.is_empty());
        assert_eq!(schema.attribute_definitions.len(), 1);
    }
}

#[test]
fn test_numeric_kinds_declared_as_number() {
    let model = EntityDescriptor::new("Reading")
        .field(FieldDescriptor::new("getSensor", ValueKind::String).partition_key())
        .field(FieldDescriptor::new("getTimestamp", ValueKind::Long).sort_key())
        .field(FieldDescriptor::new("getLevel", ValueKind::Int).secondary_partition_key(&["byLevel"]))
        .field(FieldDescriptor::new("getValue", ValueKind::Double).secondary_sort_key(&["byLevel"]))
        .field(FieldDescriptor::new("getActive", ValueKind::Bool).secondary_partition_key(&["byActive"]));

    let schema = derive(&model, AttributeTyping::ValueKind).unwrap();
    assert_eq!(schema.attribute_type("sensor"), Some(ScalarType::String));
    assert_eq!(schema.attribute_type("timestamp"), Some(ScalarType::Number));
    assert_eq!(schema.attribute_type("level"), Some(ScalarType::Number));
    assert_eq!(schema.attribute_type("value"), Some(ScalarType::Number));
    assert_eq!(schema.attribute_type("active"), Some(ScalarType::String));
    assert_declarations_complete(&schema);
}

#[test]
fn test_string_only_typing() {
    let model = EntityDescriptor::new("Reading")
        .field(FieldDescriptor::new("getSensor", ValueKind::String).partition_key())
        .field(FieldDescriptor::new("getTimestamp", ValueKind::Long).sort_key());

    let schema = derive(&model, AttributeTyping::StringOnly).unwrap();
    assert_eq!(schema.attribute_type("timestamp"), Some(ScalarType::String));
}

#[test]
fn test_conflicting_attribute_types() {
    let model = EntityDescriptor::new("Reading")
        .with_naming(PropertyNaming::Accessor)
        .field(FieldDescriptor::new("getSensor", ValueKind::String).partition_key())
        .field(FieldDescriptor::new("getLevel", ValueKind::Int).sort_key())
        .field(FieldDescriptor::new("get_level", ValueKind::String).secondary_partition_key(&["byLevel"]));

    let err = derive(&model, AttributeTyping::ValueKind).unwrap_err();
    assert_eq!(
        err,
        SchemaError::ConflictingAttributeType {
            entity: "Reading".to_string(),
            attribute: "level".to_string(),
            first: ScalarType::Number,
            second: ScalarType::String,
        }
    );

    // Under string-only typing both declarations agree.
    assert!(derive(&model, AttributeTyping::StringOnly).is_ok());
}

#[test]
fn test_index_reusing_primary_attribute() {
    let model = EntityDescriptor::new("Order")
        .with_naming(PropertyNaming::Verbatim)
        .field(
            FieldDescriptor::new("customer", ValueKind::String)
                .partition_key()
                .secondary_sort_key(&["byStatus"]),
        )
        .field(FieldDescriptor::new("status", ValueKind::String).secondary_partition_key(&["byStatus"]));

    let schema = derive(&model, AttributeTyping::ValueKind).unwrap();
    assert_eq!(
        schema.secondary_indexes["byStatus"],
        KeySchema::new("status", Some("customer".to_string()))
    );
    assert_eq!(schema.attribute_definitions.len(), 2);
    assert_declarations_complete(&schema);
}

#[test]
fn test_error_messages() {
    let err = SchemaError::IndexMissingPartitionKey {
        entity: "Book".to_string(),
        index: "idxTimeBased".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "index idxTimeBased on Book must declare a partition key"
    );
}
