//! Entity metadata.
//!
//! An entity model describes the fields it persists, the value kind of each
//! field, and which key roles a field plays in the table it is stored in.
//! Descriptors are built once per model type by an [`Entity`] implementation
//! and consumed by the introspector through the [`MetadataSource`] trait.

mod naming;

pub use naming::PropertyNaming;

/// Semantic type of a field's value.
///
/// Only numeric vs. non-numeric matters for key attribute typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Long,
    Float,
    Double,
    Bool,
    String,
    Date,
    Timestamp,
    /// Any other type, named for diagnostics.
    Other(String),
}

impl ValueKind {
    /// True for the numeric kinds the store can key on as `N`.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueKind::Int | ValueKind::Long | ValueKind::Float | ValueKind::Double
        )
    }
}

/// Key role a field plays in the table or in one of its secondary indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRole {
    /// Primary partition (hash) key.
    PartitionKey,
    /// Primary sort (range) key.
    SortKey,
    /// Partition key of each named secondary index.
    SecondaryPartitionKey(Vec<String>),
    /// Sort key of each named secondary index.
    SecondarySortKey(Vec<String>),
}

/// One declared field of an entity model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Accessor name as declared on the model.
    pub accessor: String,
    /// Value kind of the field.
    pub value_kind: ValueKind,
    /// Key roles, possibly empty.
    pub roles: Vec<KeyRole>,
}

impl FieldDescriptor {
    pub fn new(accessor: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            accessor: accessor.into(),
            value_kind,
            roles: Vec::new(),
        }
    }

    /// Tag as the primary partition key.
    pub fn partition_key(mut self) -> Self {
        self.roles.push(KeyRole::PartitionKey);
        self
    }

    /// Tag as the primary sort key.
    pub fn sort_key(mut self) -> Self {
        self.roles.push(KeyRole::SortKey);
        self
    }

    /// Tag as the partition key of the named secondary indexes.
    pub fn secondary_partition_key(mut self, index_names: &[&str]) -> Self {
        self.roles.push(KeyRole::SecondaryPartitionKey(
            index_names.iter().map(|n| n.to_string()).collect(),
        ));
        self
    }

    /// Tag as the sort key of the named secondary indexes.
    pub fn secondary_sort_key(mut self, index_names: &[&str]) -> Self {
        self.roles.push(KeyRole::SecondarySortKey(
            index_names.iter().map(|n| n.to_string()).collect(),
        ));
        self
    }

    pub fn is_partition_key(&self) -> bool {
        self.roles.contains(&KeyRole::PartitionKey)
    }

    pub fn is_sort_key(&self) -> bool {
        self.roles.contains(&KeyRole::SortKey)
    }

    /// Index names this field is the partition key of.
    pub fn secondary_partition_indexes(&self) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .filter_map(|role| match role {
                KeyRole::SecondaryPartitionKey(names) => Some(names),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }

    /// Index names this field is the sort key of.
    pub fn secondary_sort_indexes(&self) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .filter_map(|role| match role {
                KeyRole::SecondarySortKey(names) => Some(names),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }

    /// True if the field carries any key role.
    pub fn is_tagged(&self) -> bool {
        !self.roles.is_empty()
    }
}

/// Source of key-role metadata for one entity model.
pub trait MetadataSource: Send + Sync {
    /// Model name, used in diagnostics.
    fn entity_name(&self) -> &str;

    /// Declared fields in declaration order.
    fn fields(&self) -> &[FieldDescriptor];

    /// Storage attribute name of a field, or `None` if the model's naming
    /// convention cannot map its accessor to a property.
    fn attribute_name(&self, field: &FieldDescriptor) -> Option<String>;
}

/// Static field metadata for an entity model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: String,
    naming: PropertyNaming,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    /// Start a descriptor using the accessor naming convention.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            naming: PropertyNaming::Accessor,
            fields: Vec::new(),
        }
    }

    pub fn with_naming(mut self, naming: PropertyNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn naming(&self) -> PropertyNaming {
        self.naming
    }
}

impl MetadataSource for EntityDescriptor {
    fn entity_name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    fn attribute_name(&self, field: &FieldDescriptor) -> Option<String> {
        self.naming.property_name(&field.accessor)
    }
}

/// A model type that can describe its persisted fields.
pub trait Entity {
    fn descriptor() -> EntityDescriptor;
}
