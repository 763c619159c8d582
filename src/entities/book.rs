//! Book catalogue entry.

use serde::{Deserialize, Serialize};

use crate::model::{Entity, EntityDescriptor, FieldDescriptor, ValueKind};

/// Table name books are stored under by default.
pub const BOOKS_TABLE: &str = "books";

/// Index over category.
pub const IDX_TYPE: &str = "idxType";

/// Index over category ordered by publish date.
pub const IDX_TIME_BASED: &str = "idxTimeBased";

/// A book, keyed by country and ISBN.
///
/// Secondary indexes:
/// - `idxType`: `category`
/// - `idxTimeBased`: `category`, `publishDate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub country: Option<String>,
    pub isbn_number: Option<String>,
    pub category: Option<String>,
    /// ISO-8601 calendar date.
    pub publish_date: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

impl Entity for Book {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new("Book")
            .field(FieldDescriptor::new("getCountry", ValueKind::String).partition_key())
            .field(FieldDescriptor::new("getIsbnNumber", ValueKind::String).sort_key())
            .field(
                FieldDescriptor::new("getCategory", ValueKind::String)
                    .secondary_partition_key(&[IDX_TYPE, IDX_TIME_BASED]),
            )
            .field(
                FieldDescriptor::new("getPublishDate", ValueKind::Date)
                    .secondary_sort_key(&[IDX_TIME_BASED]),
            )
            .field(FieldDescriptor::new("getAuthor", ValueKind::String))
            .field(FieldDescriptor::new("getPublisher", ValueKind::String))
    }
}
