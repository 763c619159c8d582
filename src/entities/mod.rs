//! Entity models persisted by this application.
//!
//! Each model is registered under a lowercase name so configuration can
//! bind tables to models without referring to Rust types.

mod book;

pub use book::{Book, BOOKS_TABLE, IDX_TIME_BASED, IDX_TYPE};

use crate::model::{Entity, EntityDescriptor};

/// Names of every registered entity.
pub const ENTITY_NAMES: &[&str] = &["book"];

/// Look up the descriptor of a registered entity by name.
pub fn descriptor_for(name: &str) -> Option<EntityDescriptor> {
    match name.to_ascii_lowercase().as_str() {
        "book" => Some(Book::descriptor()),
        _ => None,
    }
}
