//! Mapping between a service's configured id field and CouchDB's `_id`.

use crate::domain::model::{Document, NATIVE_ID_FIELD};

/// Moves the value of `id_field` into `_id` before the document is written.
/// No-op when `id_field` is `_id` or the document has no such field.
pub fn before_save_transform_id(mut doc: Document, id_field: &str) -> Document {
    if id_field != NATIVE_ID_FIELD {
        if let Some(id) = doc.remove(id_field) {
            doc.insert(NATIVE_ID_FIELD, id);
        }
    }
    doc
}

/// Moves `_id` into `id_field` after a document is read back.
pub fn after_retrieve_transform_id(mut doc: Document, id_field: &str) -> Document {
    if id_field != NATIVE_ID_FIELD {
        if let Some(id) = doc.remove(NATIVE_ID_FIELD) {
            doc.insert(id_field, id);
        }
    }
    doc
}
