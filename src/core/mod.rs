pub mod adapter;
pub mod id_field;
pub mod selector;

pub use crate::domain::model::{Document, Filter, FilterValue, FindParams, Patch};
pub use crate::domain::ports::{CouchDatabase, CouchServer, DbAdapter, ServiceSchema};
pub use crate::utils::error::Result;
