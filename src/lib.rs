pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::http::{HttpCouchDatabase, HttpCouchServer};
pub use config::{AdapterConfig, ConnectionOptions, ServiceConfig};
pub use core::adapter::CouchDbAdapter;
pub use core::id_field::{after_retrieve_transform_id, before_save_transform_id};
pub use domain::model::{Document, Filter, FilterValue, FindParams, Patch, SortDirection, SortField};
pub use domain::ports::{CouchDatabase, CouchServer, DbAdapter, ServiceSchema};
pub use utils::error::{AdapterError, Result};
