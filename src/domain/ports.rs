use crate::domain::model::{BulkResult, Document, Filter, FindParams, MangoQuery, Patch, WriteResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Service metadata the adapter is bound to at `init`.
pub trait ServiceSchema: Send + Sync {
    fn name(&self) -> &str;
    fn collection(&self) -> Option<&str>;
}

/// Server-level driver: resolves a database handle by name, creating the
/// database if it does not exist yet.
#[async_trait]
pub trait CouchServer: Send + Sync {
    type Database: CouchDatabase;

    async fn database(&self, name: &str) -> Result<Self::Database>;
}

/// Database-level driver. Errors are returned exactly as the store reports
/// them.
#[async_trait]
pub trait CouchDatabase: Send + Sync {
    fn name(&self) -> &str;

    async fn insert(&self, doc: &Document) -> Result<WriteResult>;

    async fn get(&self, id: &str) -> Result<Document>;

    /// Bulk lookup. Ids that are missing or deleted are left out.
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Document>>;

    async fn find(&self, query: &MangoQuery) -> Result<Vec<Document>>;

    async fn bulk(&self, docs: &[Document]) -> Result<Vec<BulkResult>>;

    async fn destroy(&self, id: &str, rev: &str) -> Result<WriteResult>;
}

/// The CRUD contract a service's data-access layer drives.
#[async_trait]
pub trait DbAdapter: Send + Sync {
    fn init(&mut self, service: &dyn ServiceSchema) -> Result<()>;

    async fn connect(&mut self) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;

    async fn find(&self, params: FindParams) -> Result<Vec<Document>>;

    async fn find_one(&self, query: Filter) -> Result<Option<Document>>;

    async fn find_by_id(&self, id: &str) -> Result<Document>;

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Document>>;

    async fn count(&self, params: FindParams) -> Result<usize>;

    async fn insert(&self, doc: Document) -> Result<Document>;

    async fn insert_many(&self, docs: Vec<Document>) -> Result<Vec<Document>>;

    async fn update_many(&self, query: Filter, patch: Patch) -> Result<usize>;

    async fn update_by_id(&self, id: &str, patch: Patch) -> Result<Document>;

    async fn remove_many(&self, query: Filter) -> Result<usize>;

    async fn remove_by_id(&self, id: &str) -> Result<Document>;

    async fn clear(&self) -> Result<usize>;

    fn entity_to_object(&self, doc: Document) -> Value {
        doc.into_value()
    }

    fn before_save_transform_id(&self, doc: Document, id_field: &str) -> Document {
        crate::core::id_field::before_save_transform_id(doc, id_field)
    }

    fn after_retrieve_transform_id(&self, doc: Document, id_field: &str) -> Document {
        crate::core::id_field::after_retrieve_transform_id(doc, id_field)
    }
}
