use crate::adapters::http::HttpCouchServer;
use crate::config::{ConnectionOptions, DEFAULT_URI};
use crate::core::selector;
use crate::domain::model::{Document, Filter, FindParams, Patch};
use crate::domain::ports::{CouchDatabase, CouchServer, DbAdapter, ServiceSchema};
use crate::utils::error::{AdapterError, Result};
use async_trait::async_trait;

/// CRUD facade over one CouchDB database.
///
/// Lifecycle: `new`/`with_server` (no I/O) → `init` (binds the database
/// name) → `connect` (get-or-create) → operations → `disconnect`.
pub struct CouchDbAdapter<S: CouchServer = HttpCouchServer> {
    server: S,
    database_name: Option<String>,
    db: Option<S::Database>,
}

impl CouchDbAdapter<HttpCouchServer> {
    /// HTTP-backed adapter. `uri` defaults to `http://localhost:5984`.
    pub fn new(uri: Option<&str>, options: ConnectionOptions) -> Result<Self> {
        let server = HttpCouchServer::new(uri.unwrap_or(DEFAULT_URI), &options)?;
        Ok(Self::with_server(server))
    }
}

impl<S: CouchServer> CouchDbAdapter<S> {
    pub fn with_server(server: S) -> Self {
        Self {
            server,
            database_name: None,
            db: None,
        }
    }

    pub fn database_name(&self) -> Option<&str> {
        self.database_name.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.db.is_some()
    }

    fn db(&self) -> Result<&S::Database> {
        self.db.as_ref().ok_or(AdapterError::NotConnected)
    }
}

#[async_trait]
impl<S: CouchServer> DbAdapter for CouchDbAdapter<S> {
    fn init(&mut self, service: &dyn ServiceSchema) -> Result<()> {
        let collection = service
            .collection()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                AdapterError::config(format!(
                    "Missing `collection` definition in schema of service '{}'",
                    service.name()
                ))
            })?;

        self.database_name = Some(format!("{}-{}", service.name(), collection));
        Ok(())
    }

    async fn connect(&mut self) -> Result<()> {
        let name = self
            .database_name
            .clone()
            .ok_or_else(|| AdapterError::config("Adapter is not initialized, call init first"))?;

        let db = self.server.database(&name).await?;
        tracing::info!("Connected to CouchDB database '{}'", name);
        self.db = Some(db);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(db) = self.db.take() {
            tracing::info!("Disconnected from CouchDB database '{}'", db.name());
        }
        Ok(())
    }

    async fn find(&self, params: FindParams) -> Result<Vec<Document>> {
        let query = selector::build_query(&params);
        tracing::debug!("find selector: {:?}", query.selector);
        self.db()?.find(&query).await
    }

    async fn find_one(&self, query: Filter) -> Result<Option<Document>> {
        let docs = self.find(FindParams::new(query).limit(1)).await?;
        Ok(docs.into_iter().next())
    }

    async fn find_by_id(&self, id: &str) -> Result<Document> {
        self.db()?.get(id).await
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Document>> {
        self.db()?.fetch(ids).await
    }

    /// Counts by fetching every match. Kept as a full scan so that any
    /// selector `find` accepts is counted the same way.
    async fn count(&self, params: FindParams) -> Result<usize> {
        Ok(self.find(params).await?.len())
    }

    async fn insert(&self, doc: Document) -> Result<Document> {
        let db = self.db()?;
        let written = db.insert(&doc).await?;
        tracing::debug!("Inserted document '{}' ({})", written.id, written.rev);
        db.get(&written.id).await
    }

    /// One bulk write, then every document is re-read so the result holds
    /// the stored state.
    async fn insert_many(&self, docs: Vec<Document>) -> Result<Vec<Document>> {
        let db = self.db()?;
        let rows = db.bulk(&docs).await?;
        tracing::debug!("Bulk inserted {} documents", rows.len());

        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(error) = row.error {
                return Err(AdapterError::from_bulk_row(
                    error,
                    row.reason.unwrap_or_default(),
                ));
            }
            let id = row.id.ok_or_else(|| AdapterError::Couch {
                status: 500,
                error: "bad_bulk_row".to_string(),
                reason: "bulk write reply row carries neither id nor error".to_string(),
            })?;
            stored.push(db.get(&id).await?);
        }
        Ok(stored)
    }

    /// Returns the number of documents submitted to the bulk write.
    async fn update_many(&self, query: Filter, patch: Patch) -> Result<usize> {
        let mut docs = self.find(FindParams::new(query)).await?;
        if docs.is_empty() {
            return Ok(0);
        }

        for doc in &mut docs {
            doc.merge(&patch);
        }
        self.db()?.bulk(&docs).await?;

        tracing::debug!("Updated {} documents", docs.len());
        Ok(docs.len())
    }

    async fn update_by_id(&self, id: &str, patch: Patch) -> Result<Document> {
        let db = self.db()?;
        let mut doc = db.get(id).await?;
        doc.merge(&patch);
        db.insert(&doc).await?;
        db.get(id).await
    }

    async fn remove_many(&self, query: Filter) -> Result<usize> {
        let mut docs = self.find(FindParams::new(query)).await?;
        if docs.is_empty() {
            return Ok(0);
        }

        for doc in &mut docs {
            doc.mark_deleted();
        }
        self.db()?.bulk(&docs).await?;

        tracing::debug!("Removed {} documents", docs.len());
        Ok(docs.len())
    }

    /// Returns the document as it was before deletion.
    async fn remove_by_id(&self, id: &str) -> Result<Document> {
        let db = self.db()?;
        let doc = db.get(id).await?;
        let rev = doc.rev().unwrap_or_default().to_string();
        db.destroy(id, &rev).await?;
        Ok(doc)
    }

    async fn clear(&self) -> Result<usize> {
        self.remove_many(Filter::new()).await
    }
}
