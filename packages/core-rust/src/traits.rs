use std::sync::Arc;

use async_trait::async_trait;

use crate::schema::TableSchema;
use crate::types::{DataQuery, QueryResult};

/// Resolves schema names to table schemas.
///
/// Shared read-only across all concurrent requests: implementations must be
/// safe for concurrent reads and must not change a schema once handed out.
pub trait SchemaMapper: Send + Sync {
    /// Look up a schema by name.
    fn resolved_schema(&self, name: &str) -> Option<Arc<TableSchema>>;

    /// Names of all registered schemas.
    fn schema_names(&self) -> Vec<String>;
}

/// Pluggable tabular data source.
///
/// Shared read-only across all concurrent requests. Implementations:
/// in-memory rows (reference), SQL backends (future).
#[async_trait]
pub trait Connector: Send + Sync {
    /// Check whether this data source can serve the query at all.
    ///
    /// Called before [`fetch_data`](Connector::fetch_data) so that
    /// data-source-specific limits surface as client errors.
    async fn validate_request(&self, query: &DataQuery<'_>) -> anyhow::Result<()>;

    /// Retrieve the requested page together with total and filtered counts.
    async fn fetch_data(&self, query: &DataQuery<'_>) -> anyhow::Result<QueryResult>;
}
