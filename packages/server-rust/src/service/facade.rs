//! Query facade: runs one data request through the full pipeline.
//!
//! Stages, in fixed order, short-circuiting on the first failure:
//!
//! 1. structural validation ([`validate_request`])
//! 2. column mapping ([`map_columns`])
//! 3. filter mapping ([`map_filters`])
//! 4. order mapping ([`map_orders`])
//! 5. [`Connector::validate_request`]
//! 6. [`Connector::fetch_data`]
//!
//! The two connector stages share one deadline when a timeout is configured.

use std::sync::Arc;
use std::time::Duration;

use tableaux_core::{Connector, DataQuery, DataRequest, QueryResult, TableSchema, TableSchemaColumn};
use tracing::{debug, warn};

use super::config::PagePolicy;
use super::error::QueryError;
use super::mapping::{map_columns, map_filters, map_orders};
use super::validate::validate_request;

/// Successful pipeline result: the resolved columns define the field order
/// of every response row.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub columns: Vec<TableSchemaColumn>,
    pub result: QueryResult,
}

/// Orchestrates validation, mapping and the connector calls.
///
/// Holds only shared read-only handles, so one facade serves all concurrent
/// requests.
#[derive(Clone)]
pub struct QueryFacade {
    connector: Arc<dyn Connector>,
    page_policy: PagePolicy,
    request_timeout: Option<Duration>,
}

impl QueryFacade {
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, page_policy: PagePolicy) -> Self {
        Self {
            connector,
            page_policy,
            request_timeout: None,
        }
    }

    /// Bounds the connector calls of every request by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Executes `request` against `schema`.
    ///
    /// The connector result is returned as-is; row reshaping is left to the
    /// response writer.
    ///
    /// # Errors
    ///
    /// Returns the [`QueryError`] of the first failing stage.
    pub async fn execute(
        &self,
        request: &DataRequest,
        schema: &TableSchema,
    ) -> Result<QueryOutcome, QueryError> {
        validate_request(request)?;

        let columns = map_columns(request, schema)?;
        let filters = map_filters(request);
        let orders = map_orders(request, schema)?;

        let query = DataQuery {
            columns: &columns,
            schema,
            filters: &filters,
            orders: &orders,
            search: &request.search.value,
            page: self.page_policy.page_for(request),
            locale: &request.locale,
        };

        debug!(
            schema = schema.name(),
            columns = columns.len(),
            filters = filters.len(),
            orders = orders.len(),
            page_size = query.page.size,
            page_offset = query.page.offset,
            "resolved data request"
        );

        let connector_calls = async {
            self.connector
                .validate_request(&query)
                .await
                .map_err(|e| QueryError::ConnectorValidation(format!("{e:#}")))?;

            self.connector
                .fetch_data(&query)
                .await
                .map_err(|e| QueryError::Fetch(format!("{e:#}")))
        };

        let result = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, connector_calls)
                .await
                .map_err(|_| {
                    warn!(schema = schema.name(), timeout = ?limit, "connector timed out");
                    QueryError::TimedOut(limit)
                })??,
            None => connector_calls.await?,
        };

        debug!(
            schema = schema.name(),
            rows = result.rows.len(),
            total = result.total_count,
            filtered = result.filtered_count,
            "fetched data"
        );

        Ok(QueryOutcome { columns, result })
    }
}
