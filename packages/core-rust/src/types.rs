use serde::{Deserialize, Serialize};

use crate::query::{FilterGroup, Order};
use crate::schema::{TableSchema, TableSchemaColumn};

/// A single result row: column path -> JSON-representable value.
///
/// Connectors may return more keys than were requested; the response writer
/// only emits the requested columns.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Rows returned by a connector plus the counts the grid needs for paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Rows of the requested page, in output order.
    pub rows: Vec<Row>,
    /// Number of rows ignoring all filters.
    pub total_count: u64,
    /// Number of rows matching the filters, before paging.
    pub filtered_count: u64,
}

/// Page window handed to a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Maximum number of rows to return.
    pub size: u64,
    /// Number of matching rows to skip.
    pub offset: u64,
}

/// Fully resolved query handed to a [`Connector`](crate::Connector).
///
/// Borrowed from the request pipeline; connectors must not retain it past
/// the call.
#[derive(Debug, Clone, Copy)]
pub struct DataQuery<'a> {
    pub columns: &'a [TableSchemaColumn],
    pub schema: &'a TableSchema,
    pub filters: &'a [FilterGroup],
    pub orders: &'a [Order],
    /// Raw global search term, possibly empty.
    pub search: &'a str,
    pub page: Page,
    pub locale: &'a str,
}
