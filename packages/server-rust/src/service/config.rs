use std::time::Duration;

use tableaux_core::{
    Column, ColumnOrder, ColumnSearch, DataRequest, FilterMode, Page, SortDirection, TableSchema,
};

/// How the facade derives the page window handed to the connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePolicy {
    /// Use the request's `length` and `start`.
    #[default]
    FromRequest,
    /// Ignore the request and always ask for the same window.
    Fixed { size: u64, offset: u64 },
}

impl PagePolicy {
    /// Page window for a request that already passed structural validation.
    #[must_use]
    pub fn page_for(self, request: &DataRequest) -> Page {
        match self {
            // Validation guarantees length > 0 and start >= 0.
            Self::FromRequest => Page {
                size: request.length.unsigned_abs(),
                offset: request.start.unsigned_abs(),
            },
            Self::Fixed { size, offset } => Page { size, offset },
        }
    }
}

/// Request synthesized for `GET /api/v1/{schema}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleGetConfig {
    /// Column that receives the fixed filter, if the schema has it.
    pub filter_column: Option<String>,
    pub filter_value: String,
    pub filter_mode: FilterMode,
    /// Column ordered descending.
    pub order_column: Option<String>,
    pub locale: String,
    pub length: i64,
}

impl Default for SimpleGetConfig {
    fn default() -> Self {
        Self {
            filter_column: None,
            filter_value: String::new(),
            filter_mode: FilterMode::Equals,
            order_column: None,
            locale: "de".to_string(),
            length: 10,
        }
    }
}

impl SimpleGetConfig {
    /// Builds the fixed request for `schema`: every column, the configured
    /// filter where the schema has that column, and one descending order.
    ///
    /// The order column is not checked here; an unknown one fails in the
    /// mapper like any other request.
    #[must_use]
    pub fn synthesize(&self, schema: &TableSchema) -> DataRequest {
        let columns = schema
            .columns()
            .iter()
            .map(|column| {
                let mut requested = Column::new(column.path.clone());
                if self.filter_column.as_deref() == Some(column.path.as_str()) {
                    requested.search.push(ColumnSearch {
                        value: self.filter_value.clone(),
                        mode: self.filter_mode,
                    });
                }
                requested
            })
            .collect();

        let order = self
            .order_column
            .iter()
            .map(|column| ColumnOrder {
                column: column.clone(),
                dir: SortDirection::Desc,
            })
            .collect();

        DataRequest {
            start: 0,
            draw: 0,
            length: self.length,
            locale: self.locale.clone(),
            columns,
            order,
            ..DataRequest::default()
        }
    }
}

/// Pipeline-level configuration.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub page_policy: PagePolicy,
    /// `None` disables the fixed-predicate GET endpoint.
    pub simple_get: Option<SimpleGetConfig>,
    /// Upper bound on the connector calls of one request.
    pub request_timeout: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_policy: PagePolicy::default(),
            simple_get: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}
