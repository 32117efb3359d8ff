//! In-memory [`Connector`] implementation backed by JSON rows.
//!
//! Rows are loaded once at startup and never mutated, so concurrent requests
//! read them without any locking. Suitable for development, demos and
//! small reference datasets.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde_json::Value;
use tableaux_core::{
    Connector, DataQuery, Filter, FilterGroup, FilterMode, Order, QueryResult, Row, SortDirection,
    TableSchemaColumn,
};
use tracing::info;

/// Read-only row tables keyed by schema name.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    tables: HashMap<String, Vec<Row>>,
    max_page_size: u64,
}

impl MemoryConnector {
    /// Creates a connector without any tables.
    #[must_use]
    pub fn new(max_page_size: u64) -> Self {
        Self {
            tables: HashMap::new(),
            max_page_size,
        }
    }

    /// Replaces the rows served for `schema`.
    pub fn insert_table(&mut self, schema: impl Into<String>, rows: Vec<Row>) {
        self.tables.insert(schema.into(), rows);
    }

    /// Parses tables from a JSON document of the form `{"<schema>": [{...}, ...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not an object of row arrays.
    pub fn from_json<R: Read>(reader: R, max_page_size: u64) -> anyhow::Result<Self> {
        let tables: HashMap<String, Vec<Row>> =
            serde_json::from_reader(reader).context("failed to parse data file")?;
        for (schema, rows) in &tables {
            info!(schema = %schema, rows = rows.len(), "loaded table");
        }
        Ok(Self {
            tables,
            max_page_size,
        })
    }

    /// Loads tables from a JSON data file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>, max_page_size: u64) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open data file {}", path.display()))?;
        Self::from_json(std::io::BufReader::new(file), max_page_size)
    }

    fn table(&self, schema: &str) -> anyhow::Result<&[Row]> {
        match self.tables.get(schema) {
            Some(rows) => Ok(rows.as_slice()),
            None => bail!("no data available for schema {schema}"),
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn validate_request(&self, query: &DataQuery<'_>) -> anyhow::Result<()> {
        self.table(query.schema.name())?;

        if query.page.size > self.max_page_size {
            bail!(
                "page size {} exceeds the maximum of {}",
                query.page.size,
                self.max_page_size
            );
        }

        for order in query.orders {
            if let Some(comparator) = &order.comparator {
                bail!("unsupported comparator {comparator} for column {}", order.column);
            }
        }

        for group in query.filters {
            for filter in &group.filters {
                if filter.mode.is_ordering() && filter.value.trim().is_empty() {
                    bail!(
                        "filter mode {} on column {} requires a value",
                        filter.mode,
                        group.column
                    );
                }
            }
        }

        Ok(())
    }

    async fn fetch_data(&self, query: &DataQuery<'_>) -> anyhow::Result<QueryResult> {
        let table = self.table(query.schema.name())?;
        let needle = query.search.trim().to_lowercase();

        let mut matching: Vec<&Row> = table
            .iter()
            .filter(|row| matches_groups(row, query.filters))
            .filter(|row| matches_search(row, query.columns, &needle))
            .collect();

        if !query.orders.is_empty() {
            matching.sort_by(|a, b| compare_rows(a, b, query.orders));
        }

        let offset = usize::try_from(query.page.offset).unwrap_or(usize::MAX);
        let size = usize::try_from(query.page.size).unwrap_or(usize::MAX);
        let rows = matching
            .iter()
            .skip(offset)
            .take(size)
            .map(|row| (*row).clone())
            .collect();

        Ok(QueryResult {
            rows,
            total_count: table.len() as u64,
            filtered_count: matching.len() as u64,
        })
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Text form of a cell: strings verbatim, null/missing as empty, others as JSON.
fn cell_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

/// AND across groups, OR within a group.
fn matches_groups(row: &Row, groups: &[FilterGroup]) -> bool {
    groups.iter().all(|group| {
        let cell = row.get(&group.column);
        group.filters.iter().any(|filter| matches_filter(cell, filter))
    })
}

fn matches_filter(cell: Option<&Value>, filter: &Filter) -> bool {
    let text = cell_text(cell);
    let lower = || text.to_lowercase();
    let wanted = filter.value.to_lowercase();

    match filter.mode {
        FilterMode::Equals => text == filter.value,
        FilterMode::NotEquals => text != filter.value,
        FilterMode::Contains => lower().contains(&wanted),
        FilterMode::NotContains => !lower().contains(&wanted),
        FilterMode::StartsWith => lower().starts_with(&wanted),
        FilterMode::EndsWith => lower().ends_with(&wanted),
        FilterMode::GreaterThan => compare_to_literal(cell, &filter.value) == Some(Ordering::Greater),
        FilterMode::GreaterOrEquals => matches!(
            compare_to_literal(cell, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterMode::LessThan => compare_to_literal(cell, &filter.value) == Some(Ordering::Less),
        FilterMode::LessOrEquals => matches!(
            compare_to_literal(cell, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

/// Numeric comparison when both sides are numbers, text comparison otherwise.
/// Missing or null cells never satisfy an ordering filter.
fn compare_to_literal(cell: Option<&Value>, literal: &str) -> Option<Ordering> {
    match cell {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match (n.as_f64(), literal.trim().parse::<f64>()) {
            (Some(a), Ok(b)) => a.partial_cmp(&b),
            _ => Some(n.to_string().as_str().cmp(literal)),
        },
        Some(other) => Some(str::cmp(&cell_text(Some(other)), literal)),
    }
}

/// Case-insensitive substring match over the requested columns.
fn matches_search(row: &Row, columns: &[TableSchemaColumn], needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    columns
        .iter()
        .any(|column| cell_text(row.get(&column.path)).to_lowercase().contains(needle))
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

fn compare_rows(a: &Row, b: &Row, orders: &[Order]) -> Ordering {
    orders
        .iter()
        .map(|order| {
            let ord = compare_values(a.get(&order.column), b.get(&order.column));
            match order.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Nulls first, numbers numerically, everything else by text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let is_null = |v: Option<&Value>| matches!(v, None | Some(Value::Null));
    match (is_null(a), is_null(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if let (Some(Value::Number(x)), Some(Value::Number(y))) = (a, b) {
        if let (Some(x), Some(y)) = (x.as_f64(), y.as_f64()) {
            return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
        }
    }
    cell_text(a).cmp(&cell_text(b))
}
