//! Table schemas and the static schema registry.
//!
//! A [`TableSchema`] is a named set of columns addressable by path. The
//! registry resolves schema names to schemas; schemas resolve paths to
//! [`TableSchemaColumn`] descriptors. Both are immutable after loading and
//! shared read-only across requests.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::traits::SchemaMapper;

/// Errors raised while loading schemas or resolving columns.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown column {path}")]
    UnknownColumn { path: String },
    #[error("duplicate schema {name}")]
    DuplicateSchema { name: String },
    #[error("duplicate column {path} in schema {schema}")]
    DuplicateColumn { schema: String, path: String },
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse schema file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Schema-validated column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchemaColumn {
    /// Dotted or slash-separated path naming the column within its schema.
    pub path: String,
    /// Human-readable column title.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
}

impl TableSchemaColumn {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: None,
        }
    }
}

/// A named collection of columns for one logical dataset.
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<TableSchemaColumn>,
    /// Path -> position in `columns`.
    index: HashMap<String, usize>,
}

impl TableSchema {
    /// Builds a schema, rejecting duplicate column paths.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateColumn`] if two columns share a path.
    pub fn new(name: impl Into<String>, columns: Vec<TableSchemaColumn>) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if index.insert(column.path.clone(), i).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    schema: name,
                    path: column.path.clone(),
                });
            }
        }
        Ok(Self {
            name,
            columns,
            index,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[TableSchemaColumn] {
        &self.columns
    }

    /// Resolves a column path.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownColumn`] if the path is not part of the schema.
    pub fn column(&self, path: &str) -> Result<&TableSchemaColumn, SchemaError> {
        self.index
            .get(path)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| SchemaError::UnknownColumn {
                path: path.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Schema file format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SchemaFile {
    schemas: Vec<SchemaDef>,
}

#[derive(Debug, Deserialize)]
struct SchemaDef {
    name: String,
    columns: Vec<TableSchemaColumn>,
}

// ---------------------------------------------------------------------------
// StaticSchemaRegistry
// ---------------------------------------------------------------------------

/// Immutable [`SchemaMapper`] built once at startup.
///
/// Backed by a `BTreeMap` so [`SchemaMapper::schema_names`] is sorted.
#[derive(Debug, Default)]
pub struct StaticSchemaRegistry {
    schemas: BTreeMap<String, Arc<TableSchema>>,
}

impl StaticSchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateSchema`] if the name is taken.
    pub fn insert(&mut self, schema: TableSchema) -> Result<(), SchemaError> {
        let name = schema.name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateSchema { name });
        }
        debug!(schema = %name, columns = schema.columns().len(), "registered schema");
        self.schemas.insert(name, Arc::new(schema));
        Ok(())
    }

    /// Parses a registry from a JSON document of the form
    /// `{"schemas": [{"name": "...", "columns": [{"path": "...", "title": "..."}]}]}`.
    ///
    /// # Errors
    ///
    /// Fails on I/O or parse errors and on duplicate schema names or column paths.
    pub fn from_json<R: Read>(reader: R) -> Result<Self, SchemaError> {
        let file: SchemaFile = serde_json::from_reader(reader)?;
        let mut registry = Self::new();
        for def in file.schemas {
            registry.insert(TableSchema::new(def.name, def.columns)?)?;
        }
        Ok(registry)
    }

    /// Loads a registry from a JSON schema file on disk.
    ///
    /// # Errors
    ///
    /// See [`StaticSchemaRegistry::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let file = std::fs::File::open(path)?;
        Self::from_json(std::io::BufReader::new(file))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaMapper for StaticSchemaRegistry {
    fn resolved_schema(&self, name: &str) -> Option<Arc<TableSchema>> {
        self.schemas.get(name).map(Arc::clone)
    }

    fn schema_names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }
}
