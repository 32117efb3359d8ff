//! HTTP handler definitions for the Tableaux server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod data;
pub mod health;

pub use data::{data_handler, simple_data_handler, ApiError};
pub use health::{health_handler, liveness_handler};

use std::sync::Arc;
use std::time::Instant;

use tableaux_core::{SchemaMapper, TableSchema};

use crate::service::{QueryFacade, SimpleGetConfig};

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared read-only resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Schema registry consulted for every request.
    pub schemas: Arc<dyn SchemaMapper>,
    /// Pipeline wrapping the configured connector.
    pub facade: QueryFacade,
    /// Fixed request for `GET /api/v1/{schema}`; `None` when disabled.
    pub simple_get: Option<Arc<SimpleGetConfig>>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Resolves a schema by the name used in the request path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownSchema`] if the registry has no such schema.
    pub fn schema(&self, name: &str) -> Result<Arc<TableSchema>, ApiError> {
        self.schemas
            .resolved_schema(name)
            .ok_or(ApiError::UnknownSchema)
    }
}
