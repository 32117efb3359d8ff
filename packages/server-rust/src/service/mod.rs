//! Request translation pipeline.
//!
//! 1. **Validation** (`validate`): structural checks, no schema access
//! 2. **Mapping** (`mapping`): DTO -> resolved columns, orders, filter groups
//! 3. **Facade** (`facade`): runs validation, mapping and both connector calls
//!
//! Errors from every stage are unified in [`QueryError`].

pub mod config;
pub mod error;
pub mod facade;
pub mod mapping;
pub mod validate;

pub use config::{PagePolicy, QueryConfig, SimpleGetConfig};
pub use error::QueryError;
pub use facade::{QueryFacade, QueryOutcome};
pub use mapping::{map_columns, map_filters, map_orders, MappingError};
pub use validate::{validate_request, RequestError};
