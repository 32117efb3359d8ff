//! Tableaux server: resolves grid data requests against table schemas and
//! streams the rows a connector returns as JSON envelopes.

pub mod cli;
pub mod connector;
pub mod network;
pub mod service;

pub use connector::MemoryConnector;
pub use network::{AppState, NetworkConfig, NetworkModule};
pub use service::{QueryConfig, QueryError, QueryFacade};
