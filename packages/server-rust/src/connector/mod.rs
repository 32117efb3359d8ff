//! Connector implementations shipped with the server.
//!
//! - [`MemoryConnector`]: read-only rows loaded from a JSON file.

pub mod memory;

pub use memory::MemoryConnector;
