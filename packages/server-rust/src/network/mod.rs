//! HTTP surface: configuration, middleware, handlers, the streaming response
//! writer and the server lifecycle.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod writer;

pub use config::*;
pub use handlers::AppState;
pub use module::NetworkModule;
