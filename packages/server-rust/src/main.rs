//! `tableaux-server` binary: loads schemas and rows, then serves data requests.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tableaux_core::{SchemaMapper, StaticSchemaRegistry};
use tableaux_server::cli::{init_tracing, ServerArgs};
use tableaux_server::service::QueryFacade;
use tableaux_server::{AppState, MemoryConnector, NetworkModule};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    init_tracing(args.log_format);

    let registry = StaticSchemaRegistry::from_path(&args.schemas)
        .with_context(|| format!("failed to load schemas from {}", args.schemas.display()))?;
    let connector = MemoryConnector::from_path(&args.data, args.max_page_size)?;
    info!(
        schemas = registry.schema_names().len(),
        max_page_size = args.max_page_size,
        "configuration loaded"
    );

    let query = args.query_config();
    let state = AppState {
        schemas: Arc::new(registry),
        facade: QueryFacade::new(Arc::new(connector), query.page_policy)
            .with_timeout(query.request_timeout),
        simple_get: query.simple_get.map(Arc::new),
        start_time: Instant::now(),
    };

    let mut module = NetworkModule::new(args.network_config(), state);
    let port = module.start().await?;
    info!(port, "tableaux-server listening");

    module.serve(wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    use tracing::warn;

    let (mut term, mut int) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "failed to register signal handlers, falling back to ctrl-c");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
            info!("Received SIGINT");
            return;
        }
    };

    tokio::select! {
        _ = term.recv() => info!("Received SIGTERM"),
        _ = int.recv() => info!("Received SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
    info!("Received SIGINT");
}
