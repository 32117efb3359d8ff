//! Command-line and environment configuration for the `tableaux-server` binary.

use std::path::PathBuf;
use std::time::Duration;

use tableaux_core::FilterMode;
use tracing_subscriber::EnvFilter;

use crate::network::{NetworkConfig, TlsConfig};
use crate::service::{PagePolicy, QueryConfig, SimpleGetConfig};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Serves grid data requests against registered table schemas.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "tableaux-server", version)]
pub struct ServerArgs {
    /// Bind address.
    #[arg(long, env = "TABLEAUX_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, short, env = "TABLEAUX_PORT", default_value_t = 8080)]
    pub port: u16,

    /// JSON file describing the table schemas.
    #[arg(long, env = "TABLEAUX_SCHEMAS")]
    pub schemas: PathBuf,

    /// JSON file holding the rows of each schema.
    #[arg(long, env = "TABLEAUX_DATA")]
    pub data: PathBuf,

    /// Allowed CORS origins, comma separated. `*` allows any origin.
    #[arg(
        long = "cors-origin",
        env = "TABLEAUX_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,

    /// Seconds the connector may take per request before 408 is answered.
    #[arg(long, env = "TABLEAUX_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    #[arg(long, env = "TABLEAUX_MAX_BODY_BYTES", default_value_t = 1_048_576)]
    pub max_body_bytes: usize,

    /// TLS certificate (PEM). Requires `--tls-key`.
    #[arg(long, env = "TABLEAUX_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// TLS private key (PEM). Requires `--tls-cert`.
    #[arg(long, env = "TABLEAUX_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// Largest page the in-memory connector serves.
    #[arg(long, env = "TABLEAUX_MAX_PAGE_SIZE", default_value_t = 1000)]
    pub max_page_size: u64,

    /// Always request this page size from the connector, ignoring `length`.
    #[arg(long, env = "TABLEAUX_FIXED_PAGE_SIZE")]
    pub fixed_page_size: Option<u64>,

    /// Offset used together with `--fixed-page-size`, ignoring `start`.
    #[arg(long, env = "TABLEAUX_FIXED_PAGE_OFFSET", default_value_t = 0)]
    pub fixed_page_offset: u64,

    /// Enable `GET /api/v1/{schema}` with a fixed request.
    #[arg(long, env = "TABLEAUX_ENABLE_SIMPLE_GET")]
    pub enable_simple_get: bool,

    /// Column filtered by the simple GET request.
    #[arg(long, env = "TABLEAUX_SIMPLE_FILTER_COLUMN")]
    pub simple_filter_column: Option<String>,

    /// Value of the simple GET filter.
    #[arg(long, env = "TABLEAUX_SIMPLE_FILTER_VALUE", default_value = "")]
    pub simple_filter_value: String,

    /// Column the simple GET request orders by, descending.
    #[arg(long, env = "TABLEAUX_SIMPLE_ORDER_COLUMN")]
    pub simple_order_column: Option<String>,

    /// Locale of the simple GET request.
    #[arg(long, env = "TABLEAUX_SIMPLE_LOCALE", default_value = "de")]
    pub simple_locale: String,

    /// Log output format. Filtering follows `RUST_LOG` (default `info`).
    #[arg(long, env = "TABLEAUX_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServerArgs {
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        let tls = match (&self.tls_cert, &self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            }),
            _ => None,
        };

        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls,
            cors_origins: self.cors_origins.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }

    #[must_use]
    pub fn query_config(&self) -> QueryConfig {
        let page_policy = match self.fixed_page_size {
            Some(size) => PagePolicy::Fixed {
                size,
                offset: self.fixed_page_offset,
            },
            None => PagePolicy::FromRequest,
        };

        let simple_get = self.enable_simple_get.then(|| SimpleGetConfig {
            filter_column: self.simple_filter_column.clone(),
            filter_value: self.simple_filter_value.clone(),
            filter_mode: FilterMode::Equals,
            order_column: self.simple_order_column.clone(),
            locale: self.simple_locale.clone(),
            ..SimpleGetConfig::default()
        });

        QueryConfig {
            page_policy,
            simple_get,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Installs the global tracing subscriber.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
