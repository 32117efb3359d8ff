use std::time::Duration;

use axum::http::StatusCode;

use super::mapping::MappingError;
use super::validate::RequestError;

/// Errors returned by the query pipeline, tagged by the stage that failed.
///
/// Messages are passed through verbatim to the client's error envelope.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Structural(#[from] RequestError),
    #[error(transparent)]
    Resolution(#[from] MappingError),
    #[error("{0}")]
    ConnectorValidation(String),
    #[error("{0}")]
    Fetch(String),
    #[error("request timed out")]
    TimedOut(Duration),
}

impl QueryError {
    /// Short stage name, used as a structured logging field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Structural(_) => "structural",
            Self::Resolution(_) => "resolution",
            Self::ConnectorValidation(_) => "connector_validation",
            Self::Fetch(_) => "fetch",
            Self::TimedOut(_) => "timeout",
        }
    }

    /// HTTP status reported for this error.
    ///
    /// Every pipeline failure is reported as a client error, including fetch
    /// failures deep inside the connector. A connector that does not answer
    /// in time yields 408.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Structural(_)
            | Self::Resolution(_)
            | Self::ConnectorValidation(_)
            | Self::Fetch(_) => StatusCode::BAD_REQUEST,
            Self::TimedOut(_) => StatusCode::REQUEST_TIMEOUT,
        }
    }
}
