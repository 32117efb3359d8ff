//! Data endpoint handlers.
//!
//! Both handlers resolve the schema from the path, build a [`DataRequest`]
//! (decoded from the body, or synthesized for the simple GET variant) and run
//! it through the [`QueryFacade`](crate::service::QueryFacade). The status
//! code is decided before the first body byte: every pipeline stage finishes
//! before the success envelope starts streaming.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::stream;
use tableaux_core::{DataRequest, TableSchema};
use tracing::{debug, error, warn};

use super::AppState;
use crate::network::writer::{error_envelope, EnvelopeChunks, PageMeta};
use crate::service::{QueryError, SimpleGetConfig};

const APPLICATION_JSON: &str = "application/json";

/// Errors surfaced at the HTTP boundary, rendered as the error envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unknown schema")]
    UnknownSchema,
    #[error("{}", unreadable_body_message(.0))]
    UnreadableBody(#[source] BytesRejection),
    #[error("Failed to parse request")]
    MalformedRequest(#[source] serde_json::Error),
    #[error("{source}")]
    Query { draw: i64, source: QueryError },
}

fn unreadable_body_message(rejection: &BytesRejection) -> &'static str {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        "Request body too large"
    } else {
        "Failed to parse request"
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownSchema => StatusCode::NOT_FOUND,
            Self::UnreadableBody(rejection) => rejection.status(),
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::Query { source, .. } => source.status(),
        }
    }

    /// Echo token for the envelope; 0 when the request never got parsed.
    #[must_use]
    pub const fn draw(&self) -> i64 {
        match self {
            Self::Query { draw, .. } => *draw,
            _ => 0,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, APPLICATION_JSON)],
            error_envelope(&self.to_string(), self.draw()),
        )
            .into_response()
    }
}

/// Handles `POST /api/v1/{schema}` with a JSON [`DataRequest`] body.
///
/// The body rejection is taken as a value so that an oversized or unreadable
/// body still gets the JSON error envelope.
///
/// # Errors
///
/// Unknown schema (404), oversized body (413), unparseable body (400),
/// connector timeout (408) or any other pipeline failure (400).
pub async fn data_handler(
    State(state): State<AppState>,
    Path(schema_name): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let schema = state.schema(&schema_name)?;

    let body = body.map_err(|e| {
        warn!(schema = %schema_name, error = %e, "failed to read data request body");
        ApiError::UnreadableBody(e)
    })?;

    let request: DataRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(schema = %schema_name, error = %e, "failed to parse data request");
        ApiError::MalformedRequest(e)
    })?;

    respond(&state, &request, &schema).await
}

/// Handles `GET /api/v1/{schema}` with the configured fixed request.
///
/// Only routed when the server has a [`SimpleGetConfig`].
///
/// # Errors
///
/// Unknown schema (404), pipeline failure (400 or 408).
pub async fn simple_data_handler(
    State(state): State<AppState>,
    Path(schema_name): Path<String>,
    config: Arc<SimpleGetConfig>,
) -> Result<Response, ApiError> {
    let schema = state.schema(&schema_name)?;

    let request = config.synthesize(&schema);
    respond(&state, &request, &schema).await
}

async fn respond(
    state: &AppState,
    request: &DataRequest,
    schema: &TableSchema,
) -> Result<Response, ApiError> {
    let outcome = state
        .facade
        .execute(request, schema)
        .await
        .map_err(|source| {
            warn!(
                schema = schema.name(),
                draw = request.draw,
                kind = source.kind(),
                error = %source,
                "rejected data request"
            );
            ApiError::Query {
                draw: request.draw,
                source,
            }
        })?;

    debug!(
        schema = schema.name(),
        draw = request.draw,
        rows = outcome.result.rows.len(),
        "streaming data response"
    );

    let meta = PageMeta {
        draw: request.draw,
        records_total: outcome.result.total_count,
        records_filtered: outcome.result.filtered_count,
    };
    let schema_name = schema.name().to_string();
    let chunks = EnvelopeChunks::new(outcome.columns, outcome.result.rows, meta).inspect(
        move |chunk| {
            if let Err(e) = chunk {
                error!(schema = %schema_name, error = %e, "failed to encode response row");
            }
        },
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, APPLICATION_JSON)],
        Body::from_stream(stream::iter(chunks)),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tableaux_core::{
        Connector, DataQuery, QueryResult, Row, StaticSchemaRegistry, TableSchemaColumn,
    };

    use super::*;
    use crate::connector::MemoryConnector;
    use crate::service::{PagePolicy, QueryFacade};

    /// Accepts every query and never answers a fetch.
    struct StalledConnector;

    #[async_trait]
    impl Connector for StalledConnector {
        async fn validate_request(&self, _query: &DataQuery<'_>) -> anyhow::Result<()> {
            Ok(())
        }

        async fn fetch_data(&self, _query: &DataQuery<'_>) -> anyhow::Result<QueryResult> {
            std::future::pending().await
        }
    }

    fn rows(values: &[Value]) -> Vec<Row> {
        values.iter().map(|v| v.as_object().unwrap().clone()).collect()
    }

    fn registry() -> StaticSchemaRegistry {
        let mut registry = StaticSchemaRegistry::new();
        registry
            .insert(
                TableSchema::new(
                    "people",
                    vec![TableSchemaColumn::new("age"), TableSchemaColumn::new("name")],
                )
                .unwrap(),
            )
            .unwrap();
        registry
    }

    fn state_with(facade: QueryFacade) -> AppState {
        AppState {
            schemas: Arc::new(registry()),
            facade,
            simple_get: None,
            start_time: Instant::now(),
        }
    }

    fn test_state() -> AppState {
        let mut connector = MemoryConnector::new(100);
        connector.insert_table(
            "people",
            rows(&[
                json!({"age": 31, "name": "ann"}),
                json!({"age": 45, "name": "bob"}),
            ]),
        );
        state_with(QueryFacade::new(Arc::new(connector), PagePolicy::FromRequest))
    }

    async fn into_parts(result: Result<Response, ApiError>) -> (StatusCode, String, String) {
        let response = result.into_response();
        let status = response.status();
        let content_type = response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn post(state: AppState, schema: &str, body: &str) -> (StatusCode, String, String) {
        let result = data_handler(
            State(state),
            Path(schema.to_string()),
            Ok(Bytes::from(body.to_string())),
        )
        .await;
        into_parts(result).await
    }

    async fn simple_get(config: SimpleGetConfig) -> (StatusCode, String, String) {
        let result = simple_data_handler(
            State(test_state()),
            Path("people".to_string()),
            Arc::new(config),
        )
        .await;
        into_parts(result).await
    }

    #[tokio::test]
    async fn success_envelope_echoes_draw_and_counts() {
        let body = r#"{"start":0,"draw":5,"length":10,"columns":[{"name":"age"}],"order":[],"search":{"value":""}}"#;
        let (status, content_type, text) = post(test_state(), "people", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");
        assert_eq!(
            text,
            r#"{"data": [{"age":31},{"age":45}],"draw":5,"recordsTotal":2,"recordsFiltered":2}"#
        );
    }

    #[tokio::test]
    async fn unknown_column_yields_error_envelope() {
        let body = r#"{"start":0,"draw":5,"length":10,"columns":[{"name":"ageee"}],"order":[],"search":{"value":""}}"#;
        let (status, content_type, text) = post(test_state(), "people", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type, "application/json");
        assert_eq!(text, r#"{"error":"unknown column ageee","draw":5}"#);
    }

    #[tokio::test]
    async fn unknown_schema_is_not_found() {
        let (status, _, text) = post(test_state(), "animals", "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(text, r#"{"error":"Unknown schema","draw":0}"#);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request_with_zero_draw() {
        let (status, _, text) = post(test_state(), "people", r#"{"draw": 7, "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, r#"{"error":"Failed to parse request","draw":0}"#);
    }

    #[tokio::test]
    async fn structural_error_echoes_draw() {
        let body = r#"{"draw":9,"length":0,"columns":[{"name":"age"}]}"#;
        let (status, _, text) = post(test_state(), "people", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            text,
            r#"{"error":"parameter 'Length' must be positive and greater than 0","draw":9}"#
        );
    }

    #[tokio::test]
    async fn connector_validation_error_uses_envelope() {
        let body = r#"{"draw":2,"length":1000,"columns":[{"name":"age"}]}"#;
        let (status, _, text) = post(test_state(), "people", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["draw"], 2);
        assert!(parsed["error"].as_str().unwrap().contains("page size"));
        assert!(parsed.get("data").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_connector_times_out_with_envelope() {
        let facade = QueryFacade::new(Arc::new(StalledConnector), PagePolicy::FromRequest)
            .with_timeout(Duration::from_millis(50));
        let body = r#"{"draw":6,"length":10,"columns":[{"name":"age"}]}"#;
        let (status, content_type, text) = post(state_with(facade), "people", body).await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(content_type, "application/json");
        assert_eq!(text, r#"{"error":"request timed out","draw":6}"#);
    }

    #[tokio::test]
    async fn rows_follow_requested_column_order() {
        let body = r#"{"draw":1,"length":10,"columns":[{"name":"name"},{"name":"age"}],"order":[{"column":"age","dir":"desc"}]}"#;
        let (_, _, text) = post(test_state(), "people", body).await;
        assert_eq!(
            text,
            r#"{"data": [{"name":"bob","age":45},{"name":"ann","age":31}],"draw":1,"recordsTotal":2,"recordsFiltered":2}"#
        );
    }

    #[tokio::test]
    async fn simple_get_runs_fixed_request() {
        let (status, _, text) = simple_get(SimpleGetConfig {
            filter_column: Some("name".to_string()),
            filter_value: "bob".to_string(),
            order_column: Some("age".to_string()),
            ..SimpleGetConfig::default()
        })
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            text,
            r#"{"data": [{"age":45,"name":"bob"}],"draw":0,"recordsTotal":2,"recordsFiltered":1}"#
        );
    }

    #[tokio::test]
    async fn simple_get_with_unknown_order_column_is_bad_request() {
        let (status, _, text) = simple_get(SimpleGetConfig {
            order_column: Some("issued".to_string()),
            ..SimpleGetConfig::default()
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, r#"{"error":"unknown order column issued","draw":0}"#);
    }

    #[test]
    fn api_error_draw_defaults_to_zero() {
        assert_eq!(ApiError::UnknownSchema.draw(), 0);
        let err = ApiError::Query {
            draw: 11,
            source: QueryError::Fetch("x".to_string()),
        };
        assert_eq!(err.draw(), 11);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
