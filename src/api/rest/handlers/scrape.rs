//! Prometheus scrape handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};

/// Handler for GET /metrics: the current metric families in
/// Prometheus text format
pub async fn metrics(State(state): State<AppState>) -> ApiResult<Response> {
    let families = state.exporter.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let body = String::from_utf8(buffer).map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::exporter::Exporter;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_scrape_exposes_registered_series() {
        let config: Config = serde_yaml::from_str(
            r#"
namespace: demo
metrics:
  - name: queue_depth
    description: Synthetic queue depth
    kind: gauge
    interval_secs: 1
    default_properties: { average: 50 }
"#,
        )
        .unwrap();
        let state = AppState::new(Arc::new(Exporter::from_config(&config).unwrap()));

        let response = metrics(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("demo_queue_depth"));
        assert!(text.contains("Synthetic queue depth"));
    }
}
