//! Active-mode handlers
//!
//! The operator-facing switch: reading the currently active mode and
//! atomically replacing it. An unknown mode name is reported to the
//! caller and leaves the active mode, and all running tick loops,
//! untouched.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};

/// Active mode response
#[derive(Debug, Serialize, Deserialize)]
pub struct GetModeResponse {
    pub mode_name: String,
    pub is_default: bool,
}

/// Mode switch request body
#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    #[serde(default)]
    pub mode: String,
}

/// Mode switch response
#[derive(Debug, Serialize)]
pub struct SetModeResponse {
    pub message: String,
}

/// Report the currently active mode; never fails
pub async fn get_mode(State(state): State<AppState>) -> Json<GetModeResponse> {
    let (mode_name, is_default) = state.exporter.active_mode();
    Json(GetModeResponse {
        mode_name,
        is_default,
    })
}

/// Switch the active mode
pub async fn set_mode(
    State(state): State<AppState>,
    Json(body): Json<SetModeRequest>,
) -> ApiResult<Json<SetModeResponse>> {
    if body.mode.is_empty() {
        return Err(ApiError::BadRequest(
            "`mode` field must be provided".to_string(),
        ));
    }

    state
        .exporter
        .set_active_mode(&body.mode)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    Ok(Json(SetModeResponse {
        message: "success".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::exporter::Exporter;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    fn state() -> AppState {
        let config: Config = serde_yaml::from_str(
            r#"
namespace: demo
modes:
  - name: burst
"#,
        )
        .unwrap();
        AppState::new(Arc::new(Exporter::from_config(&config).unwrap()))
    }

    #[tokio::test]
    async fn test_get_mode_reports_default_initially() {
        let response = get_mode(State(state())).await;
        assert_eq!(response.mode_name, "default");
        assert!(response.is_default);
    }

    #[tokio::test]
    async fn test_set_mode_switches_and_reports() {
        let state = state();

        let response = set_mode(
            State(state.clone()),
            Json(SetModeRequest {
                mode: "burst".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.message, "success");

        let current = get_mode(State(state)).await;
        assert_eq!(current.mode_name, "burst");
        assert!(!current.is_default);
    }

    #[tokio::test]
    async fn test_unknown_mode_is_a_bad_request() {
        let state = state();
        state.exporter.set_active_mode("burst").unwrap();

        let result = set_mode(
            State(state.clone()),
            Json(SetModeRequest {
                mode: "nonexistent".to_string(),
            }),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        // the failed switch left the active mode alone
        assert_eq!(state.exporter.active_mode().0, "burst");
    }

    #[tokio::test]
    async fn test_missing_mode_field_is_a_bad_request() {
        let result = set_mode(
            State(state()),
            Json(SetModeRequest {
                mode: String::new(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
