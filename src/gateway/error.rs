use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::AFFINITY_STATUS_HEADER;
use crate::bandit::BanditError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bandit error: {0}")]
    Bandit(#[from] BanditError),
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, affinity_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::Bandit(BanditError::NoCandidates) => {
                (StatusCode::BAD_REQUEST, "invalid_request")
            }
            GatewayError::Bandit(BanditError::InvalidSnapshot { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_snapshot")
            }
            GatewayError::Bandit(BanditError::InvalidParameters { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "bandit_error")
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            AFFINITY_STATUS_HEADER,
            HeaderValue::from_static(affinity_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
