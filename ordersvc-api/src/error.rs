use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ordersvc_core::StageError;
use ordersvc_order::OrchestratorError;

/// Body of every normal-path failure.
pub const GENERIC_FAILURE: &str = "500 - Something bad happened!";

/// Header naming the failure class of a 500 response.
pub const ERROR_KIND_HEADER: &str = "x-error-kind";

#[derive(Debug)]
pub enum AppError {
    FaultInjected(StageError),
    Stage(StageError),
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::FaultInjected(e) => AppError::FaultInjected(e),
            OrchestratorError::Stage(e) => AppError::Stage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (kind, body) = match self {
            AppError::FaultInjected(e) => (e.kind(), e.to_string()),
            AppError::Stage(e) => {
                tracing::error!("Internal Server Error: {}", e);
                (e.kind(), GENERIC_FAILURE.to_string())
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(ERROR_KIND_HEADER, kind)],
            body,
        )
            .into_response()
    }
}
