use axum::{
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use partforge_utils::{ErrorResponse, PartforgeError};

/// Handler error rendered as the structured JSON error body
#[derive(Debug)]
pub struct ApiError(pub PartforgeError);

impl From<PartforgeError> for ApiError {
    fn from(error: PartforgeError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else {
            tracing::warn!(code = self.0.error_code(), error = %self.0, "Request rejected");
        }

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

pub async fn error_handling_middleware(
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;

    if response.status().is_server_error() {
        tracing::error!(%method, %uri, status = response.status().as_u16(), "Server error");
    }
    response
}
