//! Request errors and their HTTP responses.

use crate::delivery::DeliveryError;
use crate::gateway::protocol::ErrorBody;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Why a push was refused. Each maps to one HTTP status; none stop the server.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    Validation(String),
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Delivery(DeliveryError::QueueFull { .. })
            | GatewayError::Delivery(DeliveryError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Delivery(DeliveryError::Rejected(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> String {
        match self {
            GatewayError::Unauthorized(d) | GatewayError::Validation(d) => d.clone(),
            GatewayError::Delivery(e) => e.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            details: self.details(),
        };
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            GatewayError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::from(DeliveryError::QueueFull { capacity: 1 }).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GatewayError::from(DeliveryError::Rejected("host down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
