use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use cartera_core::CoreError;
use cartera_market_data::MarketDataError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error surfaced to HTTP clients.
///
/// Carries the status the failure class maps to; bodies are always
/// `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<MarketDataError> for ApiError {
    fn from(error: MarketDataError) -> Self {
        let status = match &error {
            MarketDataError::UnsupportedPair { .. } => StatusCode::BAD_REQUEST,
            MarketDataError::NoPriceAvailable { .. }
            | MarketDataError::ProviderUnavailable { .. }
            | MarketDataError::InvalidResponse { .. }
            | MarketDataError::ConfigurationMissing(_)
            | MarketDataError::Network(_) => StatusCode::BAD_GATEWAY,
            // Absorbed inside the rate resolver; reaching here is a bug
            MarketDataError::NotFoundForDate { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::AssetNotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: error.to_string(),
            },
            CoreError::InvalidPriceState(_) => Self {
                status: StatusCode::CONFLICT,
                message: error.to_string(),
            },
            CoreError::InvalidInput(_) => Self {
                status: StatusCode::BAD_REQUEST,
                message: error.to_string(),
            },
            CoreError::MarketData(inner) => inner.into(),
            CoreError::Ledger(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: error.to_string(),
            },
        }
    }
}
