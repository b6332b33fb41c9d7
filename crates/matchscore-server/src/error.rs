//! HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Errors returned by the HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An artifact failed to load at startup
    #[error("{0}")]
    NotReady(&'static str),

    /// Required features absent from the request
    #[error("missing required features")]
    MissingFeatures(Vec<String>),

    /// A feature value could not be coerced to a number
    #[error("{message}")]
    Conversion { feature: String, message: String },

    /// Body is not a usable JSON object
    #[error("{1}")]
    InvalidRequest(StatusCode, String),

    /// Classifier failure
    #[error("{0}")]
    Internal(String),

    #[error("not found")]
    NotFound,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotReady(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingFeatures(_) | Self::Conversion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidRequest(status, _) => *status,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Metric label for this error
    fn kind(&self) -> &'static str {
        match self {
            Self::NotReady(_) => "not_ready",
            Self::MissingFeatures(_) => "missing_features",
            Self::Conversion { .. } => "conversion",
            Self::InvalidRequest(..) => "invalid_request",
            Self::Internal(_) => "internal",
            Self::NotFound => "not_found",
        }
    }
}

impl From<matchscore_core::Error> for AppError {
    fn from(err: matchscore_core::Error) -> Self {
        let message = err.to_string();
        match err {
            matchscore_core::Error::MissingFeatures(missing) => AppError::MissingFeatures(missing),
            matchscore_core::Error::Conversion { feature, .. } => {
                AppError::Conversion { feature, message }
            }
            _ => AppError::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }
        metrics::counter!("matchscore_errors_total", "kind" => self.kind()).increment(1);

        let body = match &self {
            AppError::MissingFeatures(missing) => json!({
                "error": self.to_string(),
                "missing": missing,
            }),
            AppError::Conversion { feature, message } => json!({
                "error": message,
                "feature": feature,
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_client_statuses() {
        let missing: AppError =
            matchscore_core::Error::MissingFeatures(vec!["Goals".to_string()]).into();
        assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let conversion: AppError = matchscore_core::Error::conversion("Goals", "bad").into();
        assert_eq!(conversion.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(conversion, AppError::Conversion { ref feature, .. } if feature == "Goals"));

        let model: AppError = matchscore_core::Error::model("boom").into();
        assert_eq!(model.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_ready_is_server_error() {
        assert_eq!(
            AppError::NotReady("model not loaded").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
    }
}
