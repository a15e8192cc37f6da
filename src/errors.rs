use axum::http::StatusCode;
use thiserror::Error;

/// The only failure kind the backend client recognises: the request never
/// completed (or its body could not be decoded), or the backend answered
/// with a non-2xx status.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BACKEND_URL {value:?}: {source}")]
    InvalidBackendUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("BACKEND_URL {value:?} must use http or https")]
    UnsupportedScheme { value: String },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
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
}

impl From<NetworkError> for AppError {
    fn from(err: NetworkError) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
