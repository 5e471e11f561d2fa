use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorCode, SignError};
use crate::i18n::Translator;

pub const STATUS_OK: &str = "OK";
pub const STATUS_ERROR: &str = "error";

const INTERNAL_CODE: &str = "500";
const INTERNAL_MESSAGE_KEY: &str = "internal_server_error";

/// `{"status": ..., "body": ...}` wrapper shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_code: String,
    pub message: String,
}

/// An envelope plus the HTTP status it is sent with.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub envelope: Envelope,
}

impl ApiResponse {
    pub fn success(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                status: STATUS_OK.to_string(),
                body,
            },
        }
    }

    /// Maps a pipeline failure to its coded envelope. Failures without a
    /// domain code are reported as internal errors with no detail.
    pub fn from_error(translator: &Translator, locale: &str, error: &SignError) -> Self {
        match error.code() {
            Some(code) => Self::rejected(translator, locale, code, &error.message_args()),
            None => Self::internal(translator, locale),
        }
    }

    pub fn rejected(translator: &Translator, locale: &str, code: ErrorCode, args: &[&str]) -> Self {
        let message = translator.translate(locale, code.message_key(), args);
        Self::error(StatusCode::BAD_REQUEST, code.as_str(), message)
    }

    pub fn internal(translator: &Translator, locale: &str) -> Self {
        let message = translator.translate(locale, INTERNAL_MESSAGE_KEY, &[]);
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_CODE, message)
    }

    fn error(status: StatusCode, code: &str, message: String) -> Self {
        let body = ErrorBody {
            error_code: code.to_string(),
            message,
        };
        Self {
            status,
            envelope: Envelope {
                status: STATUS_ERROR.to_string(),
                body: serde_json::json!(body),
            },
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
