use std::path::PathBuf;

use serde::Serialize;

/// Stable, language-independent failure codes handed to the response and
/// translation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    CertNotFound,
    Invalid,
    NoPublicKey,
    Uncatalogued,
    RequiredData,
    JsonToStrConversion,
    StrToJsonConversion,
    FileNotFound,
    PasswordInvalid,
}

impl ErrorCode {
    /// Wire value of the code, as already consumed by existing clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CertNotFound => "801",
            ErrorCode::Invalid => "802",
            ErrorCode::NoPublicKey => "803",
            ErrorCode::Uncatalogued => "804",
            ErrorCode::RequiredData => "809",
            ErrorCode::JsonToStrConversion => "810",
            ErrorCode::StrToJsonConversion => "811",
            ErrorCode::FileNotFound => "812",
            ErrorCode::PasswordInvalid => "813",
        }
    }

    /// Key of the localized message template for this code.
    pub fn message_key(&self) -> &'static str {
        match self {
            ErrorCode::CertNotFound => "cert_not_found",
            ErrorCode::Invalid => "invalid",
            ErrorCode::NoPublicKey => "no_public_key",
            ErrorCode::Uncatalogued => "uncatalogued",
            ErrorCode::RequiredData => "required_data",
            ErrorCode::JsonToStrConversion => "json_to_string_conversion",
            ErrorCode::StrToJsonConversion => "str_to_json_conversion",
            ErrorCode::FileNotFound => "file_not_found",
            ErrorCode::PasswordInvalid => "password_invalid",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the signing pipeline.
///
/// Display strings are meant for internal logs only. Callers map a failure
/// to a response through [`SignError::code`], never through its message.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("signing request is missing required data")]
    RequiredData,
    #[error("no usable certificate for the taxpayer")]
    CertNotFound,
    #[error("certificate file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("certificate is unusable: {0}")]
    Invalid(&'static str),
    #[error("certificate password is invalid for taxpayer {taxpayer_id}")]
    PasswordInvalid { taxpayer_id: String },
    #[error("stored private key is not valid base64")]
    PayloadDecodeFailed(#[source] base64::DecodeError),
    #[error("stored private key could not be parsed")]
    KeyParseFailed(#[source] anyhow::Error),
    #[error("document payload could not be canonicalized")]
    JsonToStrConversion(#[source] serde_json::Error),
    #[error("uncatalogued failure: {context}")]
    Uncatalogued {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("signing request was cancelled")]
    Cancelled,
}

impl SignError {
    pub fn uncatalogued(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        SignError::Uncatalogued {
            context,
            source: source.into(),
        }
    }

    /// Domain code of this failure. `None` marks internal-class failures
    /// that carry no catalogued code.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            SignError::RequiredData => Some(ErrorCode::RequiredData),
            SignError::CertNotFound => Some(ErrorCode::CertNotFound),
            SignError::FileNotFound(_) => Some(ErrorCode::FileNotFound),
            SignError::Invalid(_) => Some(ErrorCode::Invalid),
            SignError::PasswordInvalid { .. } => Some(ErrorCode::PasswordInvalid),
            SignError::PayloadDecodeFailed(_) => Some(ErrorCode::JsonToStrConversion),
            SignError::KeyParseFailed(_) => Some(ErrorCode::NoPublicKey),
            SignError::JsonToStrConversion(_) => Some(ErrorCode::JsonToStrConversion),
            SignError::Uncatalogued { .. } => Some(ErrorCode::Uncatalogued),
            SignError::Cancelled => None,
        }
    }

    /// Positional values for the localized message of this failure.
    pub fn message_args(&self) -> Vec<&str> {
        match self {
            SignError::PasswordInvalid { taxpayer_id } => vec![taxpayer_id.as_str()],
            _ => Vec::new(),
        }
    }
}
