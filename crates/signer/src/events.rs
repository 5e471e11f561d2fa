use std::error::Error;
use std::path::Path;

use crate::error::{ErrorCode, SignError};

/// Something worth recording about one signing request.
///
/// Events never carry credentials, digests or key material.
#[derive(Debug)]
pub enum SigningEvent<'a> {
    /// No certificate file exists for the taxpayer. Callers only ever see
    /// `CertNotFound`; the path is kept for operators.
    CertificateMissing {
        taxpayer_id: &'a str,
        path: &'a Path,
    },
    Rejected {
        taxpayer_id: &'a str,
        error: &'a SignError,
    },
    Signed {
        taxpayer_id: &'a str,
        algorithm: &'a str,
        token_len: usize,
    },
}

/// Sink for structured signing events, handed to the signer explicitly.
pub trait SigningEvents: Send + Sync {
    fn record(&self, event: &SigningEvent<'_>);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl SigningEvents for TracingEvents {
    fn record(&self, event: &SigningEvent<'_>) {
        match event {
            SigningEvent::CertificateMissing { taxpayer_id, path } => {
                tracing::debug!(
                    taxpayer_id = %taxpayer_id,
                    path = %path.display(),
                    "certificate file does not exist"
                );
            }
            SigningEvent::Rejected { taxpayer_id, error } => match error.code() {
                Some(ErrorCode::Uncatalogued) | None => {
                    tracing::error!(
                        taxpayer_id = %taxpayer_id,
                        code = error.code().map(|c| c.as_str()).unwrap_or("-"),
                        error = %error_chain(error),
                        "signing failed"
                    );
                }
                Some(code) => {
                    tracing::warn!(
                        taxpayer_id = %taxpayer_id,
                        code = code.as_str(),
                        error = %error_chain(error),
                        "signing request rejected"
                    );
                }
            },
            SigningEvent::Signed {
                taxpayer_id,
                algorithm,
                token_len,
            } => {
                tracing::info!(
                    taxpayer_id = %taxpayer_id,
                    algorithm = %algorithm,
                    token_len = *token_len,
                    "document signed"
                );
            }
        }
    }
}

/// `outer: inner: innermost` rendering of an error and its sources.
pub fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
