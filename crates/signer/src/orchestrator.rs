use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::certificate::CertificateStore;
use crate::error::SignError;
use crate::events::{SigningEvent, SigningEvents};
use crate::signing::{DocumentPayload, SignatureEngine, SignedToken};

/// A caller's request to sign one document.
#[derive(Clone)]
pub struct SigningRequest {
    pub taxpayer_id: String,
    /// Password that unlocks the taxpayer's private key.
    pub credential: String,
    pub payload: Option<DocumentPayload>,
    pub document_name: Option<String>,
    pub signature_name: Option<String>,
}

impl SigningRequest {
    pub fn new(
        taxpayer_id: impl Into<String>,
        credential: impl Into<String>,
        payload: impl Into<DocumentPayload>,
    ) -> Self {
        Self {
            taxpayer_id: taxpayer_id.into(),
            credential: credential.into(),
            payload: Some(payload.into()),
            document_name: None,
            signature_name: None,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        !self.taxpayer_id.is_empty() && !self.credential.is_empty() && self.payload.is_some()
    }
}

impl std::fmt::Debug for SigningRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningRequest")
            .field("taxpayer_id", &self.taxpayer_id)
            .field("credential", &"<redacted>")
            .field("payload", &self.payload.as_ref().map(|_| "<present>"))
            .field("document_name", &self.document_name)
            .field("signature_name", &self.signature_name)
            .finish()
    }
}

/// Runs the signing pipeline: validate, resolve the certificate, check the
/// credential, normalize the payload, sign.
///
/// Holds no per-request state; every call reads and decodes the certificate
/// afresh and drops the decoded key before returning.
pub struct DocumentSigner {
    store: Arc<dyn CertificateStore>,
    engine: Arc<dyn SignatureEngine>,
    events: Option<Arc<dyn SigningEvents>>,
}

impl DocumentSigner {
    pub fn new(store: Arc<dyn CertificateStore>, engine: Arc<dyn SignatureEngine>) -> Self {
        Self {
            store,
            engine,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn SigningEvents>) -> Self {
        self.events = Some(events);
        self
    }

    /// Signs the request's payload with the taxpayer's certificate.
    ///
    /// `cancel` is checked between steps; once it fires the call returns
    /// [`SignError::Cancelled`] instead of a token.
    pub fn sign(
        &self,
        request: SigningRequest,
        cancel: &CancellationToken,
    ) -> Result<SignedToken, SignError> {
        let taxpayer_id = request.taxpayer_id.clone();
        let outcome = self.run(request, cancel);

        match &outcome {
            Ok(token) => self.record(&SigningEvent::Signed {
                taxpayer_id: &taxpayer_id,
                algorithm: self.engine.algorithm(),
                token_len: token.as_str().len(),
            }),
            Err(error) => self.record(&SigningEvent::Rejected {
                taxpayer_id: &taxpayer_id,
                error,
            }),
        }

        outcome
    }

    fn run(
        &self,
        request: SigningRequest,
        cancel: &CancellationToken,
    ) -> Result<SignedToken, SignError> {
        if !request.is_well_formed() {
            return Err(SignError::RequiredData);
        }
        let SigningRequest {
            taxpayer_id,
            credential,
            payload,
            ..
        } = request;
        let payload = payload.ok_or(SignError::RequiredData)?;

        checkpoint(cancel)?;
        let record = self.store.resolve(&taxpayer_id).map_err(|e| match e {
            SignError::FileNotFound(path) => {
                self.record(&SigningEvent::CertificateMissing {
                    taxpayer_id: &taxpayer_id,
                    path: &path,
                });
                SignError::CertNotFound
            }
            other => other,
        })?;

        checkpoint(cancel)?;
        if !self.store.verify_credential(&record, &credential)? {
            return Err(SignError::PasswordInvalid { taxpayer_id });
        }

        checkpoint(cancel)?;
        let payload = payload.into_bytes()?;

        checkpoint(cancel)?;
        self.engine
            .sign(record.decoded_private_key.as_ref(), &payload)
    }

    fn record(&self, event: &SigningEvent<'_>) {
        if let Some(events) = &self.events {
            events.record(event);
        }
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), SignError> {
    if cancel.is_cancelled() {
        return Err(SignError::Cancelled);
    }
    Ok(())
}
