pub mod certificate;
pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod i18n;
pub mod orchestrator;
pub mod server;
pub mod signing;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use certificate::{CertificateRecord, CertificateStore, FileCertificateStore};
pub use credential::{PasswordVerifier, Sha512PasswordVerifier};
pub use error::{ErrorCode, SignError};
pub use events::{SigningEvent, SigningEvents, TracingEvents};
pub use i18n::Translator;
pub use orchestrator::{DocumentSigner, SigningRequest};
pub use server::{AppState, ServerConfig, router, run};
pub use signing::{DocumentPayload, RsaJwsSigner, SignatureEngine, SignedToken};
