#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dte_signer::{DocumentSigner, FileCertificateStore, RsaJwsSigner};

pub use dte_signer::testutil::{CertificateFixture, rsa_key};

pub const TAXPAYER: &str = "00000000";
pub const PASSWORD: &str = "secret";

pub fn ec_key_base64() -> String {
    STANDARD.encode(dte_signer::testutil::ec_pkcs8_der())
}

pub fn signer_for(dir: &Path) -> DocumentSigner {
    DocumentSigner::new(
        Arc::new(FileCertificateStore::new(dir)),
        Arc::new(RsaJwsSigner),
    )
}
