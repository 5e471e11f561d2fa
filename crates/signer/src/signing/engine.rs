use rsa::RsaPrivateKey;

use crate::error::SignError;

/// Compact signed token, `header.payload.signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken(String);

impl SignedToken {
    pub(crate) fn new(compact: String) -> Self {
        Self(compact)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for producing a signed token over normalized payload bytes.
///
/// Implementations are sync; callers on an async runtime use `spawn_blocking`.
pub trait SignatureEngine: Send + Sync {
    /// Signs `payload` with `key`. A missing key is `Invalid`.
    fn sign(&self, key: Option<&RsaPrivateKey>, payload: &[u8]) -> Result<SignedToken, SignError>;

    /// Algorithm identifier written into the token header (e.g. "RS512").
    fn algorithm(&self) -> &str;
}
