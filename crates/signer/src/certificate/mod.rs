mod key_codec;
mod store;

use rsa::RsaPrivateKey;
use serde::Deserialize;

use crate::error::SignError;

pub use key_codec::decode_private_key;
pub use store::FileCertificateStore;

/// Stored certificate bundle for one taxpayer.
///
/// Only deserialized, never serialized: the decoded private key lives in
/// memory for the duration of one request and nowhere else.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "activo", alias = "active")]
    pub active: bool,
    #[serde(rename = "nit")]
    pub taxpayer_id: String,
    #[serde(rename = "privateKey")]
    pub private_key: KeyMaterial,
    /// Informational only; never used to sign.
    #[serde(rename = "publicKey", default)]
    pub public_key: KeyMaterial,
    #[serde(skip)]
    pub decoded_private_key: Option<RsaPrivateKey>,
}

impl CertificateRecord {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_private_key(&self) -> bool {
        !self.private_key.encoded.trim().is_empty()
    }
}

impl std::fmt::Debug for CertificateRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateRecord")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("taxpayer_id", &self.taxpayer_id)
            .field("private_key", &self.private_key)
            .field("public_key", &self.public_key)
            .field(
                "decoded_private_key",
                &self.decoded_private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// One half of the stored key pair.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyMaterial {
    #[serde(default)]
    pub algorithm: String,
    /// Hex SHA-512 digest of the password that unlocks the key.
    #[serde(rename = "clave", default)]
    pub password_digest: String,
    /// Base64 of the DER key bytes.
    #[serde(rename = "encodied", default)]
    pub encoded: String,
    #[serde(default)]
    pub format: String,
    #[serde(rename = "keyType", default)]
    pub key_type: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("password_digest", &"<redacted>")
            .field("encoded", &format_args!("<{} chars>", self.encoded.len()))
            .field("format", &self.format)
            .field("key_type", &self.key_type)
            .finish()
    }
}

/// Source of certificates, looked up by taxpayer identifier.
///
/// Implementations read fresh on every call; nothing is cached between
/// requests so deactivations and key updates apply immediately.
pub trait CertificateStore: Send + Sync {
    /// Loads the active certificate for `taxpayer_id` with its private key
    /// decoded.
    fn resolve(&self, taxpayer_id: &str) -> Result<CertificateRecord, SignError>;

    /// Checks `credential` against the digest stored in `record`.
    fn verify_credential(
        &self,
        record: &CertificateRecord,
        credential: &str,
    ) -> Result<bool, SignError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let record = CertificateRecord {
            id: "abc".into(),
            active: true,
            taxpayer_id: "00000000".into(),
            private_key: KeyMaterial {
                password_digest: "deadbeef".into(),
                encoded: "TUlJQ2Rn".into(),
                ..KeyMaterial::default()
            },
            public_key: KeyMaterial::default(),
            decoded_private_key: None,
        };
        let rendered = format!("{record:?}");
        assert!(!rendered.contains("deadbeef"));
        assert!(!rendered.contains("TUlJQ2Rn"));
        assert!(rendered.contains("00000000"));
    }

    #[test]
    fn blank_key_is_not_a_private_key() {
        let mut record = CertificateRecord {
            id: String::new(),
            active: true,
            taxpayer_id: String::new(),
            private_key: KeyMaterial::default(),
            public_key: KeyMaterial::default(),
            decoded_private_key: None,
        };
        assert!(!record.has_private_key());
        record.private_key.encoded = " \n ".into();
        assert!(!record.has_private_key());
        record.private_key.encoded = "AA==".into();
        assert!(record.has_private_key());
    }
}
