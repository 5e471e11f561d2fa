//! Fixtures shared by unit and integration tests: deterministic RSA and EC
//! keys and a builder for certificate files. Enabled outside this crate by
//! the `testutil` feature.

use std::path::Path;
use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use k256::pkcs8::EncodePrivateKey as _;
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;
use rsa::RsaPrivateKey;
use rsa::pkcs8::EncodePrivateKey;

use crate::credential::{PasswordVerifier, Sha512PasswordVerifier};

const TEST_KEY_BITS: usize = 1024;

/// RSA key generated once per test binary from a fixed seed.
pub fn rsa_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        RsaPrivateKey::new(&mut rng, TEST_KEY_BITS).expect("generating test RSA key")
    })
}

pub fn rsa_pkcs8_der() -> Vec<u8> {
    rsa_key()
        .to_pkcs8_der()
        .expect("encoding test RSA key")
        .as_bytes()
        .to_vec()
}

pub fn ec_pkcs8_der() -> Vec<u8> {
    k256::SecretKey::from_slice(&[0x42; 32])
        .expect("building test EC key")
        .to_pkcs8_der()
        .expect("encoding test EC key")
        .as_bytes()
        .to_vec()
}

/// Builder for `<taxpayer>.crt` files.
#[derive(Clone)]
pub struct CertificateFixture {
    taxpayer_id: String,
    password: String,
    active: bool,
    encoded_key: Option<String>,
}

impl CertificateFixture {
    pub fn new(taxpayer_id: &str, password: &str) -> Self {
        Self {
            taxpayer_id: taxpayer_id.to_string(),
            password: password.to_string(),
            active: true,
            encoded_key: None,
        }
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn encoded_key(mut self, encoded: &str) -> Self {
        self.encoded_key = Some(encoded.to_string());
        self
    }

    pub fn to_xml(&self) -> String {
        let digest = Sha512PasswordVerifier
            .hash(&self.password)
            .expect("hashing fixture password");
        let encoded = self
            .encoded_key
            .clone()
            .unwrap_or_else(|| STANDARD.encode(rsa_pkcs8_der()));
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<CertificadoMH>
  <_id>{id}</_id>
  <nit>{nit}</nit>
  <publicKey>
    <algorithm>RSA</algorithm>
    <clave>{digest}</clave>
    <encodied></encodied>
    <format>X.509</format>
    <keyType>PUBLIC</keyType>
  </publicKey>
  <privateKey>
    <algorithm>RSA</algorithm>
    <clave>{digest}</clave>
    <encodied>{encoded}</encodied>
    <format>PKCS#8</format>
    <keyType>PRIVATE</keyType>
  </privateKey>
  <activo>{active}</activo>
</CertificadoMH>
"#,
            id = format!("cert-{}", self.taxpayer_id),
            nit = self.taxpayer_id,
            active = self.active,
        )
    }

    pub fn write_to(&self, root: &Path) {
        std::fs::write(root.join(format!("{}.crt", self.taxpayer_id)), self.to_xml())
            .expect("writing certificate fixture");
    }
}
