use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use serde::{Deserialize, Serialize};
use sha2::Sha512;

use super::engine::{SignatureEngine, SignedToken};
use crate::error::SignError;

const ALGORITHM: &str = "RS512";

/// Protected header of the compact serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    pub alg: String,
}

/// RSA PKCS#1 v1.5 signer with SHA-512 digest, emitting compact JWS.
///
/// The payload segment is the base64url of the exact input bytes and the
/// signature covers `header.payload`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaJwsSigner;

impl RsaJwsSigner {
    fn signing_input(&self, payload: &[u8]) -> Result<String, SignError> {
        let header = JwsHeader {
            alg: ALGORITHM.to_string(),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| SignError::uncatalogued("encoding JWS header", e))?;
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(payload)
        ))
    }
}

impl SignatureEngine for RsaJwsSigner {
    fn sign(&self, key: Option<&RsaPrivateKey>, payload: &[u8]) -> Result<SignedToken, SignError> {
        let key = key.ok_or(SignError::Invalid("private key not available"))?;
        let signing_key = SigningKey::<Sha512>::new(key.clone());

        let signing_input = self.signing_input(payload)?;
        let signature = signing_key
            .try_sign(signing_input.as_bytes())
            .map_err(|e| SignError::uncatalogued("signing document", anyhow!(e)))?;

        Ok(SignedToken::new(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_vec())
        )))
    }

    fn algorithm(&self) -> &str {
        ALGORITHM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::signature::Verifier;

    fn segments(token: &SignedToken) -> Vec<&str> {
        token.as_str().split('.').collect()
    }

    #[test]
    fn token_has_three_segments() {
        let token = RsaJwsSigner.sign(Some(testutil::rsa_key()), b"{\"a\":1}").unwrap();
        assert_eq!(token.as_str().matches('.').count(), 2);
        assert!(segments(&token).iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn payload_segment_is_exact_input() {
        let payload = b"{\"b\":2,\"a\":[1,2,3]}";
        let token = RsaJwsSigner.sign(Some(testutil::rsa_key()), payload).unwrap();
        let decoded = URL_SAFE_NO_PAD.decode(segments(&token)[1]).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn header_declares_rs512() {
        let token = RsaJwsSigner.sign(Some(testutil::rsa_key()), b"x").unwrap();
        let header_json = URL_SAFE_NO_PAD.decode(segments(&token)[0]).unwrap();
        let header: JwsHeader = serde_json::from_slice(&header_json).unwrap();
        assert_eq!(header.alg, "RS512");
        assert_eq!(RsaJwsSigner.algorithm(), "RS512");
    }

    #[test]
    fn signature_verifies_over_header_and_payload() {
        let key = testutil::rsa_key();
        let token = RsaJwsSigner.sign(Some(key), b"verify me").unwrap();
        let (signing_input, signature_b64) = token.as_str().rsplit_once('.').unwrap();

        let signature_bytes = URL_SAFE_NO_PAD.decode(signature_b64).unwrap();
        let signature = Signature::try_from(signature_bytes.as_slice()).unwrap();
        let verifying_key = VerifyingKey::<Sha512>::new(key.to_public_key());
        verifying_key
            .verify(signing_input.as_bytes(), &signature)
            .unwrap();
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let key = testutil::rsa_key();
        let token = RsaJwsSigner.sign(Some(key), b"original").unwrap();
        let parts = segments(&token);
        let forged_input = format!("{}.{}", parts[0], URL_SAFE_NO_PAD.encode(b"forged"));

        let signature_bytes = URL_SAFE_NO_PAD.decode(parts[2]).unwrap();
        let signature = Signature::try_from(signature_bytes.as_slice()).unwrap();
        let verifying_key = VerifyingKey::<Sha512>::new(key.to_public_key());
        assert!(verifying_key.verify(forged_input.as_bytes(), &signature).is_err());
    }

    #[test]
    fn payload_framing_is_deterministic() {
        let key = testutil::rsa_key();
        let first = RsaJwsSigner.sign(Some(key), b"same").unwrap();
        let second = RsaJwsSigner.sign(Some(key), b"same").unwrap();
        assert_eq!(segments(&first)[1], segments(&second)[1]);
    }

    #[test]
    fn empty_payload_still_signs() {
        let token = RsaJwsSigner.sign(Some(testutil::rsa_key()), b"").unwrap();
        assert_eq!(segments(&token)[1], "");
    }

    #[test]
    fn missing_key_is_invalid() {
        let err = RsaJwsSigner.sign(None, b"data").unwrap_err();
        assert!(matches!(err, SignError::Invalid("private key not available")));
    }
}
