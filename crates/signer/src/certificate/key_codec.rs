use anyhow::anyhow;
use rsa::RsaPrivateKey;
use rsa::pkcs1::ALGORITHM_OID as RSA_ENCRYPTION_OID;
use rsa::pkcs8::{DecodePrivateKey, PrivateKeyInfo};

use crate::error::SignError;

/// Decodes unencrypted PKCS#8 DER bytes into an RSA private key.
///
/// Malformed DER is `Uncatalogued`; a well-formed key of any other
/// algorithm is `Invalid`.
pub fn decode_private_key(der: &[u8]) -> Result<RsaPrivateKey, SignError> {
    let info = PrivateKeyInfo::try_from(der)
        .map_err(|e| SignError::uncatalogued("parsing PKCS#8 container", anyhow!(e)))?;

    if info.algorithm.oid != RSA_ENCRYPTION_OID {
        return Err(SignError::Invalid("key is not RSA type"));
    }

    RsaPrivateKey::from_pkcs8_der(der)
        .map_err(|e| SignError::uncatalogued("parsing RSA private key", anyhow!(e)))
}
