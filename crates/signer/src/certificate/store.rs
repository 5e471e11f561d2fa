use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{CertificateRecord, CertificateStore, decode_private_key};
use crate::credential::{PasswordVerifier, Sha512PasswordVerifier};
use crate::error::SignError;

const CERTIFICATE_EXTENSION: &str = "crt";

/// Certificate store backed by one XML file per taxpayer,
/// `<root>/<taxpayer_id>.crt`.
pub struct FileCertificateStore {
    root: PathBuf,
    verifier: Arc<dyn PasswordVerifier>,
}

impl FileCertificateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_verifier(root, Arc::new(Sha512PasswordVerifier))
    }

    pub fn with_verifier(root: impl Into<PathBuf>, verifier: Arc<dyn PasswordVerifier>) -> Self {
        Self {
            root: root.into(),
            verifier,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the certificate for `taxpayer_id`.
    ///
    /// Identifiers that could name anything outside the root are refused.
    pub fn path_for(&self, taxpayer_id: &str) -> Result<PathBuf, SignError> {
        let escapes = taxpayer_id.is_empty()
            || taxpayer_id == "."
            || taxpayer_id.contains("..")
            || taxpayer_id.contains(['/', '\\', '\0']);
        if escapes {
            return Err(SignError::RequiredData);
        }
        Ok(self
            .root
            .join(format!("{taxpayer_id}.{CERTIFICATE_EXTENSION}")))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, SignError> {
        std::fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SignError::FileNotFound(path.to_path_buf()),
            _ => SignError::uncatalogued("reading certificate file", e),
        })
    }
}

/// Parses the XML form of a certificate record. The root element name is
/// not checked; unknown child elements are rejected.
pub fn parse_record(content: &[u8]) -> Result<CertificateRecord, SignError> {
    let text = std::str::from_utf8(content)
        .map_err(|e| SignError::uncatalogued("certificate file is not UTF-8", e))?;
    quick_xml::de::from_str(text)
        .map_err(|e| SignError::uncatalogued("parsing certificate XML", e))
}

impl CertificateStore for FileCertificateStore {
    fn resolve(&self, taxpayer_id: &str) -> Result<CertificateRecord, SignError> {
        let path = self.path_for(taxpayer_id)?;
        let content = self.read(&path)?;
        let mut record = parse_record(&content)?;

        if !record.is_active() {
            return Err(SignError::CertNotFound);
        }
        if !record.has_private_key() {
            return Err(SignError::Invalid("certificate has no private key"));
        }

        // Stored keys are often wrapped across lines.
        let compact: String = record.private_key.encoded.split_ascii_whitespace().collect();
        let der = STANDARD
            .decode(compact.as_bytes())
            .map_err(SignError::PayloadDecodeFailed)?;

        let key = decode_private_key(&der).map_err(|e| match e {
            SignError::Invalid(reason) => SignError::Invalid(reason),
            other => SignError::KeyParseFailed(other.into()),
        })?;
        record.decoded_private_key = Some(key);

        Ok(record)
    }

    fn verify_credential(
        &self,
        record: &CertificateRecord,
        credential: &str,
    ) -> Result<bool, SignError> {
        self.verifier
            .verify(credential, &record.private_key.password_digest)
            .map_err(|e| SignError::uncatalogued("verifying certificate password", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, CertificateFixture};

    #[test]
    fn resolves_active_rsa_certificate() {
        let dir = tempfile::tempdir().unwrap();
        CertificateFixture::new("00000000", "secret").write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        let record = store.resolve("00000000").unwrap();

        assert_eq!(record.taxpayer_id, "00000000");
        assert!(record.decoded_private_key.is_some());
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCertificateStore::new(dir.path());

        match store.resolve("99999999") {
            Err(SignError::FileNotFound(path)) => {
                assert_eq!(path, dir.path().join("99999999.crt"));
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_file_is_uncatalogued() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("00000000.crt")).unwrap();
        let store = FileCertificateStore::new(dir.path());

        match store.resolve("00000000") {
            Err(SignError::Uncatalogued { context, .. }) => {
                assert_eq!(context, "reading certificate file");
            }
            other => panic!("expected Uncatalogued, got {other:?}"),
        }
    }

    #[test]
    fn inactive_certificate_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        CertificateFixture::new("00000000", "secret")
            .active(false)
            .write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        assert!(matches!(store.resolve("00000000"), Err(SignError::CertNotFound)));
    }

    #[test]
    fn empty_key_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        CertificateFixture::new("00000000", "secret")
            .encoded_key("")
            .write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        assert!(matches!(store.resolve("00000000"), Err(SignError::Invalid(_))));
    }

    #[test]
    fn bad_base64_is_payload_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        CertificateFixture::new("00000000", "secret")
            .encoded_key("not*base64")
            .write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        assert!(matches!(
            store.resolve("00000000"),
            Err(SignError::PayloadDecodeFailed(_))
        ));
    }

    #[test]
    fn undecodable_der_is_key_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        CertificateFixture::new("00000000", "secret")
            .encoded_key(&STANDARD.encode(b"not a key"))
            .write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        assert!(matches!(
            store.resolve("00000000"),
            Err(SignError::KeyParseFailed(_))
        ));
    }

    #[test]
    fn ec_key_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        CertificateFixture::new("00000000", "secret")
            .encoded_key(&STANDARD.encode(testutil::ec_pkcs8_der()))
            .write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        assert!(matches!(
            store.resolve("00000000"),
            Err(SignError::Invalid("key is not RSA type"))
        ));
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let encoded = STANDARD.encode(testutil::rsa_pkcs8_der());
        let wrapped = encoded
            .as_bytes()
            .chunks(64)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        CertificateFixture::new("00000000", "secret")
            .encoded_key(&wrapped)
            .write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        assert!(store.resolve("00000000").unwrap().decoded_private_key.is_some());
    }

    #[test]
    fn malformed_xml_is_uncatalogued() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("00000000.crt"), "<CertificadoMH><_id>").unwrap();

        let store = FileCertificateStore::new(dir.path());
        assert!(matches!(
            store.resolve("00000000"),
            Err(SignError::Uncatalogued { .. })
        ));
    }

    #[test]
    fn unknown_elements_are_rejected() {
        let xml = CertificateFixture::new("00000000", "secret")
            .to_xml()
            .replace("</CertificadoMH>", "<extra>1</extra></CertificadoMH>");
        assert!(matches!(
            parse_record(xml.as_bytes()),
            Err(SignError::Uncatalogued { .. })
        ));
    }

    #[test]
    fn alternate_field_names_are_accepted() {
        let xml = CertificateFixture::new("00000000", "secret")
            .to_xml()
            .replace("<_id>", "<id>")
            .replace("</_id>", "</id>")
            .replace("<activo>", "<active>")
            .replace("</activo>", "</active>");
        let record = parse_record(xml.as_bytes()).unwrap();
        assert!(record.active);
    }

    #[test]
    fn path_traversal_is_refused_before_io() {
        let store = FileCertificateStore::new("/nonexistent-root");
        for id in ["../etc/passwd", "a/b", "a\\b", "..", ".", "x\0y"] {
            assert!(
                matches!(store.resolve(id), Err(SignError::RequiredData)),
                "{id:?}"
            );
        }
    }

    #[test]
    fn verify_credential_uses_stored_digest() {
        let dir = tempfile::tempdir().unwrap();
        CertificateFixture::new("00000000", "secret").write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        let record = store.resolve("00000000").unwrap();
        assert!(store.verify_credential(&record, "secret").unwrap());
        assert!(!store.verify_credential(&record, "wrong").unwrap());
    }

    #[test]
    fn verifier_failure_is_uncatalogued() {
        struct Broken;
        impl PasswordVerifier for Broken {
            fn hash(&self, _: &str) -> anyhow::Result<String> {
                anyhow::bail!("hasher unavailable")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        CertificateFixture::new("00000000", "secret").write_to(dir.path());

        let store = FileCertificateStore::with_verifier(dir.path(), Arc::new(Broken));
        let record = store.resolve("00000000").unwrap();
        assert!(matches!(
            store.verify_credential(&record, "secret"),
            Err(SignError::Uncatalogued { .. })
        ));
    }

    #[test]
    fn changes_on_disk_apply_to_next_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = CertificateFixture::new("00000000", "secret");
        fixture.write_to(dir.path());

        let store = FileCertificateStore::new(dir.path());
        assert!(store.resolve("00000000").is_ok());

        fixture.active(false).write_to(dir.path());
        assert!(matches!(store.resolve("00000000"), Err(SignError::CertNotFound)));
    }
}
