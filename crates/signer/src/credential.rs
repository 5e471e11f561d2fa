use sha2::{Digest, Sha512};

/// Checks a caller-supplied credential against a stored digest.
pub trait PasswordVerifier: Send + Sync {
    /// Digest of `plaintext` in its stored textual form.
    fn hash(&self, plaintext: &str) -> anyhow::Result<String>;

    /// Whether `plaintext` hashes to `stored_digest`.
    fn verify(&self, plaintext: &str, stored_digest: &str) -> anyhow::Result<bool> {
        Ok(self.hash(plaintext)? == stored_digest)
    }
}

/// Lowercase hex of a single unsalted SHA-512 pass over the UTF-8 bytes.
///
/// Kept bit-for-bit compatible with the digests already stored in
/// certificate files; switching algorithms needs a migration of those files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512PasswordVerifier;

impl PasswordVerifier for Sha512PasswordVerifier {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String> {
        Ok(hex::encode(Sha512::digest(plaintext.as_bytes())))
    }
}
