mod engine;
mod jws;
mod payload;

pub use engine::{SignatureEngine, SignedToken};
pub use self::jws::{JwsHeader, RsaJwsSigner};
pub use payload::DocumentPayload;
