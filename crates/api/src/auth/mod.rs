//! Credential verification.
//!
//! Verification is decoupled from how a credential arrives: the HTTP
//! extractor in [`crate::middleware::auth`] pulls it out of the request and
//! hands the raw string to a [`TokenVerifier`].

use sha2::{Digest, Sha256};

/// Decides whether a presented credential grants access.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> bool;
}

/// Accepts exactly one shared secret.
///
/// Only the SHA-256 digest of the secret is kept. Candidates are hashed and
/// compared over the full digest length, so timing does not depend on how
/// many leading bytes match.
pub struct SharedSecretVerifier {
    digest: Vec<u8>,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).to_vec(),
        }
    }
}

impl TokenVerifier for SharedSecretVerifier {
    fn verify(&self, credential: &str) -> bool {
        if credential.is_empty() {
            return false;
        }
        let candidate = Sha256::digest(credential.as_bytes());
        candidate
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
