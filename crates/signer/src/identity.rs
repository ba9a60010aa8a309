use std::fmt;
use std::fs;
use std::path::Path;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::SigningError;

/// The API user (or client) a request is signed on behalf of.
///
/// Holds the RSA private key issued by the Chef server. The key is checked
/// for internal consistency once, at construction.
pub struct Identity {
    user_id: String,
    private_key: RsaPrivateKey,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, private_key: RsaPrivateKey) -> Result<Self, SigningError> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(SigningError::EmptyUserId);
        }
        private_key
            .validate()
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        Ok(Self { user_id, private_key })
    }

    /// Parse a PEM private key. Both PKCS#1 (`BEGIN RSA PRIVATE KEY`, what
    /// the Chef server hands out) and PKCS#8 (`BEGIN PRIVATE KEY`) are accepted.
    pub fn from_pem(user_id: impl Into<String>, pem: &str) -> Result<Self, SigningError> {
        let private_key = if pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| SigningError::InvalidKey(e.to_string()))?
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| SigningError::InvalidKey(e.to_string()))?
        };
        Self::new(user_id, private_key)
    }

    pub fn from_pem_file(user_id: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, SigningError> {
        let path = path.as_ref();
        let pem = fs::read_to_string(path).map_err(|source| SigningError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_pem(user_id, &pem)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }

    /// Modulus size in bytes, i.e. the length of every signature block.
    pub fn key_size(&self) -> usize {
        self.private_key.size()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("key_bits", &(self.key_size() * 8))
            .finish_non_exhaustive()
    }
}
