use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::canonical::{canonical_string, format_timestamp};
use super::digest::{content_hash, path_hash};
use super::headers::{CHEF_VERSION, HeaderParts, SignedHeaderSet, assemble};
use super::rsa::private_encrypt;
use crate::error::SigningError;
use crate::identity::Identity;
use crate::request::RequestDescriptor;

/// Signs requests for one identity.
///
/// Signing is synchronous and CPU-bound. A signer holds no mutable state, so
/// one instance can be shared across threads.
#[derive(Debug)]
pub struct RequestSigner {
    identity: Identity,
    chef_version: String,
}

impl RequestSigner {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            chef_version: CHEF_VERSION.to_string(),
        }
    }

    pub fn with_chef_version(mut self, version: impl Into<String>) -> Self {
        self.chef_version = version.into();
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Sign with the current time. Every call reads the clock afresh.
    pub fn sign(&self, descriptor: &RequestDescriptor) -> Result<SignedHeaderSet, SigningError> {
        self.sign_at(descriptor, Utc::now())
    }

    /// Sign as of `instant`. Deterministic for fixed inputs.
    pub fn sign_at(
        &self,
        descriptor: &RequestDescriptor,
        instant: DateTime<Utc>,
    ) -> Result<SignedHeaderSet, SigningError> {
        sign_with(&self.identity, &self.chef_version, descriptor, instant)
    }
}

/// Sign `descriptor` on behalf of `identity` with the current time.
pub fn sign(identity: &Identity, descriptor: &RequestDescriptor) -> Result<SignedHeaderSet, SigningError> {
    sign_with(identity, CHEF_VERSION, descriptor, Utc::now())
}

fn sign_with(
    identity: &Identity,
    chef_version: &str,
    descriptor: &RequestDescriptor,
    instant: DateTime<Utc>,
) -> Result<SignedHeaderSet, SigningError> {
    let content_hash = content_hash(descriptor.body());
    let path_hash = path_hash(&descriptor.path);
    let timestamp = format_timestamp(instant);
    let user_id = identity.user_id();

    let canonical = canonical_string(
        descriptor.method,
        &path_hash,
        &content_hash,
        &timestamp,
        user_id,
    );
    trace!(%canonical, "canonical request");

    let block = private_encrypt(identity.private_key(), canonical.as_bytes())?;
    let signature = BASE64.encode(block);

    let headers = assemble(&HeaderParts {
        host: &descriptor.host,
        chef_version,
        content_hash: &content_hash,
        timestamp: &timestamp,
        user_id,
        signature: &signature,
    });

    debug!(
        user_id,
        method = %descriptor.method,
        path = %descriptor.path,
        chunks = headers.authorization_chunks().len(),
        "signed request"
    );

    Ok(headers)
}
