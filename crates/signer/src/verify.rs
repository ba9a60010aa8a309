//! Receiving side of the signing protocol.
//!
//! Recomputes the canonical request from the descriptor and the plain headers,
//! then checks that the chunked signature decrypts to it under the user's
//! public key.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rsa::RsaPublicKey;
use tracing::{debug, warn};

use crate::error::VerificationError;
use crate::request::RequestDescriptor;
use crate::signing::{
    SIGN_DESCRIPTION, SignedHeaderSet, TIMESTAMP_FORMAT, canonical_string, content_hash, path_hash,
    public_decrypt_matches,
};

/// Chef server's default tolerance for client clock drift, in seconds.
pub const DEFAULT_MAX_SKEW_SECS: i64 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRequest {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Verifier {
    public_key: RsaPublicKey,
    max_skew: Duration,
}

impl Verifier {
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self {
            public_key,
            max_skew: Duration::seconds(DEFAULT_MAX_SKEW_SECS),
        }
    }

    pub fn with_max_skew(mut self, max_skew: Duration) -> Self {
        self.max_skew = max_skew;
        self
    }

    pub fn verify(
        &self,
        descriptor: &RequestDescriptor,
        headers: &SignedHeaderSet,
        now: DateTime<Utc>,
    ) -> Result<VerifiedRequest, VerificationError> {
        let sign = headers
            .get("X-Ops-Sign")
            .ok_or(VerificationError::MissingHeader("X-Ops-Sign"))?;
        if sign != SIGN_DESCRIPTION {
            return Err(VerificationError::UnsupportedSignVersion(sign.to_string()));
        }

        let user_id = headers
            .user_id()
            .ok_or(VerificationError::MissingHeader("X-Ops-UserId"))?;
        let timestamp_header = headers
            .timestamp()
            .ok_or(VerificationError::MissingHeader("X-Ops-Timestamp"))?;
        let claimed_hash = headers
            .content_hash()
            .ok_or(VerificationError::MissingHeader("X-Ops-Content-Hash"))?;

        let expected_hash = content_hash(descriptor.body());
        if claimed_hash != expected_hash {
            return Err(VerificationError::ContentHashMismatch);
        }

        let timestamp = parse_timestamp(timestamp_header)?;
        let skew = (now - timestamp).num_seconds().abs();
        if skew > self.max_skew.num_seconds() {
            warn!(user_id, skew_secs = skew, "rejecting request outside clock skew window");
            return Err(VerificationError::ClockSkew {
                skew_secs: skew,
                max_secs: self.max_skew.num_seconds(),
            });
        }

        let signature = joined_signature(headers)?;
        let block = BASE64.decode(signature)?;

        let canonical = canonical_string(
            descriptor.method,
            &path_hash(&descriptor.path),
            &expected_hash,
            timestamp_header,
            user_id,
        );
        if !public_decrypt_matches(&self.public_key, canonical.as_bytes(), &block) {
            debug!(user_id, path = %descriptor.path, "signature mismatch");
            return Err(VerificationError::SignatureMismatch);
        }

        debug!(user_id, path = %descriptor.path, "signature verified");
        Ok(VerifiedRequest {
            user_id: user_id.to_string(),
            timestamp,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, VerificationError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| VerificationError::InvalidTimestamp(value.to_string()))
}

/// Authorization chunks must be numbered 1..=N with no gaps.
fn joined_signature(headers: &SignedHeaderSet) -> Result<String, VerificationError> {
    let mut chunks = headers.authorization_chunks();
    if chunks.is_empty() {
        return Err(VerificationError::MissingAuthorization);
    }
    chunks.sort_by_key(|(n, _)| *n);
    for (expected, (n, _)) in (1..).zip(&chunks) {
        if *n != expected {
            return Err(VerificationError::NonContiguousAuthorization(expected));
        }
    }
    Ok(chunks.into_iter().map(|(_, value)| value).collect())
}
