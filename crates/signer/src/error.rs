use std::io;
use std::path::PathBuf;

/// Failure to produce a signed header set.
///
/// Fatal to the signing attempt: no partial headers are ever returned.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("private key is not usable for RSA: {0}")]
    InvalidKey(String),
    #[error("failed to read private key from {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("private key too small: canonical request needs {required} bytes of RSA capacity, key offers {available}")]
    KeyTooSmall { required: usize, available: usize },
    #[error("RSA private-key operation failed: {0}")]
    Rsa(#[from] rsa::Error),
}

/// Reasons a received request fails signature verification.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("missing header {0}")]
    MissingHeader(&'static str),
    #[error("unsupported X-Ops-Sign value: {0}")]
    UnsupportedSignVersion(String),
    #[error("content hash does not match request body")]
    ContentHashMismatch,
    #[error("invalid X-Ops-Timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("request timestamp is {skew_secs}s away from server time (max {max_secs}s)")]
    ClockSkew { skew_secs: i64, max_secs: i64 },
    #[error("no X-Ops-Authorization headers present")]
    MissingAuthorization,
    #[error("X-Ops-Authorization headers are not numbered contiguously from 1 (gap at {0})")]
    NonContiguousAuthorization(usize),
    #[error("signature is not valid base64: {0}")]
    InvalidSignatureEncoding(#[from] base64::DecodeError),
    #[error("signature does not match canonical request")]
    SignatureMismatch,
}
