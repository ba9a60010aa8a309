use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha1::{Digest, Sha1};

fn sha1_base64(data: &[u8]) -> String {
    BASE64.encode(Sha1::digest(data))
}

/// SHA-1 of the request body, base64 encoded.
///
/// A missing body hashes the same as an empty one.
pub fn content_hash(body: Option<&[u8]>) -> String {
    sha1_base64(body.unwrap_or_default())
}

/// SHA-1 of the URL path, base64 encoded.
pub fn path_hash(path: &str) -> String {
    sha1_base64(path.as_bytes())
}
