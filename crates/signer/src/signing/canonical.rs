use chrono::{DateTime, Utc};

use crate::request::Method;

/// Second precision, literal `Z`, no fractional part.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// The string the server recomputes and compares against the decrypted
/// signature.
///
/// ```text
/// Method:<METHOD>
/// Hashed Path:<path hash>
/// X-Ops-Content-Hash:<content hash>
/// X-Ops-Timestamp:<timestamp>
/// X-Ops-UserId:<user id>
/// ```
///
/// Field order is fixed by the protocol. There is no trailing newline.
pub fn canonical_string(
    method: Method,
    path_hash: &str,
    content_hash: &str,
    timestamp: &str,
    user_id: &str,
) -> String {
    format!(
        "Method:{method}\n\
         Hashed Path:{path_hash}\n\
         X-Ops-Content-Hash:{content_hash}\n\
         X-Ops-Timestamp:{timestamp}\n\
         X-Ops-UserId:{user_id}"
    )
}
