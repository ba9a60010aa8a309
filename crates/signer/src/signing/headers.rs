/// Maximum length of one `X-Ops-Authorization-N` header value.
pub const CHUNK_LEN: usize = 60;

pub const AUTHORIZATION_PREFIX: &str = "X-Ops-Authorization-";

/// Client version advertised in `X-Chef-Version`.
pub const CHEF_VERSION: &str = "17.99.99";

/// Value of `X-Ops-Sign` for the SHA-1, version 1.0 scheme.
pub const SIGN_DESCRIPTION: &str = "algorithm=sha1;version=1.0;";

pub(crate) const ACCEPT: &str = "Accept";
pub(crate) const CONTENT_TYPE: &str = "Content-Type";
pub(crate) const HOST: &str = "Host";
pub(crate) const X_CHEF_VERSION: &str = "X-Chef-Version";
pub(crate) const X_OPS_CONTENT_HASH: &str = "X-Ops-Content-Hash";
pub(crate) const X_OPS_SIGN: &str = "X-Ops-Sign";
pub(crate) const X_OPS_TIMESTAMP: &str = "X-Ops-Timestamp";
pub(crate) const X_OPS_USERID: &str = "X-Ops-UserId";

const JSON: &str = "application/json";

/// Split a base64 signature into 60-character pieces. The last one may be
/// shorter.
///
/// Base64 output is ASCII, so byte offsets are char boundaries.
pub fn chunk_signature(signature: &str) -> Vec<&str> {
    signature
        .as_bytes()
        .chunks(CHUNK_LEN)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect()
}

/// Ordered header name/value pairs for one signed request.
///
/// Names keep the exact spelling the protocol uses; lookups ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedHeaderSet {
    headers: Vec<(String, String)>,
}

impl SignedHeaderSet {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn content_hash(&self) -> Option<&str> {
        self.get(X_OPS_CONTENT_HASH)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get(X_OPS_TIMESTAMP)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get(X_OPS_USERID)
    }

    /// `X-Ops-Authorization-N` values keyed by N, in header order.
    pub fn authorization_chunks(&self) -> Vec<(usize, &str)> {
        self.headers
            .iter()
            .filter_map(|(name, value)| {
                let index = strip_prefix_ignore_case(name, AUTHORIZATION_PREFIX)?;
                index.parse::<usize>().ok().map(|n| (n, value.as_str()))
            })
            .collect()
    }

    /// The full base64 signature, chunks joined in numeric order.
    pub fn signature(&self) -> String {
        let mut chunks = self.authorization_chunks();
        chunks.sort_by_key(|(n, _)| *n);
        chunks.into_iter().map(|(_, value)| value).collect()
    }

    fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for SignedHeaderSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            headers: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for SignedHeaderSet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.into_iter()
    }
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &name[prefix.len()..])
}

/// Inputs to header assembly, all already computed.
pub(crate) struct HeaderParts<'a> {
    pub host: &'a str,
    pub chef_version: &'a str,
    pub content_hash: &'a str,
    pub timestamp: &'a str,
    pub user_id: &'a str,
    pub signature: &'a str,
}

/// Fixed headers first, then one `X-Ops-Authorization-N` per chunk, N from 1.
pub(crate) fn assemble(parts: &HeaderParts<'_>) -> SignedHeaderSet {
    let mut set = SignedHeaderSet::default();
    set.push(ACCEPT, JSON);
    set.push(CONTENT_TYPE, JSON);
    set.push(HOST, parts.host);
    set.push(X_CHEF_VERSION, parts.chef_version);
    set.push(X_OPS_CONTENT_HASH, parts.content_hash);
    set.push(X_OPS_SIGN, SIGN_DESCRIPTION);
    set.push(X_OPS_TIMESTAMP, parts.timestamp);
    set.push(X_OPS_USERID, parts.user_id);
    for (index, chunk) in chunk_signature(parts.signature).into_iter().enumerate() {
        set.push(format!("{AUTHORIZATION_PREFIX}{}", index + 1), chunk);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(signature: &str) -> HeaderParts<'_> {
        HeaderParts {
            host: "chef.example.com",
            chef_version: CHEF_VERSION,
            content_hash: "2jmj7l5rSw0yVb/vlWAYkK/YBwk=",
            timestamp: "2026-01-01T00:00:00Z",
            user_id: "test-client",
            signature,
        }
    }

    #[test]
    fn chunks_are_sixty_chars() {
        let signature = "A".repeat(344);
        let chunks = chunk_signature(&signature);
        assert_eq!(chunks.len(), 6);
        assert!(chunks[..5].iter().all(|c| c.len() == 60));
        assert_eq!(chunks[5].len(), 44);
        assert_eq!(chunks.concat(), signature);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let signature = "B".repeat(120);
        assert_eq!(chunk_signature(&signature).len(), 2);
    }

    #[test]
    fn short_signature_is_one_chunk() {
        assert_eq!(chunk_signature("abc"), vec!["abc"]);
    }

    #[test]
    fn assembled_header_order() {
        let signature = "C".repeat(130);
        let set = assemble(&parts(&signature));
        let names: Vec<&str> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "Accept",
                "Content-Type",
                "Host",
                "X-Chef-Version",
                "X-Ops-Content-Hash",
                "X-Ops-Sign",
                "X-Ops-Timestamp",
                "X-Ops-UserId",
                "X-Ops-Authorization-1",
                "X-Ops-Authorization-2",
                "X-Ops-Authorization-3",
            ]
        );
    }

    #[test]
    fn fixed_header_values() {
        let set = assemble(&parts("sig"));
        assert_eq!(set.get("Accept"), Some("application/json"));
        assert_eq!(set.get("Content-Type"), Some("application/json"));
        assert_eq!(set.get("Host"), Some("chef.example.com"));
        assert_eq!(set.get("X-Chef-Version"), Some("17.99.99"));
        assert_eq!(set.get("X-Ops-Sign"), Some("algorithm=sha1;version=1.0;"));
        assert_eq!(set.user_id(), Some("test-client"));
        assert_eq!(set.timestamp(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn lookup_ignores_case() {
        let set = assemble(&parts("sig"));
        assert_eq!(set.get("x-ops-userid"), Some("test-client"));
        assert_eq!(set.get("X-OPS-AUTHORIZATION-1"), Some("sig"));
    }

    #[test]
    fn signature_rejoins_out_of_order_chunks() {
        let set: SignedHeaderSet = vec![
            ("x-ops-authorization-2", "world"),
            ("X-Ops-UserId", "someone"),
            ("X-OPS-AUTHORIZATION-1", "hello"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.authorization_chunks(), vec![(2, "world"), (1, "hello")]);
        assert_eq!(set.signature(), "helloworld");
    }
}
