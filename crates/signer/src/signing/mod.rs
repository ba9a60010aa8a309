mod digest;
mod canonical;
mod rsa;
mod headers;
mod signer;

pub use digest::{content_hash, path_hash};
pub use canonical::{TIMESTAMP_FORMAT, canonical_string, format_timestamp};
pub use self::rsa::private_encrypt;
pub use headers::{
    AUTHORIZATION_PREFIX, CHEF_VERSION, CHUNK_LEN, SIGN_DESCRIPTION, SignedHeaderSet,
    chunk_signature,
};
pub use signer::{RequestSigner, sign};

pub(crate) use self::rsa::public_decrypt_matches;
