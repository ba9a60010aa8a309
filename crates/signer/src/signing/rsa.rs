use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};

use crate::error::SigningError;

/// Bytes of PKCS#1 v1.5 padding overhead in every block.
const PKCS1_PADDING_LEN: usize = 11;

/// Raw RSA private-key "encryption" of `message`.
///
/// Block type 1 padding with no DigestInfo prefix, byte-for-byte what OpenSSL's
/// `RSA_private_encrypt` produces. The message is not hashed first, so it must
/// fit in the modulus minus the padding overhead.
///
/// The private-key operation is blinded; type 1 padding is deterministic, so
/// the output does not depend on the RNG.
pub fn private_encrypt(key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>, SigningError> {
    let required = message.len() + PKCS1_PADDING_LEN;
    let available = key.size();
    if required > available {
        return Err(SigningError::KeyTooSmall { required, available });
    }
    Ok(key.sign_with_rng(&mut OsRng, Pkcs1v15Sign::new_unprefixed(), message)?)
}

/// Public-key counterpart of [`private_encrypt`]: true if `block` decrypts to
/// exactly `expected`.
pub(crate) fn public_decrypt_matches(key: &RsaPublicKey, expected: &[u8], block: &[u8]) -> bool {
    key.verify(Pkcs1v15Sign::new_unprefixed(), expected, block).is_ok()
}
