//! Credential hashing and range key derivation

use sha1::{Digest, Sha1};

use crate::constants::{HASH_LEN, PREFIX_LEN};
use crate::Error;

/// SHA-1 hash a password and return the uppercase hex digest
///
/// Hashes the raw bytes, so credentials that are not valid UTF-8 keep
/// their exact digest.
pub fn hash_password(password: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(password.as_ref());
    hex::encode_upper(hasher.finalize())
}

/// Split a full hash into its 5-char prefix and 35-char suffix
pub fn split_hash(hash: &str) -> crate::Result<(&str, &str)> {
    if hash.len() != HASH_LEN || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidHash(hash.to_string()));
    }
    Ok(hash.split_at(PREFIX_LEN))
}

/// Whether `prefix` is a 5-char uppercase hex range key
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() == PREFIX_LEN
        && prefix
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
}
