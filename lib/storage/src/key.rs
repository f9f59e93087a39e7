// Cache key derivation
use sha2::{Digest, Sha256};

/// Length of a derived key in hex characters
pub const KEY_LEN: usize = 32;

/// Derive a stable key from a namespace prefix and its arguments
///
/// The key is the first 32 hex characters of SHA-256 over
/// `"prefix:part1:part2..."`.
pub fn cache_key<S: AsRef<str>>(prefix: &str, parts: &[S]) -> String {
    let mut material = String::from(prefix);
    for part in parts {
        material.push(':');
        material.push_str(part.as_ref());
    }

    let mut digest = format!("{:x}", Sha256::digest(material.as_bytes()));
    digest.truncate(KEY_LEN);
    digest
}
