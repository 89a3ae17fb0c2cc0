//! SHA-512 password digests.
//!
//! # Output format
//!
//! ```text
//! base64(sha512(password bytes))    // standard alphabet, padded, 88 chars
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};

/// Hash `password` with SHA-512 and return the standard base64 encoding.
///
/// Hashing cannot fail; any byte sequence, including the empty one, is accepted.
pub fn encode_password(password: &[u8]) -> String {
    let hash = Sha512::digest(password);
    STANDARD.encode(hash)
}
