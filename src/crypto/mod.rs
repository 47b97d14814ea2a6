//! Password digests for the credential store.
//!
//! The stored format is base64(SHA-256(password)) using the standard alphabet
//! with padding, which is what the existing `Logins` rows already hold.
//!
//! The digest has no per-user salt and no work factor. Moving to a salted
//! adaptive hash requires rehashing at the next successful login, since the
//! stored value cannot be converted offline.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of an encoded digest (32 bytes in padded base64)
pub const DIGEST_LENGTH: usize = 44;

/// Compute the one-way digest of a raw password
pub fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Recompute the digest of `password` and compare it byte for byte with `stored`
pub fn verify_digest(password: &str, stored: &str) -> bool {
    let computed = digest_password(password);
    computed.as_bytes().ct_eq(stored.as_bytes()).into()
}
