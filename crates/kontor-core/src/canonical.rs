// SPDX-License-Identifier: Apache-2.0

use sha2::{Digest, Sha256};

#[must_use]
pub fn stable_hash_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Deterministic bucket assignment for percentage rollouts. The same
/// key maps to the same bucket in every process on every run; std's
/// `DefaultHasher` gives no such guarantee, so this goes through
/// sha256. Bucket is the first 8 digest bytes as a big-endian u64,
/// reduced mod `modulus`. A modulus of zero yields bucket zero.
#[must_use]
pub fn stable_bucket(key: &str, modulus: u64) -> u64 {
    if modulus == 0 {
        return 0;
    }
    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) % modulus
}

#[must_use]
pub fn stable_sort_by_key<T, K: Ord, F: FnMut(&T) -> K>(mut values: Vec<T>, mut key: F) -> Vec<T> {
    values.sort_by_key(|v| key(v));
    values
}
