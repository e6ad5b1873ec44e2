//! BLAKE3-based hashing helpers (feature hashing, stable ids).

use blake3::Hasher;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Collisions are tolerated by every caller: feature hashing only blurs two
/// tokens into one bucket, and fingerprints are informational.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Maps a feature token to a `(bucket, sign)` pair for a `dim`-wide hashed vector.
///
/// The sign bit comes from a different part of the digest than the bucket so
/// colliding tokens tend to cancel rather than accumulate.
#[inline]
pub fn hash_feature(namespace: &str, token: &str, dim: usize) -> (usize, f32) {
    let mut hasher = Hasher::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"|");
    hasher.update(token.as_bytes());
    let hash = hasher.finalize();
    let bytes = hash.as_bytes();

    let bucket_bytes: [u8; 8] = bytes[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    let bucket = (u64::from_le_bytes(bucket_bytes) % dim.max(1) as u64) as usize;
    let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}

/// Short hex fingerprint of an attribute, used in logs instead of raw text.
#[inline]
pub fn fingerprint(text: &str) -> String {
    format!("{:016x}", hash_to_u64(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_u64_deterministic() {
        assert_eq!(hash_to_u64(b"python"), hash_to_u64(b"python"));
        assert_ne!(hash_to_u64(b"python"), hash_to_u64(b"pytorch"));
    }

    #[test]
    fn test_hash_feature_in_range() {
        for token in ["a", "rust", "machine learning", "çà"] {
            let (bucket, sign) = hash_feature("w", token, 64);
            assert!(bucket < 64);
            assert!(sign == 1.0 || sign == -1.0);
        }
    }

    #[test]
    fn test_hash_feature_namespaced() {
        let word = hash_feature("w", "abc", 1 << 20);
        let gram = hash_feature("g", "abc", 1 << 20);
        assert_ne!(word, gram);
    }

    #[test]
    fn test_fingerprint_width() {
        assert_eq!(fingerprint("CUDA").len(), 16);
    }
}
