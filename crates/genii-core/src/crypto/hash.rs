//! Pure synchronous hashing
//!
//! The single place that names the digest algorithm. Everything that needs a
//! digest goes through [`hash`] or [`hasher`], so the algorithm can only
//! change here.
//!
//! Current algorithm: **SHA-256** (256-bit / 32-byte output)

use sha2::{Digest, Sha256};

/// Digest output length in bytes
pub const HASH_LEN: usize = 32;

/// Hash arbitrary bytes to a 32-byte digest
pub fn hash(data: &[u8]) -> [u8; HASH_LEN] {
    let mut h = hasher();
    h.update(data);
    h.finalize()
}

/// Create an incremental hasher for multi-part input
pub fn hasher() -> Hasher {
    Hasher(Sha256::new())
}

/// Incremental hasher
#[derive(Clone)]
pub struct Hasher(Sha256);

impl Hasher {
    /// Feed more data
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    /// Finish and return the digest
    pub fn finalize(self) -> [u8; HASH_LEN] {
        let result = self.0.finalize();
        let mut output = [0u8; HASH_LEN];
        output.copy_from_slice(&result);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut h = hasher();
        h.update(b"hello");
        h.update(b" ");
        h.update(b"world");
        assert_eq!(h.finalize(), hash(b"hello world"));
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(
            hex::encode(hash(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
