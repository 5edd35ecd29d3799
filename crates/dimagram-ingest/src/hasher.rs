use dimagram_types::{ContentAddress, DigestAlgorithm};
use sha2::{Digest, Sha256};

/// Incremental content hasher fed chunk by chunk while an upload streams in.
///
/// No domain separation is applied: the address must be the plain digest of
/// the bytes so that anyone can recompute it from the blob.
pub enum StreamingHasher {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl StreamingHasher {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(chunk),
            Self::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }

    /// Finish hashing and build the address for `extension_hint`.
    pub fn into_address(self, extension_hint: &str) -> ContentAddress {
        ContentAddress::new(&self.finalize(), extension_hint)
    }

    /// One-shot address of an in-memory buffer.
    pub fn address_of(algorithm: DigestAlgorithm, data: &[u8], extension_hint: &str) -> ContentAddress {
        let mut hasher = Self::new(algorithm);
        hasher.update(data);
        hasher.into_address(extension_hint)
    }
}
