// src/hash.rs

//! Hashing for catalog change detection and artifact integrity
//!
//! | Use Case | Algorithm | Why |
//! |----------|-----------|-----|
//! | Catalog change detection | MD5 | Fast equality check, not a security boundary |
//! | Dependency artifact verification | SHA-256 | Cryptographic integrity |
//!
//! Catalog digests are taken over a canonical serialization: the JSON is
//! parsed and written back with sorted keys and no whitespace, so a remote
//! catalog and its local mirror compare equal regardless of formatting.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// 128-bit, used only to detect catalog changes
    Md5,
    /// 256-bit cryptographic hash for downloaded artifacts
    Sha256,
}

impl HashAlgorithm {
    #[inline]
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha256 => 32,
        }
    }

    #[inline]
    pub const fn hex_len(&self) -> usize {
        self.output_len() * 2
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A hex digest together with the algorithm that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    pub algorithm: HashAlgorithm,
    pub value: String,
}

impl Hash {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Incremental hasher over either algorithm
pub struct Hasher {
    state: HasherState,
}

enum HasherState {
    Md5(Md5),
    Sha256(Sha256),
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Md5 => HasherState::Md5(Md5::new()),
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
        };
        Self { state }
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Md5(hasher) => hasher.update(data),
            HasherState::Sha256(hasher) => hasher.update(data),
        }
    }

    pub fn finalize(self) -> Hash {
        match self.state {
            HasherState::Md5(hasher) => Hash {
                algorithm: HashAlgorithm::Md5,
                value: hex::encode(hasher.finalize()),
            },
            HasherState::Sha256(hasher) => Hash {
                algorithm: HashAlgorithm::Sha256,
                value: hex::encode(hasher.finalize()),
            },
        }
    }
}

pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> Hash {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

pub fn hash_reader<R: Read>(algorithm: HashAlgorithm, reader: &mut R) -> io::Result<Hash> {
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

/// Digest of a catalog, computed over its canonical form
///
/// Content that is not JSON is digested as raw bytes; it can never match a
/// mirrored catalog, which is always valid JSON.
pub fn catalog_digest(content: &[u8]) -> Hash {
    match serde_json::from_slice::<serde_json::Value>(content) {
        // serde_json::Map is ordered by key, so to_vec is canonical
        Ok(value) => match serde_json::to_vec(&value) {
            Ok(canonical) => hash_bytes(HashAlgorithm::Md5, &canonical),
            Err(_) => hash_bytes(HashAlgorithm::Md5, content),
        },
        Err(_) => hash_bytes(HashAlgorithm::Md5, content),
    }
}

/// Hash mismatch reported by the verify functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyError {
    pub expected: String,
    pub actual: String,
    pub algorithm: HashAlgorithm,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatch: expected {}, got {}",
            self.algorithm, self.expected, self.actual
        )
    }
}

impl std::error::Error for VerifyError {}

/// Verify a file against an expected hex digest, streaming its content
pub fn verify_file(path: &Path, expected: &str, algorithm: HashAlgorithm) -> io::Result<Result<(), VerifyError>> {
    let mut file = File::open(path)?;
    let actual = hash_reader(algorithm, &mut file)?;
    if actual.value.eq_ignore_ascii_case(expected.trim()) {
        Ok(Ok(()))
    } else {
        Ok(Err(VerifyError {
            expected: expected.to_string(),
            actual: actual.value,
            algorithm,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hash_bytes(HashAlgorithm::Md5, b"hello world").value,
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
        assert_eq!(
            hash_bytes(HashAlgorithm::Sha256, b"hello world").value,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hex_len() {
        let hash = hash_bytes(HashAlgorithm::Md5, b"x");
        assert_eq!(hash.value.len(), HashAlgorithm::Md5.hex_len());
        let hash = hash_bytes(HashAlgorithm::Sha256, b"x");
        assert_eq!(hash.value.len(), HashAlgorithm::Sha256.hex_len());
    }

    #[test]
    fn test_catalog_digest_ignores_formatting() {
        let compact = br#"{"first":{"versions":["1.0","1.1"]},"second":{"versions":["1.0"]}}"#;
        let pretty = br#"{
  "second" : { "versions" : [ "1.0" ] },
  "first" : { "versions" : [ "1.0", "1.1" ] }
}"#;
        assert_eq!(catalog_digest(compact), catalog_digest(pretty));
    }

    #[test]
    fn test_catalog_digest_detects_changes() {
        let before = br#"{"first":{"versions":["1.0"]}}"#;
        let after = br#"{"first":{"versions":["1.0","1.1"]}}"#;
        assert_ne!(catalog_digest(before), catalog_digest(after));
    }

    #[test]
    fn test_catalog_digest_non_json() {
        let digest = catalog_digest(b"<html>not json</html>");
        assert_eq!(digest, hash_bytes(HashAlgorithm::Md5, b"<html>not json</html>"));
    }

    #[test]
    fn test_verify_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let ok = verify_file(
            file.path(),
            "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9",
            HashAlgorithm::Sha256,
        )
        .unwrap();
        assert!(ok.is_ok());

        let mismatch = verify_file(file.path(), "00", HashAlgorithm::Sha256).unwrap();
        assert!(mismatch.is_err());
    }
}
