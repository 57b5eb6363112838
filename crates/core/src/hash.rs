//! BLAKE3 content hashing
//!
//! Every object and commit in a repository is named by a [`Blake3Hash`],
//! rendered on disk as 64 lowercase hex characters.

use crate::error::CoreError;
use anyhow::Result;
use std::path::Path;

/// A BLAKE3 digest (32 bytes)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Blake3Hash([u8; 32]);

impl Blake3Hash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering used for file names and commit records
    pub fn to_hex(&self) -> String {
        const HEX_CHARS: &[u8] = b"0123456789abcdef";
        let mut hex = String::with_capacity(64);
        for &byte in &self.0 {
            hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
            hex.push(HEX_CHARS[(byte & 0xf) as usize] as char);
        }
        hex
    }

    /// First `len` hex characters, for display
    pub fn short(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.min(64));
        hex
    }

    /// Parse a 64-character hex string
    ///
    /// Surrounding whitespace is ignored so values read straight from ref
    /// files (which may carry a trailing newline) parse cleanly.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(CoreError::InvalidArgument(format!(
                "invalid hash length: expected 64 hex characters, got {}",
                hex.len()
            ))
            .into());
        }

        let raw = hex.as_bytes();
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let high = hex_char_to_nibble(raw[i * 2])?;
            let low = hex_char_to_nibble(raw[i * 2 + 1])?;
            *byte = (high << 4) | low;
        }
        Ok(Self(bytes))
    }
}

fn hex_char_to_nibble(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(CoreError::InvalidArgument(format!("invalid hex character: {}", c as char)).into()),
    }
}

impl std::fmt::Debug for Blake3Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Blake3Hash({})", self.to_hex())
    }
}

impl std::fmt::Display for Blake3Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Blake3Hash {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

pub fn hash_bytes(data: &[u8]) -> Blake3Hash {
    let hash = blake3::hash(data);
    Blake3Hash::from_bytes(*hash.as_bytes())
}

/// Hash a file without loading it into memory
pub fn hash_file(path: &Path) -> Result<Blake3Hash> {
    use std::fs::File;
    use std::io::{BufReader, Read};

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = IncrementalHasher::new();

    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Incremental hasher, used to derive commit identities from many parts
pub struct IncrementalHasher {
    inner: blake3::Hasher,
}

impl IncrementalHasher {
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> Blake3Hash {
        let hash = self.inner.finalize();
        Blake3Hash::from_bytes(*hash.as_bytes())
    }
}

impl Default for IncrementalHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_consistency() {
        assert_eq!(hash_bytes(b"hello world"), hash_bytes(b"hello world"));
        assert_ne!(hash_bytes(b"hello"), hash_bytes(b"world"));
    }

    #[test]
    fn test_hex_roundtrip() {
        let original = Blake3Hash::from_bytes([42; 32]);
        let decoded = Blake3Hash::from_hex(&original.to_hex()).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_hex_is_lowercase() {
        let hex = Blake3Hash::from_bytes([0xde; 32]).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_from_hex_trims_trailing_newline() {
        let hash = hash_bytes(b"ref");
        let parsed = Blake3Hash::from_hex(&format!("{}\n", hash)).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Blake3Hash::from_hex("").is_err());
        assert!(Blake3Hash::from_hex("abc").is_err());
        assert!(Blake3Hash::from_hex(&"g".repeat(64)).is_err());

        let err = Blake3Hash::from_hex("abc").unwrap_err();
        assert!(CoreError::is_invalid_argument(&err));
    }

    #[test]
    fn test_short() {
        let hash = hash_bytes(b"short");
        assert_eq!(hash.short(8), hash.to_hex()[..8]);
        assert_eq!(hash.short(100).len(), 64);
    }

    #[test]
    fn test_incremental_matches_direct() {
        let mut incremental = IncrementalHasher::new();
        incremental.update(b"hello ");
        incremental.update(b"world");
        assert_eq!(incremental.finalize(), hash_bytes(b"hello world"));
    }

    #[test]
    fn test_hash_file_matches_bytes() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let file_path = temp_dir.path().join("test.txt");
        std::fs::write(&file_path, b"test file content")?;

        assert_eq!(hash_file(&file_path)?, hash_bytes(b"test file content"));
        Ok(())
    }

    #[test]
    fn test_hash_file_spanning_buffers() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let file_path = temp_dir.path().join("large.bin");
        let data = vec![0xAB; 3 * 8192 + 17];
        std::fs::write(&file_path, &data)?;

        assert_eq!(hash_file(&file_path)?, hash_bytes(&data));
        Ok(())
    }
}
