//! Double-SHA256 hashing
//!
//! Dash hashes transactions and merkle nodes with SHA256 applied twice.
//! Block headers use X11, which this crate does not implement; callers
//! plug it in through [`HeaderHasher`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::HashFunction;
use crate::constants::HEADER_SIZE;

/// 32-byte digest in internal (wire) byte order
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub const fn zero() -> Self {
        Hash([0u8; 32])
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// Create hash from hex string, in internal byte order
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Hash(arr))
    }

    /// Hex in internal byte order
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hex in display order (byte-reversed), as block explorers print hashes
    pub fn to_hex_reversed(&self) -> String {
        let mut rev = self.0;
        rev.reverse();
        hex::encode(rev)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

/// SHA256(SHA256(data))
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    Hash(out)
}

/// Hash two digests together (for the merkle tree)
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(&left.0);
    data.extend_from_slice(&right.0);
    double_sha256(&data)
}

/// Computes block identity from the serialized 80-byte header
pub trait HeaderHasher {
    /// Multihash function tag for digests this hasher produces
    fn hash_function(&self) -> HashFunction;

    fn digest(&self, header: &[u8; HEADER_SIZE]) -> Hash;
}

/// Bitcoin-style block hashing
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleSha256Hasher;

impl HeaderHasher for DoubleSha256Hasher {
    fn hash_function(&self) -> HashFunction {
        HashFunction::DoubleSha256
    }

    fn digest(&self, header: &[u8; HEADER_SIZE]) -> Hash {
        double_sha256(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256_empty() {
        // sha256d("") is a well known constant
        assert_eq!(
            double_sha256(b"").to_hex(),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_hash_pair_order_matters() {
        let left = double_sha256(b"left");
        let right = double_sha256(b"right");
        assert_eq!(hash_pair(&left, &right), hash_pair(&left, &right));
        assert_ne!(hash_pair(&left, &right), hash_pair(&right, &left));
    }

    #[test]
    fn test_hex_roundtrip_and_reverse() {
        let hash = double_sha256(b"test");
        assert_eq!(Hash::from_hex(&hash.to_hex()).unwrap(), hash);

        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        assert!(Hash(bytes).to_hex_reversed().ends_with("ab"));
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Hash::from_hex("abcd").is_err());
    }
}
