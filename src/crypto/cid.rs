//! Content identifiers
//!
//! A [`Cid`] is a digest tagged with the hash function that produced it and
//! the content type it addresses. Wrapping never re-hashes: the digest
//! bytes are stored exactly as given.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Hash;

/// CID version emitted by this crate
pub const CID_VERSION: u64 = 1;

/// Content type tag (multicodec)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Codec {
    DashBlock,
    DashTx,
}

impl Codec {
    pub const fn code(self) -> u64 {
        match self {
            Codec::DashBlock => 0xf0,
            Codec::DashTx => 0xf1,
        }
    }
}

/// Hash function tag (multihash)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashFunction {
    X11,
    DoubleSha256,
}

impl HashFunction {
    pub const fn code(self) -> u64 {
        match self {
            HashFunction::X11 => 0x1100,
            HashFunction::DoubleSha256 => 0x56,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cid {
    codec: Codec,
    hash: HashFunction,
    digest: Hash,
}

impl Cid {
    /// Tag `digest` with a hash function and codec
    pub fn wrap(digest: Hash, hash: HashFunction, codec: Codec) -> Self {
        Self {
            codec,
            hash,
            digest,
        }
    }

    /// Identifier for a transaction or merkle node digest
    pub fn tx(digest: Hash) -> Self {
        Self::wrap(digest, HashFunction::DoubleSha256, Codec::DashTx)
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn hash_function(&self) -> HashFunction {
        self.hash
    }

    pub fn digest(&self) -> &Hash {
        &self.digest
    }

    /// Binary CIDv1: version, codec, multihash code, digest length, digest
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(40);
        put_uvarint(&mut out, CID_VERSION);
        put_uvarint(&mut out, self.codec.code());
        put_uvarint(&mut out, self.hash.code());
        put_uvarint(&mut out, self.digest.0.len() as u64);
        out.extend_from_slice(&self.digest.0);
        out
    }

    /// The digest as explorers print it (byte-reversed hex)
    pub fn to_hex_hash(&self) -> String {
        self.digest.to_hex_reversed()
    }
}

// multiformats varints are LEB128, unlike the compact-size ints on the wire
fn put_uvarint(out: &mut Vec<u8>, mut n: u64) {
    while n >= 0x80 {
        out.push((n as u8) | 0x80);
        n >>= 7;
    }
    out.push(n as u8);
}

impl fmt::Display for Cid {
    /// Multibase base58btc
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "z{}", bs58::encode(self.to_bytes()).into_string())
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({:?}, {:?}, {})", self.codec, self.hash, self.digest)
    }
}
