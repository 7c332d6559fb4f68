//! Block header decoding

use serde_json::json;

use crate::constants::{HASH_SIZE, HEADER_SIZE};
use crate::crypto::{Cid, Codec, Hash, HashFunction, HeaderHasher};
use crate::encoding::Reader;
use crate::error::{DecodeError, Result, ResultExt};
use crate::ipld::{no_such_path, remaining, value_at, Link, Node, Resolved};

/// A decoded 80-byte block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    version: u32,
    parent: Cid,
    merkle_root: Cid,
    timestamp: u32,
    difficulty: u32,
    nonce: u32,
    cid: Cid,
}

impl Block {
    /// Read the header fields and compute the block identifier with `hasher`
    ///
    /// The previous-block field always holds an X11 digest on the wire, so
    /// `parent` is tagged X11 whatever `hasher` is.
    pub fn decode<H: HeaderHasher + ?Sized>(r: &mut Reader<'_>, hasher: &H) -> Result<Self> {
        Self::read_fields(r, hasher).map_err(|e| DecodeError::HeaderTruncated(Box::new(e)))
    }

    fn read_fields<H: HeaderHasher + ?Sized>(r: &mut Reader<'_>, hasher: &H) -> Result<Self> {
        let version = r.read_u32().context("version")?;
        let prev_block: [u8; HASH_SIZE] = r.read_array().context("prev_block")?;
        let merkle_root: [u8; HASH_SIZE] = r.read_array().context("merkle_root")?;
        let timestamp = r.read_u32().context("timestamp")?;
        let difficulty = r.read_u32().context("difficulty")?;
        let nonce = r.read_u32().context("nonce")?;

        let mut block = Self {
            version,
            parent: Cid::wrap(Hash(prev_block), HashFunction::X11, Codec::DashBlock),
            merkle_root: Cid::tx(Hash(merkle_root)),
            timestamp,
            difficulty,
            nonce,
            cid: Cid::tx(Hash::zero()),
        };
        let digest = hasher.digest(&block.header_bytes());
        block.cid = Cid::wrap(digest, hasher.hash_function(), Codec::DashBlock);
        Ok(block)
    }

    /// Re-serialize the header
    pub fn header_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(self.parent.digest().as_bytes());
        out[36..68].copy_from_slice(self.merkle_root.digest().as_bytes());
        out[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        out[72..76].copy_from_slice(&self.difficulty.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Identifier of the previous block
    pub fn parent(&self) -> &Cid {
        &self.parent
    }

    /// Identifier of the transaction merkle root committed in the header
    pub fn merkle_root(&self) -> &Cid {
        &self.merkle_root
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Compact difficulty target ("bits")
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn cid(&self) -> Cid {
        self.cid
    }

    /// Block hash as explorers print it
    pub fn hex_hash(&self) -> String {
        self.cid.to_hex_hash()
    }
}

impl Node for Block {
    fn cid(&self) -> Cid {
        self.cid
    }

    fn raw_data(&self) -> Vec<u8> {
        self.header_bytes().to_vec()
    }

    fn links(&self) -> Vec<Link> {
        vec![
            Link::new("parent", self.parent),
            Link::new("tx", self.merkle_root),
        ]
    }

    fn paths(&self) -> Vec<String> {
        ["parent", "tx", "version", "timestamp", "difficulty", "nonce"]
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    fn resolve(&self, path: &[&str]) -> Result<(Resolved, Vec<String>)> {
        match path.first().copied() {
            Some("parent") => Ok((Resolved::Link(self.parent), remaining(path, 1))),
            // the merkle root is the top tree node (or the only transaction)
            Some("tx") => Ok((Resolved::Link(self.merkle_root), remaining(path, 1))),
            Some("version") => value_at(path, 1, json!(self.version)),
            Some("timestamp") => value_at(path, 1, json!(self.timestamp)),
            Some("difficulty") => value_at(path, 1, json!(self.difficulty)),
            Some("nonce") => value_at(path, 1, json!(self.nonce)),
            _ => Err(no_such_path(path)),
        }
    }
}
