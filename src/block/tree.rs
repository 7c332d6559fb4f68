//! Intermediate merkle tree nodes

use crate::constants::{HASH_SIZE, TX_TREE_SIZE};
use crate::crypto::{hash_pair, Cid, Hash};
use crate::error::{DecodeError, Result};
use crate::ipld::{no_such_path, remaining, Link, Node, Resolved};

/// One internal node of a block's transaction merkle tree
///
/// Children are either transactions or lower tree nodes and are held by
/// identifier only. Never appears on the wire except in the 64-byte
/// compact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxTree {
    left: Cid,
    right: Cid,
    cid: Cid,
}

impl TxTree {
    pub fn new(left: Cid, right: Cid) -> Self {
        let cid = Cid::tx(hash_pair(left.digest(), right.digest()));
        Self { left, right, cid }
    }

    /// Decode the compact form: two 32-byte child digests, nothing else
    pub fn from_compact(data: &[u8]) -> Result<Self> {
        if data.len() != TX_TREE_SIZE {
            return Err(DecodeError::InvalidCompactTree(data.len()));
        }
        let mut left = [0u8; HASH_SIZE];
        let mut right = [0u8; HASH_SIZE];
        left.copy_from_slice(&data[..HASH_SIZE]);
        right.copy_from_slice(&data[HASH_SIZE..]);
        Ok(Self::new(Cid::tx(Hash(left)), Cid::tx(Hash(right))))
    }

    pub fn left(&self) -> &Cid {
        &self.left
    }

    pub fn right(&self) -> &Cid {
        &self.right
    }

    pub fn cid(&self) -> Cid {
        self.cid
    }

    /// The compact 64-byte form
    pub fn to_compact(&self) -> [u8; TX_TREE_SIZE] {
        let mut out = [0u8; TX_TREE_SIZE];
        out[..HASH_SIZE].copy_from_slice(self.left.digest().as_bytes());
        out[HASH_SIZE..].copy_from_slice(self.right.digest().as_bytes());
        out
    }
}

impl Node for TxTree {
    fn cid(&self) -> Cid {
        self.cid
    }

    fn raw_data(&self) -> Vec<u8> {
        self.to_compact().to_vec()
    }

    fn links(&self) -> Vec<Link> {
        vec![Link::new("0", self.left), Link::new("1", self.right)]
    }

    fn paths(&self) -> Vec<String> {
        vec!["0".to_string(), "1".to_string()]
    }

    fn resolve(&self, path: &[&str]) -> Result<(Resolved, Vec<String>)> {
        match path.first() {
            Some(&"0") => Ok((Resolved::Link(self.left), remaining(path, 1))),
            Some(&"1") => Ok((Resolved::Link(self.right), remaining(path, 1))),
            _ => Err(no_such_path(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::double_sha256;

    fn pair() -> (Cid, Cid) {
        (
            Cid::tx(double_sha256(b"left")),
            Cid::tx(double_sha256(b"right")),
        )
    }

    #[test]
    fn test_compact_form_roundtrip() {
        let (left, right) = pair();
        let tree = TxTree::new(left, right);
        let decoded = TxTree::from_compact(&tree.to_compact()).unwrap();
        assert_eq!(decoded, tree);
        assert_eq!(decoded.size(), 64);
    }

    #[test]
    fn test_compact_form_requires_64_bytes() {
        let err = TxTree::from_compact(&[0u8; 63]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidCompactTree(63)));
    }

    #[test]
    fn test_cid_hashes_raw_pair() {
        let (left, right) = pair();
        let tree = TxTree::new(left, right);
        assert_eq!(tree.cid(), Cid::tx(double_sha256(&tree.raw_data())));
    }

    #[test]
    fn test_links_and_resolve() {
        let (left, right) = pair();
        let tree = TxTree::new(left, right);

        let links = tree.links();
        assert_eq!(links[0], Link::new("0", left));
        assert_eq!(links[1], Link::new("1", right));

        let (cid, rest) = tree.resolve_link(&["1", "inputs", "0"]).unwrap();
        assert_eq!(cid, right);
        assert_eq!(rest, vec!["inputs".to_string(), "0".to_string()]);

        assert!(tree.resolve(&["2"]).is_err());
        assert!(tree.resolve(&[]).is_err());
        assert_eq!(tree.tree("", None), vec!["0", "1"]);
    }
}
