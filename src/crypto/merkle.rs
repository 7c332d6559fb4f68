//! Merkle tree assembly
//!
//! Rebuilds the transaction merkle tree of a block from the transaction
//! identifiers alone. An odd layer duplicates its last element before
//! pairing, as Dash consensus does.

use tracing::trace;

use super::{hash_pair, Cid};
use crate::block::TxTree;

/// Build every internal node of the tree over `leaves`
///
/// Nodes come out in creation order: the lowest layer first, left to
/// right, with the root last. A layer of zero or one leaves yields no
/// nodes at all.
pub fn build_merkle_tree(leaves: &[Cid]) -> Vec<TxTree> {
    let mut out = Vec::new();
    let mut layer: Vec<Cid> = leaves.to_vec();

    while layer.len() > 1 {
        if layer.len() % 2 == 1 {
            layer.push(layer[layer.len() - 1]);
        }
        trace!(width = layer.len(), "merkle layer");

        let next: Vec<TxTree> = layer
            .chunks(2)
            .map(|pair| TxTree::new(pair[0], pair[1]))
            .collect();

        layer = next.iter().map(TxTree::cid).collect();
        out.extend(next);
    }

    out
}

/// The merkle root over `leaves`
///
/// A single leaf is its own root; an empty list has none.
pub fn merkle_root(leaves: &[Cid]) -> Option<Cid> {
    match leaves {
        [] => None,
        [only] => Some(*only),
        _ => build_merkle_tree(leaves).last().map(TxTree::cid),
    }
}

/// Merkle proof for a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Index of the transaction in the block
    pub index: usize,
    /// Sibling identifiers from leaf to root
    pub siblings: Vec<(Cid, bool)>, // (sibling, is_left)
}

impl MerkleProof {
    /// Build a proof for the leaf at `index`
    pub fn build(leaves: &[Cid], index: usize) -> Option<Self> {
        if index >= leaves.len() {
            return None;
        }

        let mut layer: Vec<Cid> = leaves.to_vec();
        let mut position = index;
        let mut siblings = Vec::new();

        while layer.len() > 1 {
            if layer.len() % 2 == 1 {
                layer.push(layer[layer.len() - 1]);
            }

            let is_left = position % 2 == 1;
            let sibling = if is_left { position - 1 } else { position + 1 };
            siblings.push((layer[sibling], is_left));

            layer = layer
                .chunks(2)
                .map(|pair| TxTree::new(pair[0], pair[1]).cid())
                .collect();
            position /= 2;
        }

        Some(MerkleProof { index, siblings })
    }

    /// Verify this proof against a root identifier
    pub fn verify(&self, leaf: &Cid, root: &Cid) -> bool {
        let mut current = *leaf;

        for (sibling, is_left) in &self.siblings {
            let digest = if *is_left {
                hash_pair(sibling.digest(), current.digest())
            } else {
                hash_pair(current.digest(), sibling.digest())
            };
            current = Cid::tx(digest);
        }

        current == *root
    }
}
