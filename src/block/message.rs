//! Block message decoding - the entry point
//!
//! A block message is an 80-byte header, a varint transaction count and
//! that many transactions. Decoding it yields the header node, the
//! transaction nodes and the merkle tree nodes that link the transactions
//! to the root in the header.

use tracing::{debug, error};

use super::{Block, Tx, TxTree};
use crate::config::DecoderConfig;
use crate::constants::TX_TREE_SIZE;
use crate::crypto::{build_merkle_tree, Cid, DoubleSha256Hasher, HeaderHasher};
use crate::encoding::Reader;
use crate::error::{DecodeError, Result, ResultExt};
use crate::ipld::DashNode;

/// Decodes messages with a given configuration and block hash function
#[derive(Debug, Clone, Default)]
pub struct Decoder<H = DoubleSha256Hasher> {
    config: DecoderConfig,
    hasher: H,
}

impl<H: HeaderHasher> Decoder<H> {
    pub fn new(config: DecoderConfig, hasher: H) -> Self {
        Self { config, hasher }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a full block message
    ///
    /// Returns `[block, tx_0 .. tx_n-1, tree_0 .. tree_m-1]`, tree nodes
    /// lowest layer first and the root last.
    pub fn decode_block_message(&self, data: &[u8]) -> Result<Vec<DashNode>> {
        let mut r = Reader::new(data);
        let start = r.position();
        let block = Block::decode(&mut r, &self.hasher)?;

        if block.header_bytes()[..] != *r.consumed_since(start) {
            error!(block = %block.cid(), "re-serialized header differs from input");
            return Err(DecodeError::HeaderReplayMismatch);
        }

        let tx_count = r.read_varint().context("tx_count")?;
        if let Some(max) = self.config.max_tx_count {
            if tx_count > max {
                return Err(DecodeError::VarintOverflow(tx_count as u64).field("tx_count"));
            }
        }

        let mut txs = Vec::with_capacity(tx_count.min(r.remaining()));
        for i in 0..tx_count {
            txs.push(Tx::decode(&mut r).element_context("tx", i, tx_count)?);
        }

        let leaves: Vec<Cid> = txs.iter().map(Tx::cid).collect();
        let tree = build_merkle_tree(&leaves);

        if self.config.verify_merkle_root {
            let root = tree.last().map(TxTree::cid).or_else(|| leaves.first().copied());
            if let Some(actual) = root {
                if actual != *block.merkle_root() {
                    return Err(DecodeError::MerkleRootMismatch {
                        expected: *block.merkle_root(),
                        actual,
                    });
                }
            }
        }

        debug!(
            block = %block.cid(),
            txs = txs.len(),
            tree_nodes = tree.len(),
            "decoded block message"
        );

        let mut out = Vec::with_capacity(1 + txs.len() + tree.len());
        out.push(DashNode::Block(block));
        out.extend(txs.into_iter().map(DashNode::Tx));
        out.extend(tree.into_iter().map(DashNode::TxTree));
        Ok(out)
    }

    /// Decode only the 80-byte header
    pub fn decode_block(&self, data: &[u8]) -> Result<Block> {
        Block::decode(&mut Reader::new(data), &self.hasher)
    }

    /// Decode a single transaction; trailing bytes are ignored
    pub fn decode_tx(&self, data: &[u8]) -> Result<Tx> {
        Tx::decode(&mut Reader::new(data))
    }

    /// Decode the compact 64-byte tree node form
    pub fn decode_tx_tree(&self, data: &[u8]) -> Result<TxTree> {
        TxTree::from_compact(data)
    }

    /// A tree node if `data` is exactly 64 bytes, a transaction otherwise
    pub fn decode_maybe_tx(&self, data: &[u8]) -> Result<DashNode> {
        if data.len() == TX_TREE_SIZE {
            return self.decode_tx_tree(data).map(DashNode::TxTree);
        }
        self.decode_tx(data).map(DashNode::Tx)
    }
}

fn default_decoder() -> Decoder {
    Decoder::default()
}

pub fn decode_block_message(data: &[u8]) -> Result<Vec<DashNode>> {
    default_decoder().decode_block_message(data)
}

pub fn decode_block(data: &[u8]) -> Result<Block> {
    default_decoder().decode_block(data)
}

pub fn decode_tx(data: &[u8]) -> Result<Tx> {
    default_decoder().decode_tx(data)
}

pub fn decode_tx_tree(data: &[u8]) -> Result<TxTree> {
    default_decoder().decode_tx_tree(data)
}

pub fn decode_maybe_tx(data: &[u8]) -> Result<DashNode> {
    default_decoder().decode_maybe_tx(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HEADER_SIZE;
    use crate::ipld::Node;

    const SINGLE_TX_BLOCK: &str = "020000003f3572d8d15aca3f37279470b505f73806cc8e1ef7c23bf0b7f942d4160f00006345fa110fa94b3bde54bfea8f14b0473033869bcc606eda15f3388e201fce1cad4cdb52f0ff0f1e6c1500000101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff0a5a0105062f503253482fffffffff0100743ba40b000000232102360b177e5d3402b7e7daf439cbaed6e686749cbebb47423ec01547ca7aa734f5ac00000000";

    fn single() -> Vec<u8> {
        hex::decode(SINGLE_TX_BLOCK).unwrap()
    }

    #[test]
    fn test_single_tx_has_no_tree() {
        let nodes = decode_block_message(&single()).unwrap();
        assert_eq!(nodes.len(), 2);

        let block = nodes[0].as_block().unwrap();
        let tx = nodes[1].as_tx().unwrap();
        assert_eq!(block.merkle_root(), &tx.cid());
        assert!(tx.is_coinbase());
    }

    #[test]
    fn test_zero_transactions() {
        let mut data = single()[..HEADER_SIZE].to_vec();
        data.push(0x00);
        let nodes = decode_block_message(&data).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_missing_tx_count() {
        let data = single()[..HEADER_SIZE].to_vec();
        let err = decode_block_message(&data).unwrap_err();
        assert!(err.is_truncated());
        assert!(err.to_string().starts_with("failed to parse tx_count"));
    }

    #[test]
    fn test_merkle_root_mismatch() {
        let mut data = single();
        data[40] ^= 0xff;
        let err = decode_block_message(&data).unwrap_err();
        assert!(matches!(err, DecodeError::MerkleRootMismatch { .. }));

        let lenient = Decoder::new(
            DecoderConfig {
                verify_merkle_root: false,
                ..DecoderConfig::default()
            },
            DoubleSha256Hasher,
        );
        assert_eq!(lenient.decode_block_message(&data).unwrap().len(), 2);
    }

    #[test]
    fn test_max_tx_count() {
        let decoder = Decoder::new(
            DecoderConfig {
                max_tx_count: Some(0),
                ..DecoderConfig::default()
            },
            DoubleSha256Hasher,
        );
        let err = decoder.decode_block_message(&single()).unwrap_err();
        assert!(matches!(err.root_cause(), DecodeError::VarintOverflow(1)));
    }

    #[test]
    fn test_truncated_tx_names_position() {
        let data = single();
        let err = decode_block_message(&data[..data.len() - 2]).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse tx(1/1)"));
        assert!(err.is_truncated());
    }

    #[test]
    fn test_decode_maybe_tx_dispatch() {
        let tree = TxTree::new(Cid::tx(Default::default()), Cid::tx(Default::default()));
        match decode_maybe_tx(&tree.to_compact()).unwrap() {
            DashNode::TxTree(decoded) => assert_eq!(decoded, tree),
            other => panic!("expected a tree node, got {:?}", other),
        }

        let tx_bytes = &single()[HEADER_SIZE + 1..];
        let node = decode_maybe_tx(tx_bytes).unwrap();
        assert_eq!(node.raw_data(), tx_bytes);
        assert!(node.as_tx().is_some());

        assert!(matches!(
            decode_tx_tree(&[0u8; 65]),
            Err(DecodeError::InvalidCompactTree(65))
        ));
    }
}
