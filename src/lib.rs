//! Dash block decoding for content-addressed storage
//!
//! Turns the wire bytes of a Dash block message into immutable IPLD
//! nodes: one block header node, one node per transaction, and the
//! intermediate merkle tree nodes linking the transactions up to the
//! merkle root committed in the header.

pub mod block;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod ipld;

pub use block::{
    decode_block, decode_block_message, decode_maybe_tx, decode_tx, decode_tx_tree, Block,
    Decoder, SpecialPayload, SpecialTxType, Tx, TxIn, TxOut, TxTree,
};
pub use config::DecoderConfig;
pub use crypto::{Cid, Codec, HashFunction};
pub use error::{DecodeError, Result};
pub use ipld::{DashNode, Link, Node, Resolved};

/// Wire format constants
pub mod constants {
    /// Serialized block header length
    pub const HEADER_SIZE: usize = 80;

    /// Length of a hash as carried on the wire
    pub const HASH_SIZE: usize = 32;

    /// Length of the compact tree-pair encoding (two child digests)
    pub const TX_TREE_SIZE: usize = 2 * HASH_SIZE;

    /// Transactions below this short version never carry a special payload
    pub const SPECIAL_TX_MIN_VERSION: u16 = 3;
}
