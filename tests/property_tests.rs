//! Property-based and adversarial tests for the decoder
//!
//! These tests check that decoding is lossless and that malformed input
//! fails with an error instead of a panic or a runaway allocation.

use proptest::prelude::*;
use dash_ipld::crypto::{build_merkle_tree, merkle_root, Hash, MerkleProof};
use dash_ipld::encoding::{write_varint, Reader};
use dash_ipld::{decode_block, decode_block_message, decode_tx, Cid, DecodeError, Node, Tx, TxIn, TxOut};

fn leaves(n: usize) -> Vec<Cid> {
    (0..n)
        .map(|i| {
            let mut bytes = [0u8; 32];
            bytes[..8].copy_from_slice(&(i as u64).to_le_bytes());
            Cid::tx(Hash::from_bytes(bytes))
        })
        .collect()
}

fn expected_tree_nodes(mut len: usize) -> usize {
    let mut count = 0;
    while len > 1 {
        len = (len + 1) / 2;
        count += len;
    }
    count
}

fn tx_in() -> impl Strategy<Value = TxIn> {
    (
        any::<[u8; 32]>(),
        any::<u32>(),
        proptest::collection::vec(any::<u8>(), 0..300),
        any::<u32>(),
    )
        .prop_map(|(prev, prev_tx_index, script, seq_no)| TxIn {
            prev_tx: Cid::tx(Hash::from_bytes(prev)),
            prev_tx_index,
            script,
            seq_no,
        })
}

fn tx_out() -> impl Strategy<Value = TxOut> {
    (any::<u64>(), proptest::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(value, script)| TxOut { value, script })
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

proptest! {
    /// Any 80 header bytes decode and re-serialize unchanged
    #[test]
    fn prop_header_roundtrip(header in proptest::collection::vec(any::<u8>(), 80)) {
        let block = decode_block(&header).unwrap();
        let reencoded = block.header_bytes();
        prop_assert_eq!(&reencoded[..], &header[..]);
        prop_assert_eq!(block.raw_data(), header);
    }

    /// Classic transactions survive a decode/encode cycle
    #[test]
    fn prop_classic_tx_roundtrip(
        version in 1u16..3,
        inputs in proptest::collection::vec(tx_in(), 0..4),
        outputs in proptest::collection::vec(tx_out(), 0..4),
        lock_time in any::<u32>(),
    ) {
        let tx = Tx { version, tx_type: 0, inputs, outputs, lock_time, payload: None };
        let bytes = tx.to_bytes();
        let decoded = decode_tx(&bytes).unwrap();
        prop_assert_eq!(decoded.raw_data(), bytes);
        prop_assert_eq!(decoded, tx);
    }

    /// Writer and reader agree on every value the writer encodes canonically
    #[test]
    fn prop_varint_roundtrip(n in 0u64..=0x0FFF_FFFF) {
        let mut buf = Vec::new();
        write_varint(&mut buf, n);
        let mut r = Reader::new(&buf);
        prop_assert_eq!(r.read_varint().unwrap() as u64, n);
        prop_assert!(r.is_empty());
    }

    /// Large values keep the 0xFE prefix with an eight byte body
    #[test]
    fn prop_varint_wide_form(n in 0x1000_0000u64..) {
        let mut buf = Vec::new();
        write_varint(&mut buf, n);
        prop_assert_eq!(buf.len(), 9);
        prop_assert_eq!(buf[0], 0xFE);
        prop_assert_eq!(&buf[1..], &n.to_le_bytes()[..]);
    }

    /// Tree size follows the halving layers, and the last node is the root
    #[test]
    fn prop_merkle_node_count(n in 1usize..200) {
        let leaves = leaves(n);
        let tree = build_merkle_tree(&leaves);
        prop_assert_eq!(tree.len(), expected_tree_nodes(n));

        let root = merkle_root(&leaves).unwrap();
        match tree.last() {
            Some(top) => {
                prop_assert_eq!(top.cid(), root);
            }
            None => {
                prop_assert_eq!(root, leaves[0]);
            }
        }
    }

    /// Every leaf proves its membership in the root
    #[test]
    fn prop_merkle_proof_verifies(n in 1usize..100, pick in any::<prop::sample::Index>()) {
        let leaves = leaves(n);
        let index = pick.index(n);
        let root = merkle_root(&leaves).unwrap();
        let proof = MerkleProof::build(&leaves, index).unwrap();
        prop_assert!(proof.verify(&leaves[index], &root));
    }

    /// Arbitrary bytes never panic the decoder
    #[test]
    fn prop_garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_block_message(&data);
        let _ = decode_tx(&data);
    }
}

// ============================================================================
// ADVERSARIAL TESTS
// ============================================================================

/// Test: A count beyond the native size is rejected, not allocated
#[test]
fn test_oversized_input_count_rejected() {
    let mut data = vec![0x01, 0x00, 0x00, 0x00, 0xFF];
    data.extend_from_slice(&u64::MAX.to_le_bytes());

    let err = decode_tx(&data).unwrap_err();
    assert!(matches!(err.root_cause(), DecodeError::VarintOverflow(n) if *n == u64::MAX));
    assert!(err.to_string().starts_with("failed to parse in_count"));
}

/// Test: A huge but representable count runs out of input
#[test]
fn test_lying_count_runs_out_of_input() {
    let data = [0x01, 0x00, 0x00, 0x00, 0xFE, 0xFF, 0xFF, 0xFF, 0x0F];
    let err = decode_tx(&data).unwrap_err();
    assert!(err.is_truncated());
    assert!(err.to_string().starts_with("failed to parse tx_in(1/268435455)"));
}

/// Test: A special transaction with an unregistered type fails
#[test]
fn test_unknown_special_type_rejected() {
    // version 3, type 6, no inputs, no outputs
    let data = [0x03, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let err = decode_tx(&data).unwrap_err();
    assert!(matches!(err.root_cause(), DecodeError::UnknownSpecialTxType(6)));
    assert!(!err.is_fatal());
}

/// Test: Below version 3 the type bits do not enable a payload
#[test]
fn test_type_bits_ignored_before_version_three() {
    // version 2, type 6, no inputs, no outputs, lock time 7
    let data = [0x02, 0x00, 0x06, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00];
    let tx = decode_tx(&data).unwrap();
    assert_eq!(tx.tx_type, 6);
    assert!(tx.payload.is_none());
    assert_eq!(tx.lock_time, 7);
    assert_eq!(tx.raw_data(), data.to_vec());
}

/// Test: A block whose count claims more transactions than it carries
#[test]
fn test_block_with_missing_transactions() {
    let mut data = vec![0u8; 80];
    data.push(0x03);
    let err = decode_block_message(&data).unwrap_err();
    assert!(err.is_truncated());
    assert!(err.to_string().starts_with("failed to parse tx(1/3)"));
}
