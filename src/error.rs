//! Decoding errors
//!
//! Every failure aborts the decode of the whole message. Sub-reads are
//! wrapped with the name of the field being read so that a failure deep
//! inside a transaction reads like
//! `failed to parse tx(2/3): failed to parse tx_in(1/1): script: ...`.

use thiserror::Error;

use crate::crypto::Cid;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    #[error("varint overflow: {0}")]
    VarintOverflow(u64),

    #[error("unknown special transaction type: {0}")]
    UnknownSpecialTxType(u16),

    #[error("invalid tx tree data: expected 64 bytes, got {0}")]
    InvalidCompactTree(usize),

    #[error("header truncated: {0}")]
    HeaderTruncated(#[source] Box<DecodeError>),

    /// The re-serialized header differs from the bytes it was read from.
    /// This means the decoder itself is broken, not the input.
    #[error("header replay mismatch: re-serialized header differs from input")]
    HeaderReplayMismatch,

    #[error("merkle root mismatch: header commits to {expected}, transactions give {actual}")]
    MerkleRootMismatch { expected: Cid, actual: Cid },

    #[error("failed to resolve path: {0}")]
    Resolve(String),

    #[error("failed to parse {field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Wrap this error with the name of the field that was being read
    pub fn field(self, field: impl Into<String>) -> Self {
        DecodeError::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all field and header wrappers removed
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            DecodeError::Field { source, .. } | DecodeError::HeaderTruncated(source) => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Whether this error signals a broken decoder rather than bad input
    pub fn is_fatal(&self) -> bool {
        matches!(self.root_cause(), DecodeError::HeaderReplayMismatch)
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self.root_cause(), DecodeError::TruncatedInput { .. })
    }
}

/// Attach field context to a decode result
pub trait ResultExt<T> {
    fn context(self, field: impl Into<String>) -> Result<T>;

    /// Context for the `n`-th (0-based) of `total` repeated elements
    fn element_context(self, name: &str, n: usize, total: usize) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, field: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.field(field))
    }

    fn element_context(self, name: &str, n: usize, total: usize) -> Result<T> {
        self.map_err(|e| e.field(format!("{}({}/{})", name, n + 1, total)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truncated() -> DecodeError {
        DecodeError::TruncatedInput {
            needed: 4,
            available: 1,
        }
    }

    #[test]
    fn test_element_context_message() {
        let err: Result<()> = Err(truncated());
        let err = err.context("script").element_context("tx_in", 1, 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to parse tx_in(2/5): failed to parse script: truncated input: needed 4 bytes, 1 available"
        );
    }

    #[test]
    fn test_root_cause_unwraps_all_layers() {
        let err = DecodeError::HeaderTruncated(Box::new(truncated().field("nonce")));
        assert!(err.is_truncated());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_replay_mismatch_is_fatal() {
        assert!(DecodeError::HeaderReplayMismatch.field("header").is_fatal());
    }
}
