//! Decoder configuration

use serde::{Deserialize, Serialize};

/// Knobs for a [`crate::Decoder`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Check that the assembled merkle root equals the one in the header
    pub verify_merkle_root: bool,
    /// Reject messages announcing more transactions than this
    pub max_tx_count: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            verify_merkle_root: true,
            max_tx_count: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_verify_root() {
        let config = DecoderConfig::default();
        assert!(config.verify_merkle_root);
        assert_eq!(config.max_tx_count, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DecoderConfig = serde_json::from_str(r#"{"max_tx_count": 10}"#).unwrap();
        assert!(config.verify_merkle_root);
        assert_eq!(config.max_tx_count, Some(10));
    }
}
