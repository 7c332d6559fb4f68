//! DIP2 special transaction payloads
//!
//! A transaction whose version field carries a non-zero type in its upper
//! 16 bits (and a short version of at least 3) has an extra payload
//! between its outputs and its lock time. The payload layout depends on
//! the type. See <https://github.com/dashpay/dips/blob/master/dip-0002-special-transactions.md>

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crypto::Hash;
use crate::encoding::{write_var_slice, Reader};
use crate::error::{DecodeError, Result, ResultExt};

/// Registered special transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum SpecialTxType {
    /// Reserved to tell classic transactions apart
    Classic = 0,
    ProRegTx = 1,
    ProUpServTx = 2,
    ProUpRegTx = 3,
    ProUpRevTx = 4,
    CoinbaseTx = 5,
}

impl TryFrom<u16> for SpecialTxType {
    type Error = DecodeError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(SpecialTxType::Classic),
            1 => Ok(SpecialTxType::ProRegTx),
            2 => Ok(SpecialTxType::ProUpServTx),
            3 => Ok(SpecialTxType::ProUpRegTx),
            4 => Ok(SpecialTxType::ProUpRevTx),
            5 => Ok(SpecialTxType::CoinbaseTx),
            other => Err(DecodeError::UnknownSpecialTxType(other)),
        }
    }
}

/// Masternode registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProRegTx {
    /// Fixed-size registration fields, kept as read
    ///
    /// Size\[bytes\]: 90
    pub data: Vec<u8>,
    pub script_payout: Vec<u8>,
    pub inputs_hash: Hash,
    pub payload_sig: Vec<u8>,
}

impl ProRegTx {
    pub const DATA_SIZE: usize = 90;
}

/// Masternode service update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProUpServTx {
    pub version: u16,
    pub pro_tx_hash: Hash,
    /// IPv6 (or IPv4-mapped) address
    pub ip_address: [u8; 16],
    /// Network byte order on the wire
    pub port: u16,
    pub script_payout: Vec<u8>,
    pub inputs_hash: Hash,
    pub payload_sig: Vec<u8>,
}

/// Masternode registrar update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProUpRegTx {
    pub version: u16,
    pub pro_tx_hash: Hash,
    pub mode: u16,
    pub operator_key_id: [u8; 20],
    pub voter_key_id: [u8; 20],
    pub script_payout: Vec<u8>,
    pub payload_sig: Vec<u8>,
}

/// Masternode operator revocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProUpRevTx {
    pub version: u16,
    pub pro_tx_hash: Hash,
    pub reason: u16,
    pub inputs_hash: Hash,
    pub payload_sig: Vec<u8>,
}

/// Coinbase payload committing to the masternode list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CbTx {
    pub version: u16,
    pub height: u32,
    pub merkle_root_mn_list: Hash,
}

impl CbTx {
    /// Encoded length
    pub const SIZE: usize = 2 + 4 + 32;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialPayload {
    ProRegTx(ProRegTx),
    ProUpServTx(ProUpServTx),
    ProUpRegTx(ProUpRegTx),
    ProUpRevTx(ProUpRevTx),
    CoinbaseTx(CbTx),
}

fn read_hash(r: &mut Reader<'_>) -> Result<Hash> {
    Ok(Hash(r.read_array()?))
}

fn read_var_vec(r: &mut Reader<'_>) -> Result<Vec<u8>> {
    Ok(r.read_var_slice()?.to_vec())
}

impl SpecialPayload {
    /// Read the payload layout selected by `tx_type`
    pub fn decode(r: &mut Reader<'_>, tx_type: u16) -> Result<Self> {
        let tx_type = SpecialTxType::try_from(tx_type)?;
        debug!(?tx_type, "decoding special payload");

        let payload = match tx_type {
            SpecialTxType::Classic => return Err(DecodeError::UnknownSpecialTxType(0)),
            SpecialTxType::ProRegTx => SpecialPayload::ProRegTx(ProRegTx {
                data: r.read_fixed(ProRegTx::DATA_SIZE).context("data")?.to_vec(),
                script_payout: read_var_vec(r).context("script_payout")?,
                inputs_hash: read_hash(r).context("inputs_hash")?,
                payload_sig: read_var_vec(r).context("payload_sig")?,
            }),
            SpecialTxType::ProUpServTx => SpecialPayload::ProUpServTx(ProUpServTx {
                version: r.read_u16().context("version")?,
                pro_tx_hash: read_hash(r).context("pro_tx_hash")?,
                ip_address: r.read_array().context("ip_address")?,
                port: u16::from_be_bytes(r.read_array().context("port")?),
                script_payout: read_var_vec(r).context("script_payout")?,
                inputs_hash: read_hash(r).context("inputs_hash")?,
                payload_sig: read_var_vec(r).context("payload_sig")?,
            }),
            SpecialTxType::ProUpRegTx => SpecialPayload::ProUpRegTx(ProUpRegTx {
                version: r.read_u16().context("version")?,
                pro_tx_hash: read_hash(r).context("pro_tx_hash")?,
                mode: r.read_u16().context("mode")?,
                operator_key_id: r.read_array().context("operator_key_id")?,
                voter_key_id: r.read_array().context("voter_key_id")?,
                script_payout: read_var_vec(r).context("script_payout")?,
                payload_sig: read_var_vec(r).context("payload_sig")?,
            }),
            SpecialTxType::ProUpRevTx => SpecialPayload::ProUpRevTx(ProUpRevTx {
                version: r.read_u16().context("version")?,
                pro_tx_hash: read_hash(r).context("pro_tx_hash")?,
                reason: r.read_u16().context("reason")?,
                inputs_hash: read_hash(r).context("inputs_hash")?,
                payload_sig: read_var_vec(r).context("payload_sig")?,
            }),
            SpecialTxType::CoinbaseTx => SpecialPayload::CoinbaseTx(CbTx {
                version: r.read_u16().context("version")?,
                height: r.read_u32().context("height")?,
                merkle_root_mn_list: read_hash(r).context("merkle_root_mn_list")?,
            }),
        };

        Ok(payload)
    }

    pub fn tx_type(&self) -> SpecialTxType {
        match self {
            SpecialPayload::ProRegTx(_) => SpecialTxType::ProRegTx,
            SpecialPayload::ProUpServTx(_) => SpecialTxType::ProUpServTx,
            SpecialPayload::ProUpRegTx(_) => SpecialTxType::ProUpRegTx,
            SpecialPayload::ProUpRevTx(_) => SpecialTxType::ProUpRevTx,
            SpecialPayload::CoinbaseTx(_) => SpecialTxType::CoinbaseTx,
        }
    }

    /// Append the exact wire form, length prefixes included
    pub fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            SpecialPayload::ProRegTx(p) => {
                buf.extend_from_slice(&p.data);
                write_var_slice(buf, &p.script_payout);
                buf.extend_from_slice(&p.inputs_hash.0);
                write_var_slice(buf, &p.payload_sig);
            }
            SpecialPayload::ProUpServTx(p) => {
                buf.extend_from_slice(&p.version.to_le_bytes());
                buf.extend_from_slice(&p.pro_tx_hash.0);
                buf.extend_from_slice(&p.ip_address);
                buf.extend_from_slice(&p.port.to_be_bytes());
                write_var_slice(buf, &p.script_payout);
                buf.extend_from_slice(&p.inputs_hash.0);
                write_var_slice(buf, &p.payload_sig);
            }
            SpecialPayload::ProUpRegTx(p) => {
                buf.extend_from_slice(&p.version.to_le_bytes());
                buf.extend_from_slice(&p.pro_tx_hash.0);
                buf.extend_from_slice(&p.mode.to_le_bytes());
                buf.extend_from_slice(&p.operator_key_id);
                buf.extend_from_slice(&p.voter_key_id);
                write_var_slice(buf, &p.script_payout);
                write_var_slice(buf, &p.payload_sig);
            }
            SpecialPayload::ProUpRevTx(p) => {
                buf.extend_from_slice(&p.version.to_le_bytes());
                buf.extend_from_slice(&p.pro_tx_hash.0);
                buf.extend_from_slice(&p.reason.to_le_bytes());
                buf.extend_from_slice(&p.inputs_hash.0);
                write_var_slice(buf, &p.payload_sig);
            }
            SpecialPayload::CoinbaseTx(p) => {
                buf.extend_from_slice(&p.version.to_le_bytes());
                buf.extend_from_slice(&p.height.to_le_bytes());
                buf.extend_from_slice(&p.merkle_root_mn_list.0);
            }
        }
    }

    /// Field contents concatenated in order, without length prefixes
    pub fn to_opaque_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            SpecialPayload::ProRegTx(p) => {
                buf.extend_from_slice(&p.data);
                buf.extend_from_slice(&p.script_payout);
                buf.extend_from_slice(&p.inputs_hash.0);
                buf.extend_from_slice(&p.payload_sig);
            }
            SpecialPayload::ProUpServTx(p) => {
                buf.extend_from_slice(&p.version.to_le_bytes());
                buf.extend_from_slice(&p.pro_tx_hash.0);
                buf.extend_from_slice(&p.ip_address);
                buf.extend_from_slice(&p.port.to_be_bytes());
                buf.extend_from_slice(&p.script_payout);
                buf.extend_from_slice(&p.inputs_hash.0);
                buf.extend_from_slice(&p.payload_sig);
            }
            SpecialPayload::ProUpRegTx(p) => {
                buf.extend_from_slice(&p.version.to_le_bytes());
                buf.extend_from_slice(&p.pro_tx_hash.0);
                buf.extend_from_slice(&p.mode.to_le_bytes());
                buf.extend_from_slice(&p.operator_key_id);
                buf.extend_from_slice(&p.voter_key_id);
                buf.extend_from_slice(&p.script_payout);
                buf.extend_from_slice(&p.payload_sig);
            }
            SpecialPayload::ProUpRevTx(p) => {
                buf.extend_from_slice(&p.version.to_le_bytes());
                buf.extend_from_slice(&p.pro_tx_hash.0);
                buf.extend_from_slice(&p.reason.to_le_bytes());
                buf.extend_from_slice(&p.inputs_hash.0);
                buf.extend_from_slice(&p.payload_sig);
            }
            // no variable-length fields, opaque and wire forms agree
            SpecialPayload::CoinbaseTx(_) => self.encode(&mut buf),
        }
        buf
    }
}
