//! Transaction decoding
//!
//! Layout of a transaction on the wire:
//!
//! Bytes  | Name         | Data Type        | Description
//! -------|--------------|------------------|------------
//! 4      | version      | uint32_t         | Short version (low 16 bits) and type (high 16 bits)
//! Varies | tx_in count  | compactSize uint | Number of inputs in this tx
//! Varies | tx_in        | txIn             | Transaction inputs
//! Varies | tx_out count | compactSize uint | Number of outputs in this tx
//! Varies | tx_out       | txOut            | Transaction outputs
//! Varies | payload      | special payload  | Only if version >= 3 and type != 0
//! 4      | lock_time    | uint32_t         | A time (Unix epoch time) or block number

use serde_json::{json, Value};

use super::SpecialPayload;
use crate::constants::SPECIAL_TX_MIN_VERSION;
use crate::crypto::{double_sha256, Cid, Hash};
use crate::encoding::{write_var_slice, write_varint, Reader};
use crate::error::{DecodeError, Result, ResultExt};
use crate::ipld::{no_such_path, remaining, value_at, Link, Node, Resolved};

/// A transaction input referencing a previous output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    /// Transaction holding the spent output
    pub prev_tx: Cid,
    /// Index of the output in that transaction
    pub prev_tx_index: u32,
    /// Unlocking script, not interpreted
    pub script: Vec<u8>,
    pub seq_no: u32,
}

impl TxIn {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let prev_tx = Cid::tx(Hash(r.read_array().context("prev_tx_hash")?));
        let prev_tx_index = r.read_u32().context("prev_tx_index")?;
        let script = r.read_var_slice().context("script")?.to_vec();
        let seq_no = r.read_u32().context("seqno")?;

        Ok(Self {
            prev_tx,
            prev_tx_index,
            script,
            seq_no,
        })
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.prev_tx.digest().as_bytes());
        buf.extend_from_slice(&self.prev_tx_index.to_le_bytes());
        write_var_slice(buf, &self.script);
        buf.extend_from_slice(&self.seq_no.to_le_bytes());
    }

    fn to_json(&self) -> Value {
        json!({
            "prevTx": self.prev_tx.to_string(),
            "index": self.prev_tx_index,
            "script": hex::encode(&self.script),
            "seqNo": self.seq_no,
        })
    }
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in duffs
    pub value: u64,
    /// Locking script, not interpreted
    pub script: Vec<u8>,
}

impl TxOut {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let value = r.read_u64().context("value")?;
        let script = r.read_var_slice().context("script")?.to_vec();
        Ok(Self { value, script })
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.value.to_le_bytes());
        write_var_slice(buf, &self.script);
    }

    fn to_json(&self) -> Value {
        json!({
            "value": self.value,
            "script": hex::encode(&self.script),
        })
    }
}

/// A decoded transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    /// Low 16 bits of the version field
    pub version: u16,
    /// High 16 bits of the version field, 0 for classic transactions
    pub tx_type: u16,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    pub payload: Option<SpecialPayload>,
}

/// Read a count-prefixed list, labelling failures with their position
fn decode_list<T>(
    r: &mut Reader<'_>,
    count_field: &str,
    item: &str,
    decode: impl Fn(&mut Reader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = r.read_varint().context(count_field)?;
    // a count can claim far more elements than the input holds
    let mut out = Vec::with_capacity(count.min(r.remaining()));
    for i in 0..count {
        out.push(decode(r).element_context(item, i, count)?);
    }
    Ok(out)
}

impl Tx {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let raw_version = r.read_u32().context("version")?;
        let version = (raw_version & 0xffff) as u16;
        let tx_type = (raw_version >> 16) as u16;

        let inputs = decode_list(r, "in_count", "tx_in", TxIn::decode)?;
        let outputs = decode_list(r, "out_count", "tx_out", TxOut::decode)?;

        let payload = if version >= SPECIAL_TX_MIN_VERSION && tx_type != 0 {
            Some(SpecialPayload::decode(r, tx_type).context("payload")?)
        } else {
            None
        };

        let lock_time = r.read_u32().context("lock_time")?;

        Ok(Self {
            version,
            tx_type,
            inputs,
            outputs,
            lock_time,
            payload,
        })
    }

    /// The full 32-bit version field as found on the wire
    pub fn raw_version(&self) -> u32 {
        ((self.tx_type as u32) << 16) | self.version as u32
    }

    /// Append the wire serialization
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.raw_version().to_le_bytes());
        write_varint(buf, self.inputs.len() as u64);
        for input in &self.inputs {
            input.encode(buf);
        }
        write_varint(buf, self.outputs.len() as u64);
        for output in &self.outputs {
            output.encode(buf);
        }
        if let Some(payload) = &self.payload {
            payload.encode(buf);
        }
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }

    /// Transaction identifier: double-SHA256 over the serialized bytes
    pub fn cid(&self) -> Cid {
        Cid::tx(double_sha256(&self.to_bytes()))
    }

    /// The special payload as one opaque buffer
    pub fn payload_bytes(&self) -> Option<Vec<u8>> {
        self.payload.as_ref().map(SpecialPayload::to_opaque_bytes)
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].prev_tx.digest() == &Hash::zero()
            && self.inputs[0].prev_tx_index == u32::MAX
    }
}

fn parse_index(segment: Option<&&str>, len: usize, path: &[&str]) -> Result<usize> {
    segment
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|i| *i < len)
        .ok_or_else(|| no_such_path(path))
}

impl Node for Tx {
    fn cid(&self) -> Cid {
        Tx::cid(self)
    }

    fn raw_data(&self) -> Vec<u8> {
        self.to_bytes()
    }

    fn links(&self) -> Vec<Link> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(i, input)| Link::new(i.to_string(), input.prev_tx))
            .collect()
    }

    fn paths(&self) -> Vec<String> {
        let mut out = vec![
            "version".to_string(),
            "type".to_string(),
            "lockTime".to_string(),
        ];
        if self.payload.is_some() {
            out.push("payload".to_string());
        }
        for i in 0..self.inputs.len() {
            out.push(i.to_string());
            for field in ["prevTx", "index", "script", "seqNo"] {
                out.push(format!("inputs/{}/{}", i, field));
            }
        }
        for i in 0..self.outputs.len() {
            for field in ["value", "script"] {
                out.push(format!("outputs/{}/{}", i, field));
            }
        }
        out
    }

    fn resolve(&self, path: &[&str]) -> Result<(Resolved, Vec<String>)> {
        match path.first().copied() {
            Some("version") => value_at(path, 1, json!(self.version)),
            Some("type") => value_at(path, 1, json!(self.tx_type)),
            Some("lockTime") => value_at(path, 1, json!(self.lock_time)),
            Some("payload") => match self.payload_bytes() {
                Some(bytes) => value_at(path, 1, json!(hex::encode(bytes))),
                None => Err(no_such_path(path)),
            },
            Some("inputs") => {
                let input = &self.inputs[parse_index(path.get(1), self.inputs.len(), path)?];
                match path.get(2).copied() {
                    None => value_at(path, 2, input.to_json()),
                    Some("prevTx") => Ok((Resolved::Link(input.prev_tx), remaining(path, 3))),
                    Some("index") => value_at(path, 3, json!(input.prev_tx_index)),
                    Some("script") => value_at(path, 3, json!(hex::encode(&input.script))),
                    Some("seqNo") => value_at(path, 3, json!(input.seq_no)),
                    Some(_) => Err(no_such_path(path)),
                }
            }
            Some("outputs") => {
                let output = &self.outputs[parse_index(path.get(1), self.outputs.len(), path)?];
                match path.get(2).copied() {
                    None => value_at(path, 2, output.to_json()),
                    Some("value") => value_at(path, 3, json!(output.value)),
                    Some("script") => value_at(path, 3, json!(hex::encode(&output.script))),
                    Some(_) => Err(no_such_path(path)),
                }
            }
            Some(_) => {
                let i = parse_index(path.first(), self.inputs.len(), path)?;
                Ok((Resolved::Link(self.inputs[i].prev_tx), remaining(path, 1)))
            }
            None => Err(DecodeError::Resolve("empty path".to_string())),
        }
    }
}
