//! The node abstraction shared by blocks, transactions and tree nodes

use serde_json::Value;

use crate::block::{Block, Tx, TxTree};
use crate::crypto::Cid;
use crate::error::{DecodeError, Result};

/// Named outgoing link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub cid: Cid,
}

impl Link {
    pub fn new(name: impl Into<String>, cid: Cid) -> Self {
        Self {
            name: name.into(),
            cid,
        }
    }
}

/// What a path resolves to inside a single node
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A link to another node; resolution continues there
    Link(Cid),
    /// A plain field value
    Value(Value),
}

pub trait Node {
    /// Content identifier of this node
    fn cid(&self) -> Cid;

    /// Canonical serialized bytes
    fn raw_data(&self) -> Vec<u8>;

    /// Outgoing links, in a stable order
    fn links(&self) -> Vec<Link>;

    /// Every path [`Node::resolve`] accepts
    fn paths(&self) -> Vec<String>;

    /// Walk `path` as far as this node allows
    ///
    /// Returns the value found and the part of the path left to follow
    /// in the linked node (empty unless a link was hit).
    fn resolve(&self, path: &[&str]) -> Result<(Resolved, Vec<String>)>;

    /// Like [`Node::resolve`], but the path has to end at a link
    fn resolve_link(&self, path: &[&str]) -> Result<(Cid, Vec<String>)> {
        match self.resolve(path)? {
            (Resolved::Link(cid), rest) => Ok((cid, rest)),
            (Resolved::Value(_), _) => Err(DecodeError::Resolve(format!(
                "{} is not a link",
                path.join("/")
            ))),
        }
    }

    /// Paths below `path`, at most `depth` segments deep
    fn tree(&self, path: &str, depth: Option<usize>) -> Vec<String> {
        let prefix = path.trim_matches('/');
        self.paths()
            .into_iter()
            .filter_map(|p| {
                let rest = if prefix.is_empty() {
                    p.as_str()
                } else {
                    p.strip_prefix(prefix)?.strip_prefix('/')?
                };
                match depth {
                    Some(d) if rest.split('/').count() > d => None,
                    _ => Some(rest.to_string()),
                }
            })
            .collect()
    }

    fn size(&self) -> usize {
        self.raw_data().len()
    }
}

/// The rest of a path after its first `consumed` segments
pub(crate) fn remaining(path: &[&str], consumed: usize) -> Vec<String> {
    path.iter().skip(consumed).map(|s| s.to_string()).collect()
}

/// Resolve to a plain value; nothing may follow it
pub(crate) fn value_at(path: &[&str], consumed: usize, value: Value) -> Result<(Resolved, Vec<String>)> {
    if path.len() > consumed {
        return Err(DecodeError::Resolve(format!(
            "cannot resolve {} through a value",
            path.join("/")
        )));
    }
    Ok((Resolved::Value(value), Vec::new()))
}

pub(crate) fn no_such_path(path: &[&str]) -> DecodeError {
    DecodeError::Resolve(format!("no such link: {}", path.join("/")))
}

/// Any node produced by the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashNode {
    Block(Block),
    Tx(Tx),
    TxTree(TxTree),
}

impl DashNode {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            DashNode::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tx(&self) -> Option<&Tx> {
        match self {
            DashNode::Tx(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn as_tx_tree(&self) -> Option<&TxTree> {
        match self {
            DashNode::TxTree(t) => Some(t),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Node {
        match self {
            DashNode::Block(b) => b,
            DashNode::Tx(tx) => tx,
            DashNode::TxTree(t) => t,
        }
    }
}

impl Node for DashNode {
    fn cid(&self) -> Cid {
        self.inner().cid()
    }

    fn raw_data(&self) -> Vec<u8> {
        self.inner().raw_data()
    }

    fn links(&self) -> Vec<Link> {
        self.inner().links()
    }

    fn paths(&self) -> Vec<String> {
        self.inner().paths()
    }

    fn resolve(&self, path: &[&str]) -> Result<(Resolved, Vec<String>)> {
        self.inner().resolve(path)
    }
}

impl From<Block> for DashNode {
    fn from(b: Block) -> Self {
        DashNode::Block(b)
    }
}

impl From<Tx> for DashNode {
    fn from(tx: Tx) -> Self {
        DashNode::Tx(tx)
    }
}

impl From<TxTree> for DashNode {
    fn from(t: TxTree) -> Self {
        DashNode::TxTree(t)
    }
}
