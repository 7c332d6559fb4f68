//! Block module - header, transactions, special payloads and tree nodes

mod header;
mod message;
mod special;
mod transaction;
mod tree;

pub use header::*;
pub use message::*;
pub use special::*;
pub use transaction::*;
pub use tree::*;
