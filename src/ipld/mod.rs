//! IPLD node contract - identifiers, links and path resolution

mod node;

pub use node::*;
