//! Wire primitives - little-endian integers, fixed byte runs and varints

mod reader;
mod varint;

pub use reader::*;
pub use varint::*;
