//! Cryptography module - double-SHA256, content identifiers, merkle trees

mod cid;
mod hash;
mod merkle;

pub use cid::*;
pub use hash::*;
pub use merkle::*;
