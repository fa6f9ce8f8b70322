use std::fmt::Debug;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::tags::fixed_tag::FixedTag;
use crate::util::as_hex;
use crate::wire::{FromWire, ToWire};

/// ROOT is the full 64-byte SHA-512 Merkle tree root.
const SIZE: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct MerkleRoot(FixedTag<SIZE>);

impl Debug for MerkleRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ROOT({})", as_hex(self.0.as_slice()))
    }
}

impl ToWire for MerkleRoot {
    fn wire_size(&self) -> usize {
        SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        self.0.to_wire(cursor)
    }
}

impl FromWire for MerkleRoot {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        Ok(MerkleRoot(cursor.try_get_fixed()?.into()))
    }
}

impl From<[u8; SIZE]> for MerkleRoot {
    fn from(bytes: [u8; SIZE]) -> Self {
        MerkleRoot(bytes.into())
    }
}

impl AsRef<[u8; SIZE]> for MerkleRoot {
    fn as_ref(&self) -> &[u8; SIZE] {
        self.0.as_bytes()
    }
}
