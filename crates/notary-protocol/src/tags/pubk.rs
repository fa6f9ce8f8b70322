use std::fmt::Debug;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::tags::fixed_tag::FixedTag;
use crate::util::as_hex;
use crate::wire::{FromWire, ToWire};

/// PUBK holds a 32-byte Ed25519 public key.
const SIZE: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PublicKey(FixedTag<SIZE>);

impl PublicKey {
    pub const SIZE: usize = SIZE;
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PUBK({})", as_hex(self.0.as_slice()))
    }
}

impl ToWire for PublicKey {
    fn wire_size(&self) -> usize {
        SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        self.0.to_wire(cursor)
    }
}

impl FromWire for PublicKey {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        Ok(PublicKey(cursor.try_get_fixed()?.into()))
    }
}

impl From<[u8; SIZE]> for PublicKey {
    fn from(bytes: [u8; SIZE]) -> Self {
        PublicKey(bytes.into())
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(PublicKey(FixedTag::from_slice(bytes)?))
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}
