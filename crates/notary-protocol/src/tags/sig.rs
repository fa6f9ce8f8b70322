use std::fmt::Debug;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::tags::fixed_tag::FixedTag;
use crate::util::as_hex;
use crate::wire::{FromWire, ToWire};

/// A SIG value is a 64-byte Ed25519 signature.
const SIZE: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Signature(FixedTag<SIZE>);

impl FromWire for Signature {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        Ok(Self(cursor.try_get_fixed()?.into()))
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SIG({})", as_hex(self.0.as_slice()))
    }
}

impl ToWire for Signature {
    fn wire_size(&self) -> usize {
        SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        self.0.to_wire(cursor)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<[u8; SIZE]> for Signature {
    fn from(signature: [u8; SIZE]) -> Self {
        Self(signature.into())
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(FixedTag::from_slice(bytes)?))
    }
}
