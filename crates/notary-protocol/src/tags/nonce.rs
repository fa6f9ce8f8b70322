use std::fmt::Debug;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::tags::fixed_tag::FixedTag;
use crate::util::as_hex;
use crate::wire::{FromWire, ToWire};

const SIZE: usize = 64;

/// The 64-byte NONC value of a request. In a notarization chain the nonce commits to the
/// artifact (first link) or to the previous link's raw response.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Nonce(FixedTag<SIZE>);

impl Nonce {
    pub const SIZE: usize = SIZE;
}

impl Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NONC({})", as_hex(self.0.as_slice()))
    }
}

impl ToWire for Nonce {
    fn wire_size(&self) -> usize {
        SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        self.0.to_wire(cursor)
    }
}

impl FromWire for Nonce {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        Ok(Nonce(cursor.try_get_fixed()?.into()))
    }
}

impl From<[u8; SIZE]> for Nonce {
    fn from(bytes: [u8; SIZE]) -> Self {
        Nonce(bytes.into())
    }
}

impl TryFrom<&[u8]> for Nonce {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Nonce(FixedTag::from_slice(bytes)?))
    }
}

impl From<Nonce> for [u8; SIZE] {
    fn from(nonce: Nonce) -> Self {
        *nonce.0.as_bytes()
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}
