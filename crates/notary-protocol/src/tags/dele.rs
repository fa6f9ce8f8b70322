use std::fmt::Debug;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::error::Error::UnexpectedOffsets;
use crate::header::{Header, Header3};
use crate::tag::Tag;
use crate::tags::PublicKey;
use crate::wire::{FromWire, ToWire};

/// DELE: the online key a server's long-term identity has authorized, and the window of
/// midpoints (microseconds since the Unix epoch, inclusive) during which it may sign.
#[derive(PartialEq, Eq, Clone)]
pub struct Delegation {
    header: Header3,
    public_key: PublicKey,
    min_time: u64,
    max_time: u64,
}

impl Delegation {
    pub const SIZE: usize = Header3::SIZE + PublicKey::SIZE + 8 + 8;

    const MINT_OFFSET: u32 = PublicKey::SIZE as u32;
    const MAXT_OFFSET: u32 = Self::MINT_OFFSET + size_of::<u64>() as u32;
    const OFFSETS: [u32; 2] = [Self::MINT_OFFSET, Self::MAXT_OFFSET];
    const TAGS: [Tag; 3] = [Tag::PUBK, Tag::MINT, Tag::MAXT];

    pub fn new(public_key: PublicKey, min_time: u64, max_time: u64) -> Self {
        Self {
            header: Header3::new(Self::OFFSETS, Self::TAGS),
            public_key,
            min_time,
            max_time,
        }
    }

    pub fn pubk(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn mint(&self) -> u64 {
        self.min_time
    }

    pub fn maxt(&self) -> u64 {
        self.max_time
    }
}

impl Default for Delegation {
    fn default() -> Self {
        Self::new(PublicKey::default(), 0, 0)
    }
}

impl FromWire for Delegation {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        let header = Header3::from_wire(cursor)?;
        header.expect_tags(&Self::TAGS)?;

        if header.offsets() != Self::OFFSETS {
            return Err(UnexpectedOffsets);
        }

        Ok(Delegation {
            header,
            public_key: PublicKey::from_wire(cursor)?,
            min_time: cursor.try_get_u64_le()?,
            max_time: cursor.try_get_u64_le()?,
        })
    }
}

impl ToWire for Delegation {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        self.header.to_wire(cursor)?;
        self.public_key.to_wire(cursor)?;
        cursor.try_put_u64_le(self.min_time)?;
        cursor.try_put_u64_le(self.max_time)
    }
}

impl Debug for Delegation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DELE")
            .field("public_key", &self.public_key)
            .field("min_time", &self.min_time)
            .field("max_time", &self.max_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_layout() {
        let dele = Delegation::new(PublicKey::from([0x11; 32]), 7, 9);
        let bytes = dele.as_bytes().unwrap();

        assert_eq!(bytes.len(), 72);
        assert_eq!(&bytes[0..4], &3u32.to_le_bytes());
        assert_eq!(&bytes[12..16], b"PUBK");
        assert_eq!(&bytes[24..56], &[0x11; 32]);
        assert_eq!(&bytes[56..64], &7u64.to_le_bytes());
        assert_eq!(&bytes[64..72], &9u64.to_le_bytes());

        assert_eq!(Delegation::from_bytes(&bytes).unwrap(), dele);
    }

    #[test]
    fn wrong_offsets_rejected() {
        let mut bytes = Delegation::default().as_bytes().unwrap();
        bytes[4..8].copy_from_slice(&36u32.to_le_bytes());

        match Delegation::from_bytes(&bytes) {
            Err(UnexpectedOffsets) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = Delegation::default().as_bytes().unwrap();
        bytes.extend_from_slice(&[0, 0, 0, 0]);

        match Delegation::from_bytes(&bytes) {
            Err(Error::TrailingBytes(4)) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
