use std::fmt::Debug;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::error::Error::UnexpectedOffsets;
use crate::header::{Header, Header2};
use crate::tag::Tag;
use crate::tags::{Delegation, Signature};
use crate::wire::{FromWire, ToWire};

/// CERT: a delegation plus the long-term key's signature over it.
#[derive(PartialEq, Eq, Clone)]
pub struct Certificate {
    header: Header2,
    signature: Signature,
    delegation: Delegation,
}

impl Certificate {
    /// Prefix prepended to the DELE bytes before the long-term key signs them.
    pub const CONTEXT: &'static [u8] = b"RoughTime v1 delegation signature--\x00";

    pub const SIZE: usize = Header2::SIZE + 64 + Delegation::SIZE;

    const DELE_OFFSET: u32 = 64;
    const OFFSETS: [u32; 1] = [Self::DELE_OFFSET];
    const TAGS: [Tag; 2] = [Tag::SIG, Tag::DELE];

    pub fn new(sig: Signature, dele: Delegation) -> Self {
        Self {
            header: Header2::new(Self::OFFSETS, Self::TAGS),
            signature: sig,
            delegation: dele,
        }
    }

    pub fn sig(&self) -> &Signature {
        &self.signature
    }

    pub fn dele(&self) -> &Delegation {
        &self.delegation
    }

    /// The exact byte string covered by the CERT signature.
    pub fn signed_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut msg = Vec::with_capacity(Self::CONTEXT.len() + Delegation::SIZE);
        msg.extend_from_slice(Self::CONTEXT);
        msg.extend_from_slice(&self.delegation.as_bytes()?);
        Ok(msg)
    }
}

impl Default for Certificate {
    fn default() -> Self {
        Self::new(Signature::default(), Delegation::default())
    }
}

impl FromWire for Certificate {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        let header = Header2::from_wire(cursor)?;
        header.expect_tags(&Self::TAGS)?;

        if header.offsets() != Self::OFFSETS {
            return Err(UnexpectedOffsets);
        }

        Ok(Certificate {
            header,
            signature: Signature::from_wire(cursor)?,
            delegation: Delegation::from_wire(cursor)?,
        })
    }
}

impl ToWire for Certificate {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        self.header.to_wire(cursor)?;
        self.signature.to_wire(cursor)?;
        self.delegation.to_wire(cursor)
    }
}

impl Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CERT")
            .field("signature", &self.signature)
            .field("delegation", &self.delegation)
            .finish()
    }
}
