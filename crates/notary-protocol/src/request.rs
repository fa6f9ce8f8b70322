use std::fmt::Debug;

use Error::{BadRequestSize, UnexpectedOffsets};

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::header::{Header, Header2};
use crate::tag::Tag;
use crate::tags::Nonce;
use crate::util::as_hex;
use crate::wire::{FromWire, ToWire};

/// Requests are padded to exactly this many bytes so a response is never larger than the
/// request that provoked it.
pub const REQUEST_SIZE: usize = 1024;

const PADDING_SIZE: usize = REQUEST_SIZE - Header2::SIZE - Nonce::SIZE;

/// A request carrying NONC and the `PAD\xff` filler, sent unframed.
#[derive(Clone, Eq, PartialEq)]
pub struct Request {
    header: Header2,
    nonce: Nonce,
}

impl Request {
    const OFFSETS: [u32; 1] = [Nonce::SIZE as u32];
    const TAGS: [Tag; 2] = [Tag::NONC, Tag::PAD];

    pub fn new(nonce: &Nonce) -> Self {
        Self {
            header: Header2::new(Self::OFFSETS, Self::TAGS),
            nonce: *nonce,
        }
    }

    pub fn nonc(&self) -> &Nonce {
        &self.nonce
    }
}

impl FromWire for Request {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        if cursor.remaining() != REQUEST_SIZE {
            return Err(BadRequestSize(cursor.remaining()));
        }

        let header = Header2::from_wire(cursor)?;
        header.expect_tags(&Self::TAGS)?;

        if header.offsets() != Self::OFFSETS {
            return Err(UnexpectedOffsets);
        }

        let nonce = Nonce::from_wire(cursor)?;
        cursor.try_take(PADDING_SIZE)?;

        Ok(Request { header, nonce })
    }
}

impl ToWire for Request {
    fn wire_size(&self) -> usize {
        REQUEST_SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        self.header.to_wire(cursor)?;
        self.nonce.to_wire(cursor)?;
        cursor.try_put_zeros(PADDING_SIZE)
    }
}

impl Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Request {{ nonce: {} }}", as_hex(self.nonce.as_ref()))
    }
}
