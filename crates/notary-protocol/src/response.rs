use std::fmt::Debug;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::error::Error::{BufferTooSmall, InvalidPathLength, PathTooLong, UnexpectedOffsets};
use crate::header::{Header, Header5};
use crate::tag::Tag;
use crate::tags::{Certificate, MerklePath, Signature, SignedResponse};
use crate::wire::{FromWire, FromWireN, ToWire};

/// A server's reply: SIG over SREP, the Merkle PATH for our nonce, the SREP itself, the
/// delegation CERT and the leaf INDX.
///
/// Parsing is strict. Offsets must describe exactly the fixed value sizes and no bytes may
/// follow INDX, so every byte of an accepted response is covered by a later check.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Response {
    header: Header5,
    signature: Signature,
    path: MerklePath,
    srep: SignedResponse,
    cert: Certificate,
    index: u32,
}

impl Response {
    /// Size of a response whose PATH is empty.
    pub const MINIMUM_SIZE: usize =
        Header5::SIZE + 64 + SignedResponse::SIZE + Certificate::SIZE + 4;

    const SIG_SIZE: u32 = 64;
    const TAGS: [Tag; 5] = [Tag::SIG, Tag::PATH, Tag::SREP, Tag::CERT, Tag::INDX];

    pub fn new(
        signature: Signature,
        path: MerklePath,
        srep: SignedResponse,
        cert: Certificate,
        index: u32,
    ) -> Self {
        let mut response = Self {
            header: Header5::default(),
            signature,
            path,
            srep,
            cert,
            index,
        };
        response.header.tags = Self::TAGS;
        response.header.offsets = Self::expected_offsets(response.path.wire_size() as u32);
        response
    }

    pub fn header(&self) -> &impl Header {
        &self.header
    }

    pub fn sig(&self) -> &Signature {
        &self.signature
    }

    pub fn path(&self) -> &MerklePath {
        &self.path
    }

    pub fn srep(&self) -> &SignedResponse {
        &self.srep
    }

    pub fn cert(&self) -> &Certificate {
        &self.cert
    }

    pub fn indx(&self) -> u32 {
        self.index
    }

    fn expected_offsets(path_len: u32) -> [u32; 4] {
        let path = Self::SIG_SIZE;
        let srep = path + path_len;
        let cert = srep + SignedResponse::SIZE as u32;
        let indx = cert + Certificate::SIZE as u32;
        [path, srep, cert, indx]
    }
}

impl FromWire for Response {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        if cursor.remaining() < Self::MINIMUM_SIZE {
            return Err(BufferTooSmall(Self::MINIMUM_SIZE, cursor.remaining()));
        }

        let header = Header5::from_wire(cursor)?;
        header.check_offset_bounds(cursor.remaining())?;
        header.expect_tags(&Self::TAGS)?;

        let offsets = header.offsets();
        let path_len = offsets[1].saturating_sub(offsets[0]);

        if !path_len.is_multiple_of(MerklePath::ELEMENT_SIZE as u32) {
            return Err(InvalidPathLength(path_len));
        }
        if path_len as usize > MerklePath::MAX_PATHS * MerklePath::ELEMENT_SIZE {
            return Err(PathTooLong(path_len as usize / MerklePath::ELEMENT_SIZE));
        }
        if offsets != Self::expected_offsets(path_len) {
            return Err(UnexpectedOffsets);
        }

        let signature = Signature::from_wire(cursor)?;
        let path = MerklePath::from_wire_n(cursor, path_len as usize)?;

        // SREP and CERT are parsed within their own bounds so neither can borrow bytes
        // from a neighbouring value.
        let srep = SignedResponse::from_bytes(cursor.try_take(SignedResponse::SIZE)?)?;
        let cert = Certificate::from_bytes(cursor.try_take(Certificate::SIZE)?)?;
        let index = cursor.try_get_u32_le()?;

        Ok(Response {
            header,
            signature,
            path,
            srep,
            cert,
            index,
        })
    }
}

impl ToWire for Response {
    fn wire_size(&self) -> usize {
        self.header.wire_size()
            + self.signature.wire_size()
            + self.path.wire_size()
            + self.srep.wire_size()
            + self.cert.wire_size()
            + size_of::<u32>()
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        if cursor.remaining() < self.wire_size() {
            return Err(BufferTooSmall(self.wire_size(), cursor.remaining()));
        }

        self.header.to_wire(cursor)?;
        self.signature.to_wire(cursor)?;
        self.path.to_wire(cursor)?;
        self.srep.to_wire(cursor)?;
        self.cert.to_wire(cursor)?;
        cursor.try_put_u32_le(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{Delegation, PublicKey};

    fn sample(depth: usize) -> Response {
        let mut path = MerklePath::default();
        for i in 0..depth {
            path.push_element(&[i as u8; 64]).unwrap();
        }
        let srep = SignedResponse::new(1_000_000, 1_700_000_000_000_000, [0x3c; 64].into());
        let dele = Delegation::new(PublicKey::from([0x44; 32]), 0, u64::MAX);
        let cert = Certificate::new([0x55; 64].into(), dele);

        Response::new([0x66; 64].into(), path, srep, cert, 0)
    }

    #[test]
    fn minimum_size() {
        assert_eq!(Response::MINIMUM_SIZE, 360);
        assert_eq!(sample(0).wire_size(), 360);
        assert_eq!(sample(3).wire_size(), 360 + 3 * 64);
    }

    #[test]
    fn roundtrip_with_path() {
        let response = sample(5);
        let bytes = response.as_bytes().unwrap();

        let decoded = Response::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.header().offsets(), [64, 384, 484, 636]);
        assert_eq!(decoded.path().depth(), 5);
        assert_eq!(decoded.srep().midp(), 1_700_000_000_000_000);
        assert_eq!(decoded.cert().dele().maxt(), u64::MAX);
    }

    #[test]
    fn empty_path_roundtrip() {
        let bytes = sample(0).as_bytes().unwrap();
        let decoded = Response::from_bytes(&bytes).unwrap();
        assert!(decoded.path().is_empty());
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = sample(1).as_bytes().unwrap();
        bytes.extend_from_slice(&[0u8; 4]);

        match Response::from_bytes(&bytes) {
            Err(Error::TrailingBytes(4)) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
