use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::error::Error::UnexpectedOffsets;
use crate::header::{Header, Header3};
use crate::tag::Tag;
use crate::tags::MerkleRoot;
use crate::wire::{FromWire, ToWire};

/// SREP: the signed portion of a response. The server asserts the true time was within
/// `midpoint ± radius` (microseconds) when it signed the Merkle `root` of the batch.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SignedResponse {
    header: Header3,
    radius: u32,
    midpoint: u64,
    merkle_root: MerkleRoot,
}

impl SignedResponse {
    /// Prefix prepended to the SREP bytes before the delegated key signs them.
    pub const CONTEXT: &'static [u8] = b"RoughTime v1 response signature\x00";

    pub const SIZE: usize = Header3::SIZE + 4 + 8 + 64;

    const MIDP_OFFSET: u32 = size_of::<u32>() as u32;
    const ROOT_OFFSET: u32 = Self::MIDP_OFFSET + size_of::<u64>() as u32;
    const OFFSETS: [u32; 2] = [Self::MIDP_OFFSET, Self::ROOT_OFFSET];
    const TAGS: [Tag; 3] = [Tag::RADI, Tag::MIDP, Tag::ROOT];

    pub fn new(radius: u32, midpoint: u64, root: MerkleRoot) -> Self {
        Self {
            header: Header3::new(Self::OFFSETS, Self::TAGS),
            radius,
            midpoint,
            merkle_root: root,
        }
    }

    pub fn radi(&self) -> u32 {
        self.radius
    }

    pub fn midp(&self) -> u64 {
        self.midpoint
    }

    pub fn root(&self) -> &MerkleRoot {
        &self.merkle_root
    }

    /// The exact byte string covered by the response SIG.
    pub fn signed_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut msg = Vec::with_capacity(Self::CONTEXT.len() + Self::SIZE);
        msg.extend_from_slice(Self::CONTEXT);
        msg.extend_from_slice(&self.as_bytes()?);
        Ok(msg)
    }
}

impl Default for SignedResponse {
    fn default() -> Self {
        Self::new(0, 0, MerkleRoot::default())
    }
}

impl ToWire for SignedResponse {
    fn wire_size(&self) -> usize {
        Self::SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        self.header.to_wire(cursor)?;
        cursor.try_put_u32_le(self.radius)?;
        cursor.try_put_u64_le(self.midpoint)?;
        self.merkle_root.to_wire(cursor)
    }
}

impl FromWire for SignedResponse {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        let header = Header3::from_wire(cursor)?;
        header.expect_tags(&Self::TAGS)?;

        if header.offsets() != Self::OFFSETS {
            return Err(UnexpectedOffsets);
        }

        Ok(SignedResponse {
            header,
            radius: cursor.try_get_u32_le()?,
            midpoint: cursor.try_get_u64_le()?,
            merkle_root: MerkleRoot::from_wire(cursor)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error::UnexpectedTags;

    #[test]
    fn wire_roundtrip() {
        let srep1 = SignedResponse::new(1_000_000, 1_700_000_000_000_000, [0x2e; 64].into());
        let buf = srep1.as_bytes().unwrap();
        assert_eq!(buf.len(), 100);

        let srep2 = SignedResponse::from_bytes(&buf).unwrap();
        assert_eq!(srep1, srep2);
        assert_eq!(srep2.radi(), 1_000_000);
        assert_eq!(srep2.midp(), 1_700_000_000_000_000);
    }

    #[test]
    fn invalid_tags_are_detected() {
        let mut buf = SignedResponse::default().as_bytes().unwrap();
        // MIDP -> MINT keeps the ordering valid but the tag set wrong
        buf[16..20].copy_from_slice(b"MINT");

        match SignedResponse::from_bytes(&buf) {
            Err(UnexpectedTags) => (),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn truncated_root_is_rejected() {
        let buf = SignedResponse::default().as_bytes().unwrap();
        assert!(SignedResponse::from_bytes(&buf[..buf.len() - 1]).is_err());
    }
}
