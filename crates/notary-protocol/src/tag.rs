use std::cmp::Ordering;

use crate::error::Error;
use crate::error::Error::BufferTooSmall;

/// Tags are used to identify values in Roughtime messages.
///
/// An unsigned 32-bit value (key) that maps to a byte-string (value).
///
/// Tags are ordered by their little-endian encoding of the ASCII tag value.
/// For example, 'SIG\x00' is 0x00474953 and 'NONC' is 0x434e4f4e. Tags are
/// serialized to the wire in big-endian order.
#[allow(non_camel_case_types)]
#[repr(u32)]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Tag {
    INVALID = 0x00000000,
    SIG = 0x53494700,
    NONC = 0x4e4f4e43,
    DELE = 0x44454c45,
    PATH = 0x50415448,
    RADI = 0x52414449,
    PUBK = 0x5055424b,
    MIDP = 0x4d494450,
    SREP = 0x53524550,
    MINT = 0x4d494e54,
    ROOT = 0x524f4f54,
    CERT = 0x43455254,
    MAXT = 0x4d415854,
    INDX = 0x494e4458,
    PAD = 0x504144ff,
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        // Tags MUST be sorted in ascending order by the numeric value of their little-endian
        // interpretation, even though tags are serialized as big-endian. This is confusing,
        // but it is correct.
        let lhs = (*self as u32).to_le_bytes();
        let rhs = (*other as u32).to_le_bytes();
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Tag {
    /// Returns the on-the-wire representation of this tag.
    pub const fn wire_value(&self) -> [u8; 4] {
        let value = *self as u32;
        value.to_be_bytes()
    }

    /// Return the `Tag` corresponding to the on-the-wire representation in `bytes` or an
    /// `Error::InvalidTag` if `bytes` do not correspond to a known tag.
    pub const fn from_wire(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 4 {
            return Err(BufferTooSmall(4, bytes.len()));
        }

        match bytes {
            b"SIG\x00" => Ok(Tag::SIG),
            b"NONC" => Ok(Tag::NONC),
            b"DELE" => Ok(Tag::DELE),
            b"PATH" => Ok(Tag::PATH),
            b"RADI" => Ok(Tag::RADI),
            b"PUBK" => Ok(Tag::PUBK),
            b"MIDP" => Ok(Tag::MIDP),
            b"SREP" => Ok(Tag::SREP),
            b"MINT" => Ok(Tag::MINT),
            b"ROOT" => Ok(Tag::ROOT),
            b"CERT" => Ok(Tag::CERT),
            b"MAXT" => Ok(Tag::MAXT),
            b"INDX" => Ok(Tag::INDX),
            b"PAD\xff" => Ok(Tag::PAD),
            _ => {
                let val = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                Err(Error::InvalidTag(val))
            }
        }
    }
}

impl TryFrom<u32> for Tag {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_wire(value.to_be_bytes().as_ref())
    }
}

impl From<Tag> for u32 {
    fn from(tag: Tag) -> Self {
        u32::from_be_bytes(tag.wire_value())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn try_from_u32() {
        assert!(Tag::try_from(0_u32).is_err());
        assert!(Tag::try_from(0x12345678_u32).is_err());
        assert!(Tag::try_from(0xFFFFFFFF_u32).is_err());
        // RFC-only tags are not part of this message family
        assert!(Tag::from_wire(b"VER\x00").is_err());
        assert!(Tag::from_wire(b"ZZZZ").is_err());
    }

    #[test]
    fn roundtrip_tag_u32() {
        for tag in [Tag::INDX, Tag::SIG, Tag::PAD, Tag::ROOT, Tag::NONC] {
            let u32_value = u32::from(tag);
            let roundtrip_tag = Tag::try_from(u32_value).unwrap();
            let fromwire_tag = Tag::from_wire(&tag.wire_value()).unwrap();

            assert_eq!(tag, roundtrip_tag, "Failed roundtrip conversion for {tag:?}");
            assert_eq!(tag, fromwire_tag, "Failed roundtrip conversion for {tag:?}");
        }
    }

    #[test]
    fn message_tag_orders_are_ascending() {
        let response = [Tag::SIG, Tag::PATH, Tag::SREP, Tag::CERT, Tag::INDX];
        let srep = [Tag::RADI, Tag::MIDP, Tag::ROOT];
        let dele = [Tag::PUBK, Tag::MINT, Tag::MAXT];
        let cert = [Tag::SIG, Tag::DELE];
        let request = [Tag::NONC, Tag::PAD];

        for tags in [&response[..], &srep, &dele, &cert, &request] {
            assert!(tags.windows(2).all(|w| w[0] < w[1]), "{tags:?} not ascending");
        }
    }
}
