use Error::{
    MismatchedNumTags, OutOfBoundsOffset, UnalignedOffset, UnexpectedTags, UnorderedOffset,
    UnorderedTag,
};
use pastey::paste;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::tag::Tag;
use crate::wire::{FromWire, ToWire};

/// The fixed-size prefix of every Roughtime message: a tag count, `N - 1` value offsets
/// and `N` tags.
pub trait Header {
    fn num_tags() -> u32;
    fn offsets(&self) -> &[u32];
    fn tags(&self) -> &[Tag];

    fn set_offset(&mut self, idx: usize, offset: u32);
    fn set_tag(&mut self, idx: usize, tag: Tag);

    fn check_offset_bounds(&self, total_len: usize) -> Result<(), Error>;

    /// Every message type has exactly one permitted tag list.
    fn expect_tags(&self, expected: &[Tag]) -> Result<(), Error> {
        if self.tags() != expected {
            return Err(UnexpectedTags);
        }
        Ok(())
    }
}

fn to_wire_inner<H: Header>(header: &H, cursor: &mut WriteCursor) -> Result<(), Error> {
    cursor.try_put_u32_le(H::num_tags())?;

    for offset in header.offsets() {
        cursor.try_put_u32_le(*offset)?;
    }

    for tag in header.tags() {
        cursor.try_put_fixed(&tag.wire_value())?;
    }

    Ok(())
}

fn from_wire_inner<H: Header + Default>(cursor: &mut ReadCursor) -> Result<H, Error> {
    let mut header = H::default();

    let read_num_tags = cursor.try_get_u32_le()?;
    if H::num_tags() != read_num_tags {
        return Err(MismatchedNumTags(H::num_tags(), read_num_tags));
    }

    let mut prior_offset = 0;
    for idx in 0..(H::num_tags() - 1) {
        let value = cursor.try_get_u32_le()?;

        if value % 4 != 0 {
            return Err(UnalignedOffset(idx, value));
        }

        if value < prior_offset {
            return Err(UnorderedOffset(idx, value));
        }

        header.set_offset(idx as usize, value);
        prior_offset = value;
    }

    let mut prior_tag = Tag::INVALID;
    for idx in 0..H::num_tags() {
        // Tags are read big-endian even though their ordering uses the little-endian value.
        let value = cursor.try_get_u32()?;
        let tag = Tag::try_from(value)?;

        // Strictly ascending, so a repeated tag is rejected too
        if tag <= prior_tag {
            return Err(UnorderedTag(idx, value));
        }

        header.set_tag(idx as usize, tag);
        prior_tag = tag;
    }

    Ok(header)
}

fn check_offset_bounds_inner<H: Header>(header: &H, total_len: usize) -> Result<(), Error> {
    for (idx, &offset) in header.offsets().iter().enumerate() {
        if offset as usize > total_len {
            return Err(OutOfBoundsOffset(idx as u32, offset));
        }
    }

    Ok(())
}

// A const generic `Header<const N: usize>` can't declare `[u32; N - 1]` on stable Rust,
// so each arity is stamped out by this macro instead.
macro_rules! make_header_n {
    ( $N:literal ) => {
        paste! {
            #[derive(Debug, Eq, PartialEq, Clone)]
            pub struct [<Header $N>] {
                pub(crate) offsets: [u32; $N - 1],
                pub(crate) tags: [Tag; $N],
            }

            impl Default for [<Header $N>] {
                fn default() -> Self {
                    Self {
                        offsets: [0; $N - 1],
                        tags: [Tag::INVALID; $N],
                    }
                }
            }

            impl [<Header $N>] {
                const NUM_TAGS: u32 = $N;

                /// Size in bytes of this header on the wire.
                pub const SIZE: usize = 8 * $N;

                pub fn new(offsets: [u32; $N - 1], tags: [Tag; $N]) -> Self {
                    Self { offsets, tags }
                }
            }

            impl ToWire for [<Header $N>] {
                fn wire_size(&self) -> usize {
                    Self::SIZE
                }

                fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
                    to_wire_inner(self, cursor)
                }
            }

            impl FromWire for [<Header $N>] {
                fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
                    from_wire_inner(cursor)
                }
            }

            impl Header for [<Header $N>] {
                fn num_tags() -> u32 {
                    Self::NUM_TAGS
                }

                fn offsets(&self) -> &[u32] {
                    &self.offsets
                }

                fn tags(&self) -> &[Tag] {
                    &self.tags
                }

                fn check_offset_bounds(&self, total_len: usize) -> Result<(), Error> {
                    check_offset_bounds_inner(self, total_len)
                }

                fn set_offset(&mut self, idx: usize, offset: u32) {
                    self.offsets[idx] = offset;
                }

                fn set_tag(&mut self, idx: usize, tag: Tag) {
                    self.tags[idx] = tag;
                }
            }
        }
    };
}

make_header_n!(2);
make_header_n!(3);
make_header_n!(5);
