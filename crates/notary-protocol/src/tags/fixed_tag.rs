use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::{FromWire, ToWire};

/// A tag value with a size known at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedTag<const N: usize>([u8; N]);

impl<const N: usize> FixedTag<N> {
    #[inline]
    pub fn new(data: [u8; N]) -> Self {
        Self(data)
    }

    #[inline]
    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        let data: [u8; N] = slice
            .try_into()
            .map_err(|_| Error::WrongTagSize(N, slice.len()))?;
        Ok(Self(data))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> Default for FixedTag<N> {
    #[inline]
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> From<[u8; N]> for FixedTag<N> {
    #[inline]
    fn from(data: [u8; N]) -> Self {
        Self(data)
    }
}

impl<const N: usize> AsRef<[u8]> for FixedTag<N> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> ToWire for FixedTag<N> {
    #[inline]
    fn wire_size(&self) -> usize {
        N
    }

    #[inline]
    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        cursor.try_put_fixed(&self.0)
    }
}

impl<const N: usize> FromWire for FixedTag<N> {
    #[inline]
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        Ok(Self(cursor.try_get_fixed()?))
    }
}
