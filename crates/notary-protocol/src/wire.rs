use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::error::Error::TrailingBytes;

/// Implementations can serialize themselves into the Roughtime wire format
pub trait ToWire {
    fn wire_size(&self) -> usize;
    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error>;

    /// Convenience method to serialize this message into a new `Vec<u8>`.
    fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0u8; self.wire_size()];
        let mut cursor = WriteCursor::new(&mut buf);
        self.to_wire(&mut cursor)?;
        Ok(buf)
    }
}

pub trait FromWire: Sized {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error>;

    /// Parse a complete message from `bytes`. Bytes left over after the message are an error:
    /// nothing outside of the parsed structure may ride along unauthenticated.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = ReadCursor::new(bytes);
        let value = Self::from_wire(&mut cursor)?;

        if cursor.has_remaining() {
            return Err(TrailingBytes(cursor.remaining()));
        }

        Ok(value)
    }
}

/// Variable-length values whose size is dictated by the enclosing message's offsets.
pub trait FromWireN: Sized {
    fn from_wire_n(cursor: &mut ReadCursor, n: usize) -> Result<Self, Error>;
}
