use Error::BufferTooSmall;

use crate::error::Error;

/// Read-only cursor over a received message. Every accessor is bounds checked, so a truncated
/// message surfaces as `BufferTooSmall` rather than a panic.
pub struct ReadCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ReadCursor<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.position < self.data.len()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Try to get an u32 in little-endian format, advancing the cursor
    #[inline]
    pub fn try_get_u32_le(&mut self) -> Result<u32, Error> {
        Ok(u32::from_le_bytes(self.try_get_fixed::<4>()?))
    }

    /// Try to get an u32 in big-endian format, advancing the cursor
    #[inline]
    pub fn try_get_u32(&mut self) -> Result<u32, Error> {
        Ok(u32::from_be_bytes(self.try_get_fixed::<4>()?))
    }

    /// Try to get an u64 in little-endian format, advancing the cursor
    #[inline]
    pub fn try_get_u64_le(&mut self) -> Result<u64, Error> {
        Ok(u64::from_le_bytes(self.try_get_fixed::<8>()?))
    }

    /// Try to get a fixed-size array from the cursor, advancing by N bytes.
    #[inline]
    pub fn try_get_fixed<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut result = [0u8; N];
        result.copy_from_slice(self.try_take(N)?);
        Ok(result)
    }

    /// Borrow the next `n` bytes of the message, advancing the cursor past them.
    #[inline]
    pub fn try_take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < n {
            return Err(BufferTooSmall(n, self.remaining()));
        }
        let start = self.position;
        self.position += n;
        Ok(&self.data[start..self.position])
    }

    /// Returns a slice of the remaining data without advancing the cursor
    #[inline]
    pub fn peek(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }
}

/// Cursor that serializes values into a caller-provided buffer.
pub struct WriteCursor<'a> {
    data: &'a mut [u8],
    position: usize,
}

impl<'a> WriteCursor<'a> {
    #[inline]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, position: 0 }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Transfer bytes from `src` into `self` advancing the cursor by the number of bytes written.
    ///
    /// Returns `BufferTooSmall` if `self` does not have enough remaining capacity to contain all
    /// of `src`.
    #[inline]
    pub fn try_put_slice(&mut self, src: &[u8]) -> Result<(), Error> {
        if self.remaining() < src.len() {
            return Err(BufferTooSmall(src.len(), self.remaining()));
        }
        self.data[self.position..self.position + src.len()].copy_from_slice(src);
        self.position += src.len();
        Ok(())
    }

    /// Try to put a fixed-size array into the cursor, advancing by N bytes.
    #[inline]
    pub fn try_put_fixed<const N: usize>(&mut self, data: &[u8; N]) -> Result<(), Error> {
        self.try_put_slice(data)
    }

    /// Try to write a u32 in little-endian format, advancing the cursor
    #[inline]
    pub fn try_put_u32_le(&mut self, value: u32) -> Result<(), Error> {
        self.try_put_fixed(&value.to_le_bytes())
    }

    /// Try to write a u64 in little-endian format, advancing the cursor
    #[inline]
    pub fn try_put_u64_le(&mut self, value: u64) -> Result<(), Error> {
        self.try_put_fixed(&value.to_le_bytes())
    }

    /// Write `n` zero bytes
    #[inline]
    pub fn try_put_zeros(&mut self, n: usize) -> Result<(), Error> {
        if self.remaining() < n {
            return Err(BufferTooSmall(n, self.remaining()));
        }
        self.data[self.position..self.position + n].fill(0);
        self.position += n;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_cursor() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut cursor = ReadCursor::new(&data);

        assert_eq!(cursor.remaining(), 8);
        assert_eq!(cursor.try_get_u32_le().unwrap(), 0x04030201);
        assert_eq!(cursor.remaining(), 4);
        assert_eq!(cursor.try_get_u32().unwrap(), 0x05060708);
        assert_eq!(cursor.remaining(), 0);
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn read_cursor_bounds() {
        let data = [0x01, 0x02];
        let mut cursor = ReadCursor::new(&data);

        match cursor.try_get_u32_le() {
            Err(BufferTooSmall(4, 2)) => (),
            other => panic!("unexpected result: {other:?}"),
        }
        // a failed read does not advance
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn take_borrows_without_copying() {
        let data = [9u8, 8, 7, 6, 5];
        let mut cursor = ReadCursor::new(&data);

        let first = cursor.try_take(2).unwrap();
        assert_eq!(first, &[9, 8]);
        assert_eq!(cursor.peek(), &[7, 6, 5]);
        assert!(cursor.try_take(4).is_err());
    }

    #[test]
    fn write_then_read() {
        let mut data = [0u8; 16];
        {
            let mut cursor = WriteCursor::new(&mut data);
            cursor.try_put_u32_le(0x12345678).unwrap();
            cursor.try_put_u64_le(0x9ABCDEF012345678).unwrap();
            cursor.try_put_zeros(4).unwrap();
            assert_eq!(cursor.remaining(), 0);
            assert!(cursor.try_put_u32_le(1).is_err());
        }

        let mut cursor = ReadCursor::new(&data);
        assert_eq!(cursor.try_get_u32_le().unwrap(), 0x12345678);
        assert_eq!(cursor.try_get_u64_le().unwrap(), 0x9ABCDEF012345678);
    }

    #[test]
    fn write_cursor_bounds() {
        let mut data = [0u8; 4];
        let mut cursor = WriteCursor::new(&mut data);

        assert!(cursor.try_put_u64_le(0x123456789ABCDEF0).is_err());
        assert!(cursor.try_put_slice(&[1, 2, 3, 4, 5]).is_err());
        assert_eq!(cursor.position(), 0);
    }
}
