use std::fmt::Debug;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::Error;
use crate::error::Error::{InvalidPathLength, PathTooLong};
use crate::util::as_hex;
use crate::wire::{FromWire, FromWireN, ToWire};

/// The sibling hashes proving a nonce's inclusion in the Merkle tree, leaf level first.
#[derive(Clone, PartialEq, Eq)]
pub struct MerklePath {
    num_paths: usize,
    data: [u8; MerklePath::capacity()],
}

impl MerklePath {
    /// A PATH never holds more than 32 hash values.
    pub const MAX_PATHS: usize = 32;
    /// Path elements are full SHA-512 outputs
    pub const ELEMENT_SIZE: usize = 64;

    const fn capacity() -> usize {
        Self::MAX_PATHS * Self::ELEMENT_SIZE
    }

    pub fn paths(&self) -> &[u8] {
        &self.data[..self.num_paths * Self::ELEMENT_SIZE]
    }

    /// Number of levels between the leaf and the root.
    pub fn depth(&self) -> usize {
        self.num_paths
    }

    pub fn is_empty(&self) -> bool {
        self.num_paths == 0
    }

    pub fn elements(&self) -> impl Iterator<Item = &[u8]> {
        self.paths().chunks(Self::ELEMENT_SIZE)
    }

    /// Append an element. Returns `PathTooLong` if the path is already at `MAX_PATHS`.
    pub fn push_element(&mut self, element: &[u8; Self::ELEMENT_SIZE]) -> Result<(), Error> {
        if self.num_paths >= Self::MAX_PATHS {
            return Err(PathTooLong(self.num_paths + 1));
        }

        let start_idx = self.num_paths * Self::ELEMENT_SIZE;
        let end_idx = start_idx + Self::ELEMENT_SIZE;
        self.data[start_idx..end_idx].copy_from_slice(element);
        self.num_paths += 1;
        Ok(())
    }
}

impl Debug for MerklePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.num_paths == 0 {
            write!(f, "PATH(None)")
        } else {
            write!(
                f,
                "PATH {{ num_paths: {}, data: {} }}",
                self.num_paths,
                as_hex(self.paths())
            )
        }
    }
}

impl Default for MerklePath {
    fn default() -> Self {
        Self {
            num_paths: 0,
            data: [0; Self::capacity()],
        }
    }
}

impl ToWire for MerklePath {
    fn wire_size(&self) -> usize {
        self.num_paths * Self::ELEMENT_SIZE
    }

    fn to_wire(&self, cursor: &mut WriteCursor) -> Result<(), Error> {
        cursor.try_put_slice(self.paths())
    }
}

impl FromWire for MerklePath {
    fn from_wire(cursor: &mut ReadCursor) -> Result<Self, Error> {
        MerklePath::from_wire_n(cursor, cursor.remaining())
    }
}

impl FromWireN for MerklePath {
    fn from_wire_n(cursor: &mut ReadCursor, n: usize) -> Result<Self, Error> {
        if !n.is_multiple_of(Self::ELEMENT_SIZE) {
            return Err(InvalidPathLength(n as u32));
        }

        if n > Self::capacity() {
            return Err(PathTooLong(n / Self::ELEMENT_SIZE));
        }

        let mut path = MerklePath {
            num_paths: n / Self::ELEMENT_SIZE,
            ..MerklePath::default()
        };

        path.data[..n].copy_from_slice(cursor.try_take(n)?);
        Ok(path)
    }
}

impl AsRef<[u8]> for MerklePath {
    fn as_ref(&self) -> &[u8] {
        self.paths()
    }
}

impl TryFrom<&[u8]> for MerklePath {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        MerklePath::from_bytes(data)
    }
}
