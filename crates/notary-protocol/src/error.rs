use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("request size is not 1024 bytes: {0} bytes")]
    BadRequestSize(usize),

    #[error("buffer too small: {0} bytes needed, {1} bytes available")]
    BufferTooSmall(usize, usize),

    #[error("invalid tag: {0:#010x}")]
    InvalidTag(u32),

    #[error("mismatched number of tags: expected {0}, got {1}")]
    MismatchedNumTags(u32, u32),

    #[error("tags found in the message are not what was expected")]
    UnexpectedTags,

    #[error("tag is less than or equal to prior tag: index {0}, value {1:#010x}")]
    UnorderedTag(u32, u32),

    #[error("offsets found in the message are not what was expected")]
    UnexpectedOffsets,

    #[error("offset value less than prior offset: index {0}, value {1:#010x}")]
    UnorderedOffset(u32, u32),

    #[error("offset is not 4-byte aligned: index {0}, value {1:#010x}")]
    UnalignedOffset(u32, u32),

    #[error("offset is beyond the end of the message: index {0}, value {1:#010x}")]
    OutOfBoundsOffset(u32, u32),

    #[error("PATH length not a multiple of 64-bytes: length {0}")]
    InvalidPathLength(u32),

    #[error("PATH has {0} elements, more than the maximum of 32")]
    PathTooLong(usize),

    #[error("wrong tag size: expected {0} bytes, got {1} bytes")]
    WrongTagSize(usize, usize),

    #[error("{0} unexpected bytes after the end of the message")]
    TrailingBytes(usize),
}
