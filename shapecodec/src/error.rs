//! Error types and helpers.
use {crate::io, core::str::Utf8Error, thiserror::Error};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedType),
    #[error("Can only decode into addressable storage")]
    NotAddressable,
}

/// A type whose shape cannot be turned into a codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedType {
    #[error("Type `{0}` has no binary representation")]
    Opaque(&'static str),
    #[error("Type `{0}` contains itself by value")]
    ByValueCycle(&'static str),
    #[error("Field `{field}` of `{type_name}` is encodable but carries no shape")]
    MissingFieldShape {
        type_name: &'static str,
        field: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] io::WriteError),
    #[error("Custom error: {0}")]
    Custom(&'static str),
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::ReadError),
    #[error("Varint is longer than {0} bytes or overflows its width")]
    VarintOverflow(usize),
    #[error("Decoded integer does not fit in `{0}`")]
    IntegerOverflow(&'static str),
    #[error(transparent)]
    InvalidUtf8Encoding(#[from] Utf8Error),
    #[error("Invalid bool encoding: {0}")]
    InvalidBoolEncoding(u8),
    #[error("Invalid char scalar value: {0:#x}")]
    InvalidChar(u32),
    #[error(
        "Encoded sequence length exceeded preallocation limit of {limit} bytes (needed {needed} \
         bytes)"
    )]
    PreallocationSizeLimit { needed: usize, limit: usize },
    #[error("Nesting exceeded the depth limit of {0}")]
    DepthLimitExceeded(usize),
    #[error("Custom error: {0}")]
    Custom(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
pub type WriteResult<T> = core::result::Result<T, WriteError>;
pub type ReadResult<T> = core::result::Result<T, ReadError>;

#[cold]
pub const fn varint_overflow(max_bytes: usize) -> ReadError {
    ReadError::VarintOverflow(max_bytes)
}

#[cold]
pub const fn integer_overflow(target: &'static str) -> ReadError {
    ReadError::IntegerOverflow(target)
}

#[cold]
pub const fn invalid_bool_encoding(byte: u8) -> ReadError {
    ReadError::InvalidBoolEncoding(byte)
}

#[cold]
pub const fn invalid_utf8_encoding(error: Utf8Error) -> ReadError {
    ReadError::InvalidUtf8Encoding(error)
}

#[cold]
pub const fn invalid_char(scalar: u32) -> ReadError {
    ReadError::InvalidChar(scalar)
}

#[cold]
pub const fn preallocation_size_limit(needed: usize, limit: usize) -> ReadError {
    ReadError::PreallocationSizeLimit { needed, limit }
}

#[cold]
pub const fn read_depth_limit(limit: usize) -> ReadError {
    ReadError::DepthLimitExceeded(limit)
}
