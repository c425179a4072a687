//! [`Reader`] and [`Writer`] implementations.
//!
//! These are the byte source and byte sink seams of the crate. Codecs never
//! touch I/O directly; they go through an [`Encoder`](crate::Encoder) or
//! [`Decoder`](crate::Decoder) that owns one of these.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Attempting to read {0} bytes")]
    ReadSizeLimit(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ReadResult<T> = core::result::Result<T, ReadError>;

#[cold]
pub const fn read_size_limit(len: usize) -> ReadError {
    ReadError::ReadSizeLimit(len)
}

/// Trait for structured reading of bytes from a source.
///
/// # Advancement semantics
/// - `fill_*` methods and [`Reader::peek`] never advance.
/// - [`Reader::consume`], [`Reader::read_byte`] and [`Reader::copy_into_slice`] advance.
pub trait Reader {
    /// Return up to `n_bytes` from the internal buffer without advancing. Implementations may
    /// read more data internally to satisfy future requests. Returns fewer than `n_bytes` at EOF.
    ///
    /// Use [`Reader::fill_exact`] if you need exactly `n_bytes`.
    fn fill_buf(&mut self, n_bytes: usize) -> ReadResult<&[u8]>;

    /// Return exactly `n_bytes` without advancing.
    ///
    /// Errors if the source cannot provide enough bytes.
    fn fill_exact(&mut self, n_bytes: usize) -> ReadResult<&[u8]> {
        let src = self.fill_buf(n_bytes)?;
        if src.len() != n_bytes {
            return Err(read_size_limit(n_bytes));
        }
        Ok(src)
    }

    /// Return exactly `N` bytes as an array without advancing.
    fn fill_array<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let src = self.fill_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(src);
        Ok(out)
    }

    /// Advance the reader exactly `amt` bytes, returning an error if the source does not have
    /// enough bytes.
    fn consume(&mut self, amt: usize) -> ReadResult<()>;

    /// Return the next byte without advancing.
    #[inline]
    fn peek(&mut self) -> ReadResult<u8> {
        self.fill_buf(1)?
            .first()
            .copied()
            .ok_or_else(|| read_size_limit(1))
    }

    /// Read and consume a single byte.
    #[inline]
    fn read_byte(&mut self) -> ReadResult<u8> {
        let byte = self.peek()?;
        self.consume(1)?;
        Ok(byte)
    }

    /// Copy and consume exactly `dst.len()` bytes into `dst`.
    #[inline]
    fn copy_into_slice(&mut self, dst: &mut [u8]) -> ReadResult<()> {
        let src = self.fill_exact(dst.len())?;
        dst.copy_from_slice(src);
        self.consume(dst.len())
    }
}

impl<R: Reader + ?Sized> Reader for &mut R {
    #[inline]
    fn fill_buf(&mut self, n_bytes: usize) -> ReadResult<&[u8]> {
        (**self).fill_buf(n_bytes)
    }

    #[inline]
    fn fill_exact(&mut self, n_bytes: usize) -> ReadResult<&[u8]> {
        (**self).fill_exact(n_bytes)
    }

    #[inline]
    fn consume(&mut self, amt: usize) -> ReadResult<()> {
        (**self).consume(amt)
    }
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Attempting to write {0} bytes")]
    WriteSizeLimit(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cold]
const fn write_size_limit(len: usize) -> WriteError {
    WriteError::WriteSizeLimit(len)
}

pub type WriteResult<T> = core::result::Result<T, WriteError>;

/// Trait for structured writing of bytes into a sink.
pub trait Writer {
    /// Finalize the writer by performing any required cleanup or flushing.
    fn finish(&mut self) -> WriteResult<()> {
        Ok(())
    }

    /// Write exactly `src.len()` bytes from the given `src` into the writer.
    fn write(&mut self, src: &[u8]) -> WriteResult<()>;
}

impl<W: Writer + ?Sized> Writer for &mut W {
    #[inline]
    fn finish(&mut self) -> WriteResult<()> {
        (**self).finish()
    }

    #[inline]
    fn write(&mut self, src: &[u8]) -> WriteResult<()> {
        (**self).write(src)
    }
}

mod buffer;
mod slice;
mod std_io;
mod vec;
pub use {buffer::BufferReader, std_io::*};
