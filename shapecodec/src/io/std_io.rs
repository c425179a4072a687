//! Adapters over `std::io` streams.
use super::*;

const DEFAULT_BUF_SIZE: usize = 8 * 1024;

/// [`Writer`] over any [`std::io::Write`].
///
/// [`Writer::finish`] flushes the inner stream.
#[derive(Debug)]
pub struct WriteAdapter<W> {
    inner: W,
}

impl<W: std::io::Write> WriteAdapter<W> {
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: std::io::Write> Writer for WriteAdapter<W> {
    #[inline]
    fn write(&mut self, src: &[u8]) -> WriteResult<()> {
        Ok(self.inner.write_all(src)?)
    }

    fn finish(&mut self) -> WriteResult<()> {
        Ok(self.inner.flush()?)
    }
}

/// Buffered [`Reader`] over any [`std::io::Read`].
///
/// Reads from the inner stream in chunks of at least the configured buffer size, and only
/// grows its buffer when a single value needs more bytes than are buffered.
#[derive(Debug)]
pub struct ReadAdapter<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl<R: std::io::Read> ReadAdapter<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_BUF_SIZE, inner)
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(capacity),
            pos: 0,
            chunk: capacity.max(1),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Pull from the inner stream until `n_bytes` are buffered or the stream is exhausted.
    fn fill_to(&mut self, n_bytes: usize) -> ReadResult<()> {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        while self.buf.len() < n_bytes {
            let start = self.buf.len();
            let want = (n_bytes - start).max(self.chunk);
            self.buf.resize(start + want, 0);
            let read = match self.inner.read(&mut self.buf[start..]) {
                Ok(read) => read,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => 0,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e.into());
                }
            };
            self.buf.truncate(start + read);
            if read == 0 {
                break;
            }
        }
        Ok(())
    }
}

impl<R: std::io::Read> Reader for ReadAdapter<R> {
    fn fill_buf(&mut self, n_bytes: usize) -> ReadResult<&[u8]> {
        if self.buf.len() - self.pos < n_bytes {
            self.fill_to(n_bytes)?;
        }
        let rest = &self.buf[self.pos..];
        Ok(&rest[..n_bytes.min(rest.len())])
    }

    fn consume(&mut self, amt: usize) -> ReadResult<()> {
        if self.buf.len() - self.pos < amt {
            self.fill_to(amt)?;
            if self.buf.len() < amt {
                return Err(read_size_limit(amt));
            }
        }
        self.pos += amt;
        Ok(())
    }
}
