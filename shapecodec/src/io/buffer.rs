use super::*;

/// Owned, rebindable in-memory [`Reader`].
///
/// Pooled decoders hold one of these so the input buffer's allocation is reused across
/// calls: [`BufferReader::reset`] copies the next payload into the existing capacity.
#[derive(Debug, Default)]
pub struct BufferReader {
    buf: Vec<u8>,
    pos: usize,
}

impl BufferReader {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Replace the contents with `bytes` and rewind.
    pub fn reset(&mut self, bytes: &[u8]) {
        self.buf.clear();
        self.buf.extend_from_slice(bytes);
        self.pos = 0;
    }

    /// Drop the contents, keeping at most `max_capacity` bytes of allocation.
    pub fn clear(&mut self, max_capacity: usize) {
        self.buf.clear();
        self.buf.shrink_to(max_capacity);
        self.pos = 0;
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

impl Reader for BufferReader {
    #[inline]
    fn fill_buf(&mut self, n_bytes: usize) -> ReadResult<&[u8]> {
        let rest = &self.buf[self.pos..];
        Ok(&rest[..n_bytes.min(rest.len())])
    }

    #[inline]
    fn consume(&mut self, amt: usize) -> ReadResult<()> {
        if amt > self.buf.len() - self.pos {
            return Err(read_size_limit(amt));
        }
        self.pos += amt;
        Ok(())
    }
}
