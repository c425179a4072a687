//! Pools of reusable encoders and decoders.
//!
//! Checking an instance out returns a guard that resets it on checkout and again on drop,
//! and hands it back to the pool however the guard goes away, including during unwinding.
//! Output and input buffers keep their allocation between uses, up to a retention bound.
use {
    crate::{
        decoder::Decoder,
        encoder::Encoder,
        error::{Result, WriteError},
        io::{BufferReader, Writer},
        shape::Reflect,
    },
    core::{
        fmt,
        ops::{Deref, DerefMut},
    },
    object_pool::{Pool, Reusable},
    std::sync::LazyLock,
    tracing::trace,
};

/// Buffers larger than this are shrunk before going back to the pool (64 KiB).
pub const DEFAULT_RETAINED_CAPACITY: usize = 64 * 1024;

static ENCODERS: LazyLock<EncoderPool> = LazyLock::new(EncoderPool::new);
static DECODERS: LazyLock<DecoderPool> = LazyLock::new(DecoderPool::new);

type PooledEncoderInner = Encoder<'static, Vec<u8>>;
type PooledDecoderInner = Decoder<'static, BufferReader>;

fn fresh_encoder() -> PooledEncoderInner {
    trace!("allocating pooled encoder");
    Encoder::new(Vec::new())
}

fn fresh_decoder() -> PooledDecoderInner {
    trace!("allocating pooled decoder");
    Decoder::new(BufferReader::new())
}

/// Pool of encoders writing into owned buffers.
pub struct EncoderPool {
    pool: Pool<PooledEncoderInner>,
    retained_capacity: usize,
}

impl Default for EncoderPool {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderPool {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pool with `count` encoders allocated up front.
    pub fn with_capacity(count: usize) -> Self {
        Self {
            pool: Pool::new(count, || Encoder::new(Vec::new())),
            retained_capacity: DEFAULT_RETAINED_CAPACITY,
        }
    }

    /// Output buffer capacity kept by encoders returning to the pool.
    pub fn with_retained_capacity(mut self, bytes: usize) -> Self {
        self.retained_capacity = bytes;
        self
    }

    pub fn global() -> &'static EncoderPool {
        &ENCODERS
    }

    /// Check out an encoder with an empty output buffer.
    pub fn get(&self) -> PooledEncoder<'_> {
        let mut encoder = PooledEncoder {
            inner: self.pool.pull(fresh_encoder),
            retained_capacity: self.retained_capacity,
        };
        encoder.clear();
        encoder
    }

    /// Encode `value` into a new byte vector.
    pub fn marshal<T: Reflect>(&self, value: &T) -> Result<Vec<u8>> {
        let mut encoder = self.get();
        encoder.encode(value)?;
        Ok(encoder.get_ref().clone())
    }

    /// Encode `value` with a pooled encoder, then copy the bytes into `out`.
    pub fn marshal_into<T: Reflect>(&self, value: &T, mut out: impl Writer) -> Result<()> {
        let mut encoder = self.get();
        encoder.encode(value)?;
        out.write(encoder.get_ref()).map_err(WriteError::from)?;
        out.finish().map_err(WriteError::from)?;
        Ok(())
    }

    /// Idle encoders currently held by the pool.
    pub fn idle(&self) -> usize {
        self.pool.len()
    }
}

impl fmt::Debug for EncoderPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderPool")
            .field("idle", &self.pool.len())
            .field("retained_capacity", &self.retained_capacity)
            .finish()
    }
}

/// An encoder checked out of an [`EncoderPool`].
pub struct PooledEncoder<'p> {
    inner: Reusable<'p, PooledEncoderInner>,
    retained_capacity: usize,
}

impl PooledEncoder<'_> {
    fn clear(&mut self) {
        self.inner.reset();
        let out = self.inner.get_mut();
        out.clear();
        if out.capacity() > self.retained_capacity {
            out.shrink_to(self.retained_capacity);
        }
    }
}

impl Deref for PooledEncoder<'_> {
    type Target = PooledEncoderInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PooledEncoder<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Drop for PooledEncoder<'_> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Pool of decoders reading from owned, rebindable buffers.
pub struct DecoderPool {
    pool: Pool<PooledDecoderInner>,
    retained_capacity: usize,
}

impl Default for DecoderPool {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderPool {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pool with `count` decoders allocated up front.
    pub fn with_capacity(count: usize) -> Self {
        Self {
            pool: Pool::new(count, || Decoder::new(BufferReader::new())),
            retained_capacity: DEFAULT_RETAINED_CAPACITY,
        }
    }

    /// Input buffer capacity kept by decoders returning to the pool.
    pub fn with_retained_capacity(mut self, bytes: usize) -> Self {
        self.retained_capacity = bytes;
        self
    }

    pub fn global() -> &'static DecoderPool {
        &DECODERS
    }

    /// Check out a decoder reading a copy of `bytes`.
    pub fn get(&self, bytes: &[u8]) -> PooledDecoder<'_> {
        let mut decoder = PooledDecoder {
            inner: self.pool.pull(fresh_decoder),
            retained_capacity: self.retained_capacity,
        };
        decoder.inner.reset();
        decoder.inner.get_mut().reset(bytes);
        decoder
    }

    /// Decode `bytes` into `target`, in place.
    pub fn unmarshal<T: Reflect>(&self, bytes: &[u8], target: &mut T) -> Result<()> {
        self.get(bytes).decode(target)
    }

    /// Idle decoders currently held by the pool.
    pub fn idle(&self) -> usize {
        self.pool.len()
    }
}

impl fmt::Debug for DecoderPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderPool")
            .field("idle", &self.pool.len())
            .field("retained_capacity", &self.retained_capacity)
            .finish()
    }
}

/// A decoder checked out of a [`DecoderPool`].
pub struct PooledDecoder<'p> {
    inner: Reusable<'p, PooledDecoderInner>,
    retained_capacity: usize,
}

impl Deref for PooledDecoder<'_> {
    type Target = PooledDecoderInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PooledDecoder<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Drop for PooledDecoder<'_> {
    fn drop(&mut self) {
        self.inner.reset();
        let retained = self.retained_capacity;
        self.inner.get_mut().clear(retained);
    }
}
