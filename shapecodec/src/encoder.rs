//! Streaming encoder.
use {
    crate::{
        complex::{Complex32, Complex64},
        error::{Result, WriteError},
        io::Writer,
        scan::CodecCache,
        shape::Reflect,
        varint::{self, MAX_VARINT_LEN128, MAX_VARINT_LEN64},
    },
    core::ptr,
};

/// Writes values of any [`Reflect`] type into a [`Writer`].
///
/// Primitive writes never return errors. The first failure is latched and every later write
/// becomes a no-op; [`Encoder::encode`] surfaces the latched error, and [`Encoder::error`]
/// exposes it to callers driving the primitive writes by hand.
///
/// ```
/// # #[cfg(feature = "derive")] {
/// use shapecodec::{Encoder, Reflect};
///
/// #[derive(Reflect, Default)]
/// pub struct Message {
///     pub name: String,
///     pub value: u64,
/// }
///
/// let mut encoder = Encoder::new(Vec::new());
/// encoder
///     .encode(&Message { name: "ok".into(), value: 1 })
///     .unwrap();
/// assert_eq!(encoder.into_inner(), [0x02, b'o', b'k', 0x01]);
/// # }
/// ```
pub struct Encoder<'c, W: Writer> {
    out: W,
    err: Option<WriteError>,
    cache: &'c CodecCache,
}

impl<W: Writer> Encoder<'static, W> {
    /// Encoder over `out` backed by the process-wide [`CodecCache`].
    pub fn new(out: W) -> Self {
        Self::with_cache(CodecCache::global(), out)
    }
}

impl<'c, W: Writer> Encoder<'c, W> {
    pub fn with_cache(cache: &'c CodecCache, out: W) -> Self {
        Self {
            out,
            err: None,
            cache,
        }
    }

    pub fn cache(&self) -> &'c CodecCache {
        self.cache
    }

    /// Encode `value`, then [`finish`](Writer::finish) the sink.
    ///
    /// An error latched before the call is returned without writing anything.
    pub fn encode<T: Reflect>(&mut self, value: &T) -> Result<()> {
        if let Some(err) = self.err.take() {
            return Err(err.into());
        }
        let codec = self.cache.scan::<T>()?;
        // SAFETY: `codec` was built from `T::SHAPE` and `value` is a live `T`.
        unsafe { codec.encode_to(self, ptr::from_ref(value).cast()) };
        if let Some(err) = self.err.take() {
            return Err(err.into());
        }
        self.out.finish().map_err(WriteError::from)?;
        Ok(())
    }

    /// Write raw bytes.
    #[inline]
    pub fn write(&mut self, bytes: &[u8]) {
        if self.err.is_some() {
            return;
        }
        if let Err(err) = self.out.write(bytes) {
            self.err = Some(err.into());
        }
    }

    #[inline]
    pub fn write_uvarint(&mut self, val: u64) {
        let mut buf = [0u8; MAX_VARINT_LEN64];
        let len = varint::encode_u64(val, &mut buf);
        self.write(&buf[..len]);
    }

    #[inline]
    pub fn write_varint(&mut self, val: i64) {
        self.write_uvarint(varint::zigzag_i64(val));
    }

    #[inline]
    pub fn write_uvarint128(&mut self, val: u128) {
        let mut buf = [0u8; MAX_VARINT_LEN128];
        let len = varint::encode_u128(val, &mut buf);
        self.write(&buf[..len]);
    }

    #[inline]
    pub fn write_varint128(&mut self, val: i128) {
        self.write_uvarint128(varint::zigzag_i128(val));
    }

    /// IEEE-754 bit pattern as an unsigned varint.
    #[inline]
    pub fn write_f32(&mut self, val: f32) {
        self.write_uvarint(u64::from(val.to_bits()));
    }

    #[inline]
    pub fn write_f64(&mut self, val: f64) {
        self.write_uvarint(val.to_bits());
    }

    #[inline]
    pub fn write_bool(&mut self, val: bool) {
        self.write(&[u8::from(val)]);
    }

    #[inline]
    pub fn write_char(&mut self, val: char) {
        self.write_uvarint(u64::from(u32::from(val)));
    }

    #[inline]
    pub fn write_complex_f32(&mut self, val: Complex32) {
        self.write(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_complex_f64(&mut self, val: Complex64) {
        self.write(&val.to_le_bytes());
    }

    /// Length-prefixed bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_uvarint(bytes.len() as u64);
        self.write(bytes);
    }

    #[inline]
    pub fn write_str(&mut self, val: &str) {
        self.write_bytes(val.as_bytes());
    }

    /// The latched error, if any.
    pub fn error(&self) -> Option<&WriteError> {
        self.err.as_ref()
    }

    pub fn is_poisoned(&self) -> bool {
        self.err.is_some()
    }

    /// Take the latched error, un-poisoning the encoder.
    pub fn take_error(&mut self) -> Option<WriteError> {
        self.err.take()
    }

    /// Clear transient state. The sink is left untouched.
    pub fn reset(&mut self) {
        self.err = None;
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    #[cold]
    pub(crate) fn fail(&mut self, err: WriteError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{error::Error, io},
    };

    #[test]
    fn primitive_writes() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_uvarint(300);
        encoder.write_varint(-1);
        encoder.write_bool(true);
        encoder.write_str("hi");
        encoder.write_f32(1.0);
        assert_eq!(
            encoder.into_inner(),
            [0xac, 0x02, 0x01, 0x01, 0x02, b'h', b'i', 0x80, 0x80, 0x80, 0xfc, 0x03]
        );
    }

    #[test]
    fn complex_pairs_are_fixed_width_little_endian() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write_complex_f64(Complex64::new(1.0, 2.0));
        let out = encoder.into_inner();
        assert_eq!(out.len(), 16);
        assert_eq!(&out[..8], &1.0f64.to_le_bytes());
        assert_eq!(&out[8..], &2.0f64.to_le_bytes());
    }

    #[test]
    fn first_error_is_latched() {
        let mut buf = [0u8; 2];
        let mut encoder = Encoder::new(buf.as_mut_slice());
        encoder.write(&[1, 2, 3]);
        assert!(encoder.is_poisoned());
        encoder.write(&[4]);
        assert!(matches!(
            encoder.error(),
            Some(WriteError::Io(io::WriteError::WriteSizeLimit(3)))
        ));

        // Surfaced by the next encode without writing.
        assert!(matches!(encoder.encode(&7u8), Err(Error::Write(_))));
        assert!(!encoder.is_poisoned());
        drop(encoder);
        assert_eq!(buf, [0, 0]);
    }

    #[test]
    fn reset_clears_the_latch() {
        let mut empty = [0u8; 0];
        let mut encoder = Encoder::new(empty.as_mut_slice());
        encoder.write_bool(true);
        assert!(encoder.is_poisoned());
        encoder.reset();
        assert!(encoder.error().is_none());
    }
}
