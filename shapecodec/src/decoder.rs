//! Streaming decoder.
use {
    crate::{
        complex::{Complex32, Complex64},
        config::Config,
        error::{
            integer_overflow, invalid_bool_encoding, invalid_char, invalid_utf8_encoding,
            preallocation_size_limit, read_depth_limit, Error, ReadResult, Result,
        },
        io::Reader,
        scan::CodecCache,
        shape::{Reflect, Shape},
        varint,
    },
    core::ptr,
};

/// Reads values of any [`Reflect`] type from a [`Reader`], in place.
///
/// Decoding into an existing value reuses what it can: strings and vectors keep their
/// allocations, and present optional values are overwritten rather than reallocated. On
/// error the target may be partially updated.
///
/// ```
/// use shapecodec::Decoder;
///
/// let mut decoder = Decoder::new(&[0x03, b'a', b'b', b'c', 0x01][..]);
/// let mut name = String::new();
/// let mut flag = false;
/// decoder.decode(&mut name).unwrap();
/// decoder.decode(&mut flag).unwrap();
/// assert_eq!((name.as_str(), flag), ("abc", true));
/// ```
pub struct Decoder<'c, R: Reader> {
    pub(crate) reader: R,
    depth: usize,
    cache: &'c CodecCache,
    config: Config,
}

impl<R: Reader> Decoder<'static, R> {
    /// Decoder over `reader` backed by the process-wide [`CodecCache`].
    pub fn new(reader: R) -> Self {
        Self::with_cache(CodecCache::global(), reader)
    }
}

impl<'c, R: Reader> Decoder<'c, R> {
    pub fn with_cache(cache: &'c CodecCache, reader: R) -> Self {
        Self {
            reader,
            depth: 0,
            cache,
            config: Config::new(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn cache(&self) -> &'c CodecCache {
        self.cache
    }

    /// Decode the next value into `target`.
    pub fn decode<T: Reflect>(&mut self, target: &mut T) -> Result<()> {
        // SAFETY: `target` is a live, uniquely borrowed `T` described by `T::SHAPE`.
        unsafe { self.decode_erased(T::SHAPE, ptr::from_mut(target).cast()) }
    }

    /// Decode the next value into the storage `target` points to.
    ///
    /// A null `target` is rejected with [`Error::NotAddressable`].
    ///
    /// # Safety
    ///
    /// `shape` must describe its type the way that type's `Reflect::SHAPE` would, since the codec
    /// compiled from it is cached for every later user of the cache. A non-null `target` must
    /// point to an initialized, uniquely borrowed value of that type.
    pub unsafe fn decode_erased(&mut self, shape: &'static Shape, target: *mut ()) -> Result<()> {
        if target.is_null() {
            return Err(Error::NotAddressable);
        }
        // SAFETY: `shape` is accurate, guaranteed by the caller.
        let codec = unsafe { self.cache.scan_shape(shape) }?;
        self.depth = 0;
        // SAFETY: guaranteed by the caller.
        unsafe { codec.decode_to(self, target.cast()) }?;
        Ok(())
    }

    #[inline]
    pub fn read_byte(&mut self) -> ReadResult<u8> {
        Ok(self.reader.read_byte()?)
    }

    /// Fill `dst` with the next `dst.len()` bytes.
    #[inline]
    pub fn read_exact(&mut self, dst: &mut [u8]) -> ReadResult<()> {
        Ok(self.reader.copy_into_slice(dst)?)
    }

    #[inline]
    pub fn read_uvarint(&mut self) -> ReadResult<u64> {
        varint::decode_u64(&mut self.reader)
    }

    #[inline]
    pub fn read_varint(&mut self) -> ReadResult<i64> {
        self.read_uvarint().map(varint::unzigzag_u64)
    }

    #[inline]
    pub fn read_uvarint128(&mut self) -> ReadResult<u128> {
        varint::decode_u128(&mut self.reader)
    }

    #[inline]
    pub fn read_varint128(&mut self) -> ReadResult<i128> {
        self.read_uvarint128().map(varint::unzigzag_u128)
    }

    /// Bit pattern as an unsigned varint. A pattern wider than 32 bits is rejected.
    #[inline]
    pub fn read_f32(&mut self) -> ReadResult<f32> {
        let bits = self.read_uvarint()?;
        let bits = u32::try_from(bits).map_err(|_| integer_overflow("f32"))?;
        Ok(f32::from_bits(bits))
    }

    #[inline]
    pub fn read_f64(&mut self) -> ReadResult<f64> {
        self.read_uvarint().map(f64::from_bits)
    }

    #[inline]
    pub fn read_bool(&mut self) -> ReadResult<bool> {
        match self.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(invalid_bool_encoding(byte)),
        }
    }

    #[inline]
    pub fn read_char(&mut self) -> ReadResult<char> {
        let scalar = self.read_uvarint()?;
        let scalar = u32::try_from(scalar).map_err(|_| integer_overflow("char"))?;
        char::from_u32(scalar).ok_or_else(|| invalid_char(scalar))
    }

    #[inline]
    pub fn read_complex_f32(&mut self) -> ReadResult<Complex32> {
        let bytes = self.reader.fill_array::<{ Complex32::ENCODED_LEN }>()?;
        self.reader.consume(Complex32::ENCODED_LEN)?;
        Ok(Complex32::from_le_bytes(bytes))
    }

    #[inline]
    pub fn read_complex_f64(&mut self) -> ReadResult<Complex64> {
        let bytes = self.reader.fill_array::<{ Complex64::ENCODED_LEN }>()?;
        self.reader.consume(Complex64::ENCODED_LEN)?;
        Ok(Complex64::from_le_bytes(bytes))
    }

    /// Length-prefixed bytes, replacing the contents of `dst`.
    pub fn read_bytes(&mut self, dst: &mut Vec<u8>) -> ReadResult<()> {
        self.read_prefixed_bytes(|bytes| {
            dst.clear();
            dst.extend_from_slice(bytes);
            Ok(())
        })
    }

    /// Length-prefixed UTF-8, replacing the contents of `dst`.
    pub fn read_string(&mut self, dst: &mut String) -> ReadResult<()> {
        self.read_prefixed_bytes(|bytes| {
            let s = core::str::from_utf8(bytes).map_err(invalid_utf8_encoding)?;
            dst.clear();
            dst.push_str(s);
            Ok(())
        })
    }

    /// Read a length prefix and hand the payload to `f` before consuming it.
    pub(crate) fn read_prefixed_bytes(
        &mut self,
        f: impl FnOnce(&[u8]) -> ReadResult<()>,
    ) -> ReadResult<()> {
        let len = self.read_len(1)?;
        f(self.reader.fill_exact(len)?)?;
        self.reader.consume(len)?;
        Ok(())
    }

    /// Read a collection length, rejecting lengths that would make the decoder allocate more
    /// than the preallocation limit for elements of `elem_size` bytes.
    pub(crate) fn read_len(&mut self, elem_size: usize) -> ReadResult<usize> {
        let len = self.read_uvarint()?;
        let len = usize::try_from(len).map_err(|_| integer_overflow("usize"))?;
        let needed = len.saturating_mul(elem_size.max(1));
        let limit = self.config.preallocation_size_limit();
        if needed > limit {
            return Err(preallocation_size_limit(needed, limit));
        }
        Ok(len)
    }

    /// Clear transient state. The reader is left untouched.
    pub fn reset(&mut self) {
        self.depth = 0;
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Descend one level through a recursive codec.
    #[inline]
    pub(crate) fn enter(&mut self) -> ReadResult<()> {
        if self.depth >= self.config.max_depth() {
            return Err(read_depth_limit(self.config.max_depth()));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{error::ReadError, io},
    };

    #[test]
    fn primitive_reads() {
        let bytes = [0xac, 0x02, 0x01, 0x01, 0x02, b'h', b'i'];
        let mut decoder = Decoder::new(bytes.as_slice());
        assert_eq!(decoder.read_uvarint().unwrap(), 300);
        assert_eq!(decoder.read_varint().unwrap(), -1);
        assert!(decoder.read_bool().unwrap());
        let mut s = String::from("previous contents");
        decoder.read_string(&mut s).unwrap();
        assert_eq!(s, "hi");
        assert!(decoder.into_inner().is_empty());
    }

    #[test]
    fn f32_is_assigned_from_bits() {
        let bits = std::f32::consts::PI.to_bits();
        let mut encoded = Vec::new();
        let mut buf = [0u8; varint::MAX_VARINT_LEN64];
        let len = varint::encode_u64(u64::from(bits), &mut buf);
        encoded.extend_from_slice(&buf[..len]);
        let mut decoder = Decoder::new(encoded.as_slice());
        assert_eq!(decoder.read_f32().unwrap().to_bits(), bits);
    }

    #[test]
    fn f32_rejects_wide_bit_patterns() {
        let mut decoder = Decoder::new(&[0x80u8, 0x80, 0x80, 0x80, 0x10][..]);
        assert!(matches!(
            decoder.read_f32(),
            Err(ReadError::IntegerOverflow("f32"))
        ));
    }

    #[test]
    fn bool_rejects_other_bytes() {
        let mut decoder = Decoder::new(&[2u8][..]);
        assert!(matches!(
            decoder.read_bool(),
            Err(ReadError::InvalidBoolEncoding(2))
        ));
    }

    #[test]
    fn char_rejects_surrogates() {
        let mut decoder = Decoder::new(&[0x80u8, 0xb0, 0x03][..]);
        assert!(matches!(
            decoder.read_char(),
            Err(ReadError::InvalidChar(0xd800))
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut decoder = Decoder::new(&[0x01u8, 0xff][..]);
        assert!(matches!(
            decoder.read_string(&mut String::new()),
            Err(ReadError::InvalidUtf8Encoding(_))
        ));
    }

    #[test]
    fn truncated_string_is_io_error() {
        let mut decoder = Decoder::new(&[0x05, b'a'][..]);
        assert!(matches!(
            decoder.read_string(&mut String::new()),
            Err(ReadError::Io(io::ReadError::ReadSizeLimit(5)))
        ));
    }

    #[test]
    fn length_beyond_preallocation_limit_is_rejected() {
        let mut decoder = Decoder::new(&[0xe8u8, 0x07][..])
            .with_config(Config::new().with_preallocation_size_limit(100));
        assert!(matches!(
            decoder.read_bytes(&mut Vec::new()),
            Err(ReadError::PreallocationSizeLimit {
                needed: 1000,
                limit: 100
            })
        ));
    }

    #[test]
    fn null_target_is_not_addressable() {
        let mut decoder = Decoder::new(&[0u8][..]);
        let result = unsafe { decoder.decode_erased(u8::SHAPE, ptr::null_mut()) };
        assert!(matches!(result, Err(Error::NotAddressable)));
    }
}
