//! LEB128 varints and zig-zag mapping.
//!
//! Unsigned integers are written 7 bits at a time, least significant group first, with the
//! high bit of each byte set when more bytes follow. Signed integers are zig-zag mapped first
//! so small magnitudes of either sign stay short:
//!
//! ```
//! use shapecodec::varint::{zigzag_i64, unzigzag_u64};
//!
//! assert_eq!(zigzag_i64(0), 0);
//! assert_eq!(zigzag_i64(-1), 1);
//! assert_eq!(zigzag_i64(1), 2);
//! assert_eq!(zigzag_i64(-2), 3);
//! assert_eq!(zigzag_i64(i64::MIN), u64::MAX);
//! assert_eq!(unzigzag_u64(u64::MAX), i64::MIN);
//! ```
use {
    crate::{
        error::{varint_overflow, ReadResult},
        io::Reader,
    },
    pastey::paste,
};

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN64: usize = 10;
/// Maximum encoded length of a 128-bit varint.
pub const MAX_VARINT_LEN128: usize = 19;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7f;

macro_rules! impl_uvarint {
    ($ty:ty, $max_len:ident) => {
        paste! {
            /// Encode `val` into `buf`, returning the number of bytes used.
            #[inline]
            pub fn [<encode_ $ty>](mut val: $ty, buf: &mut [u8; $max_len]) -> usize {
                let mut i = 0;
                while val >= CONTINUATION as $ty {
                    buf[i] = (val as u8) | CONTINUATION;
                    val >>= 7;
                    i += 1;
                }
                buf[i] = val as u8;
                i + 1
            }

            /// Encoded length of `val` in bytes.
            #[inline]
            pub const fn [<size_of_ $ty>](val: $ty) -> usize {
                let bits = <$ty>::BITS - (val | 1).leading_zeros();
                bits.div_ceil(7) as usize
            }

            /// Decode one varint from `reader`.
            ///
            /// Fails with [`VarintOverflow`](crate::ReadError::VarintOverflow) when the
            /// encoding is longer than the width allows or its final byte carries bits beyond
            /// the width.
            pub fn [<decode_ $ty>](reader: &mut impl Reader) -> ReadResult<$ty> {
                // Bits left for the final byte once the preceding groups are full.
                const LAST_MAX: u8 = (1u8 << (<$ty>::BITS as usize - 7 * ($max_len - 1))) - 1;
                let mut val: $ty = 0;
                let mut shift = 0u32;
                for i in 0..$max_len {
                    let byte = reader.read_byte()?;
                    if byte < CONTINUATION {
                        if i == $max_len - 1 && byte > LAST_MAX {
                            return Err(varint_overflow($max_len));
                        }
                        return Ok(val | (byte as $ty) << shift);
                    }
                    val |= ((byte & PAYLOAD) as $ty) << shift;
                    shift += 7;
                }
                Err(varint_overflow($max_len))
            }
        }
    };
}

impl_uvarint!(u64, MAX_VARINT_LEN64);
impl_uvarint!(u128, MAX_VARINT_LEN128);

macro_rules! impl_zigzag {
    ($signed:ty => $unsigned:ty) => {
        paste! {
            #[inline]
            pub const fn [<zigzag_ $signed>](val: $signed) -> $unsigned {
                ((val << 1) ^ (val >> (<$signed>::BITS - 1))) as $unsigned
            }

            #[inline]
            pub const fn [<unzigzag_ $unsigned>](val: $unsigned) -> $signed {
                ((val >> 1) as $signed) ^ -((val & 1) as $signed)
            }
        }
    };
}

impl_zigzag!(i64 => u64);
impl_zigzag!(i128 => u128);
