//! One-call entry points over the process-wide pools and cache.
use crate::{
    encoder::Encoder,
    error::Result,
    io::Writer,
    pool::{DecoderPool, EncoderPool},
    shape::Reflect,
};

/// Encode `value` into a new byte vector.
///
/// ```
/// # #[cfg(feature = "derive")] {
/// use shapecodec::Reflect;
///
/// #[derive(Reflect, Default, Debug, PartialEq)]
/// pub struct Point {
///     pub x: i32,
///     pub y: i32,
/// }
///
/// let bytes = shapecodec::marshal(&Point { x: 1, y: -1 }).unwrap();
/// assert_eq!(bytes, [0x02, 0x01]);
/// let point: Point = shapecodec::unmarshal_value(&bytes).unwrap();
/// assert_eq!(point, Point { x: 1, y: -1 });
/// # }
/// ```
pub fn marshal<T: Reflect>(value: &T) -> Result<Vec<u8>> {
    EncoderPool::global().marshal(value)
}

/// Encode `value` straight into `out`.
pub fn marshal_into<T: Reflect>(value: &T, out: &mut impl Writer) -> Result<()> {
    Encoder::new(out).encode(value)
}

/// Decode `bytes` into `target`, in place.
pub fn unmarshal<T: Reflect>(bytes: &[u8], target: &mut T) -> Result<()> {
    DecoderPool::global().unmarshal(bytes, target)
}

/// Decode `bytes` into a fresh value.
pub fn unmarshal_value<T: Reflect>(bytes: &[u8]) -> Result<T> {
    let mut value = T::zeroed();
    unmarshal(bytes, &mut value)?;
    Ok(value)
}
