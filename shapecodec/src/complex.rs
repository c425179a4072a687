//! Complex numbers as a pair of IEEE-754 values.
//!
//! On the wire a complex value is its real then imaginary part, each fixed width and
//! little-endian.

/// A complex number `re + im·i`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;

impl<T> Complex<T> {
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl Complex32 {
    pub const ENCODED_LEN: usize = 8;

    pub fn to_le_bytes(self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[..4].copy_from_slice(&self.re.to_le_bytes());
        out[4..].copy_from_slice(&self.im.to_le_bytes());
        out
    }

    pub fn from_le_bytes(bytes: [u8; Self::ENCODED_LEN]) -> Self {
        let [r0, r1, r2, r3, i0, i1, i2, i3] = bytes;
        Self::new(
            f32::from_le_bytes([r0, r1, r2, r3]),
            f32::from_le_bytes([i0, i1, i2, i3]),
        )
    }
}

impl Complex64 {
    pub const ENCODED_LEN: usize = 16;

    pub fn to_le_bytes(self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[..8].copy_from_slice(&self.re.to_le_bytes());
        out[8..].copy_from_slice(&self.im.to_le_bytes());
        out
    }

    pub fn from_le_bytes(bytes: [u8; Self::ENCODED_LEN]) -> Self {
        let mut re = [0u8; 8];
        let mut im = [0u8; 8];
        re.copy_from_slice(&bytes[..8]);
        im.copy_from_slice(&bytes[8..]);
        Self::new(f64::from_le_bytes(re), f64::from_le_bytes(im))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::proptest_config::proptest_cfg, proptest::prelude::*};

    #[test]
    fn layout_is_real_then_imaginary() {
        let bytes = Complex32::new(1.0, -2.0).to_le_bytes();
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..], &(-2.0f32).to_le_bytes());
    }

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn complex64_bytes_are_bit_exact(re: u64, im: u64) {
            let val = Complex64::new(f64::from_bits(re), f64::from_bits(im));
            let back = Complex64::from_le_bytes(val.to_le_bytes());
            prop_assert_eq!(back.re.to_bits(), re);
            prop_assert_eq!(back.im.to_bits(), im);
        }
    }
}
