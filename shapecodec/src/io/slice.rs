use super::*;

impl<'a> Reader for &'a [u8] {
    #[inline]
    fn fill_buf(&mut self, n_bytes: usize) -> ReadResult<&[u8]> {
        Ok(&self[..n_bytes.min(self.len())])
    }

    #[inline]
    fn fill_exact(&mut self, n_bytes: usize) -> ReadResult<&[u8]> {
        self.get(..n_bytes).ok_or_else(|| read_size_limit(n_bytes))
    }

    #[inline]
    fn consume(&mut self, amt: usize) -> ReadResult<()> {
        let bytes: &'a [u8] = *self;
        let Some(rest) = bytes.get(amt..) else {
            return Err(read_size_limit(amt));
        };
        *self = rest;
        Ok(())
    }
}

/// Writes into the front of the slice and advances it, like `std::io::Write for &mut [u8]`,
/// except that a write which does not fit fails instead of writing a prefix.
impl Writer for &mut [u8] {
    #[inline]
    fn write(&mut self, src: &[u8]) -> WriteResult<()> {
        if src.len() > self.len() {
            return Err(write_size_limit(src.len()));
        }
        let (dst, rest) = core::mem::take(self).split_at_mut(src.len());
        dst.copy_from_slice(src);
        *self = rest;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::proptest_config::proptest_cfg, proptest::prelude::*};

    proptest! {
        #![proptest_config(proptest_cfg())]

        #[test]
        fn slice_reader_consumes_in_order(bytes in proptest::collection::vec(any::<u8>(), 1..=64)) {
            let mut reader = bytes.as_slice();
            let split = bytes.len() / 2;
            prop_assert_eq!(reader.fill_exact(split).unwrap(), &bytes[..split]);
            reader.consume(split).unwrap();
            prop_assert_eq!(reader, &bytes[split..]);
        }

        #[test]
        fn slice_writer_fills_prefix(bytes in proptest::collection::vec(any::<u8>(), 0..=64)) {
            let mut buffer = vec![0u8; bytes.len() + 3];
            let mut writer = buffer.as_mut_slice();
            writer.write(&bytes).unwrap();
            prop_assert_eq!(writer.len(), 3);
            prop_assert_eq!(&buffer[..bytes.len()], bytes.as_slice());
        }
    }

    #[test]
    fn slice_reader_reports_missing_bytes() {
        let mut reader: &[u8] = &[1, 2];
        assert!(matches!(
            reader.fill_exact(3),
            Err(ReadError::ReadSizeLimit(3))
        ));
        assert!(matches!(reader.consume(3), Err(ReadError::ReadSizeLimit(3))));
        assert_eq!(reader.read_byte().unwrap(), 1);
        assert_eq!(reader.read_byte().unwrap(), 2);
        assert!(reader.read_byte().is_err());
    }

    #[test]
    fn slice_writer_rejects_overflow() {
        let mut buffer = [0u8; 2];
        let mut writer = buffer.as_mut_slice();
        assert!(matches!(
            writer.write(&[1, 2, 3]),
            Err(WriteError::WriteSizeLimit(3))
        ));
        writer.write(&[7]).unwrap();
        assert_eq!(buffer, [7, 0]);
    }
}
