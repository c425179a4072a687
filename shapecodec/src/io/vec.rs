use super::*;

/// Writer implementation for `Vec<u8>` that appends to the vector. The vector will grow as needed.
///
/// # Examples
///
/// ```
/// # use shapecodec::io::Writer;
/// let mut vec = vec![1, 2, 3];
/// vec.write(&[4, 5, 6]).unwrap();
/// assert_eq!(vec, &[1, 2, 3, 4, 5, 6]);
/// ```
impl Writer for Vec<u8> {
    #[inline]
    fn write(&mut self, src: &[u8]) -> WriteResult<()> {
        self.extend_from_slice(src);
        Ok(())
    }
}
