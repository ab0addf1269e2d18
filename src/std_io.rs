use std::io::{self, IoSlice, Write};

use crate::{AllocError, HybridBuffer};

impl From<AllocError> for io::Error {
    fn from(err: AllocError) -> Self {
        io::Error::new(io::ErrorKind::OutOfMemory, err)
    }
}

/// Write is implemented for `HybridBuffer<u8, N>` by appending to the buffer.
///
/// The buffer grows as needed. A failed allocation is reported as
/// [`io::ErrorKind::OutOfMemory`] and leaves the buffer unchanged.
impl<const N: usize> Write for HybridBuffer<u8, N> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.try_reserve(buf.len())?;
        self.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[inline]
    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let num = bufs.iter().map(|b| b.len()).sum::<usize>();
        self.try_reserve(num)?;
        for buf in bufs {
            self.extend_from_slice(buf);
        }
        Ok(num)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Write::write(self, buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_vectored() {
        let mut v: HybridBuffer<u8, 4> = HybridBuffer::new();

        let n = v.write(b"hel").unwrap();
        assert_eq!(n, 3);
        assert!(v.is_inline());

        let n = v.write(b"lo").unwrap();
        assert_eq!(n, 2);
        assert!(!v.is_inline());
        assert_eq!(v, b"hello");

        let bufs = [IoSlice::new(b" "), IoSlice::new(b"world")];
        let n = v.write_vectored(&bufs).unwrap();
        assert_eq!(n, 6);
        assert_eq!(v, b"hello world");
    }

    #[test]
    fn write_all_grows() {
        let mut v: HybridBuffer<u8, 3> = HybridBuffer::new();
        let data = [b'y'; 257];
        v.write_all(&data).unwrap();
        assert_eq!(v.len(), 257);
        assert!(v.as_slice().iter().all(|&c| c == b'y'));
    }

    #[test]
    fn alloc_error_maps_to_out_of_memory() {
        let err: io::Error = AllocError::CapacityOverflow.into();
        assert_eq!(err.kind(), io::ErrorKind::OutOfMemory);
    }
}
