use std::io::{Read, Result};

use zerocopy::{ByteOrder, FromBytes, I32, U16, U32};

/// Extends [`Read`] with methods for reading little- or big-endian values.
///
/// The byte order is always explicit. Callers in this crate instantiate the
/// methods with [`zerocopy::LittleEndian`], as every integer in a PE image is
/// stored little-endian regardless of the host.
pub trait ReadBytesExt: Read {
    /// Reads a type that implements [`FromBytes`] from the underlying reader.
    ///
    /// # Errors
    ///
    /// This method returns the same errors as [`Read::read_exact`].
    #[inline]
    fn read_t<T: FromBytes>(&mut self) -> Result<T> {
        T::read_from_io(self)
    }

    /// Reads an unsigned 16-bit integer from the underlying reader.
    ///
    /// # Errors
    ///
    /// This method returns the same errors as [`Read::read_exact`].
    #[inline]
    fn read_u16<T: ByteOrder>(&mut self) -> Result<u16> {
        U16::<T>::read_from_io(self).map(U16::get)
    }

    /// Reads an unsigned 32-bit integer from the underlying reader.
    ///
    /// # Errors
    ///
    /// This method returns the same errors as [`Read::read_exact`].
    #[inline]
    fn read_u32<T: ByteOrder>(&mut self) -> Result<u32> {
        U32::<T>::read_from_io(self).map(U32::get)
    }
}

/// All types that implement `Read` get methods defined in `ReadBytesExt` for free.
impl<R: Read + ?Sized> ReadBytesExt for R {}

/// Bounds-checked reads at absolute offsets into a byte slice.
///
/// Every method returns `None` instead of panicking when the value would
/// extend past the end of the slice.
pub trait ByteSliceExt {
    fn t_at<T: FromBytes>(&self, offset: usize) -> Option<T>;

    #[inline]
    fn u16_at<O: ByteOrder>(&self, offset: usize) -> Option<u16> {
        self.t_at::<U16<O>>(offset).map(U16::get)
    }

    #[inline]
    fn u32_at<O: ByteOrder>(&self, offset: usize) -> Option<u32> {
        self.t_at::<U32<O>>(offset).map(U32::get)
    }

    #[inline]
    fn i32_at<O: ByteOrder>(&self, offset: usize) -> Option<i32> {
        self.t_at::<I32<O>>(offset).map(I32::get)
    }
}

impl ByteSliceExt for [u8] {
    #[inline]
    fn t_at<T: FromBytes>(&self, offset: usize) -> Option<T> {
        self.get(offset..)
            .and_then(|rest| T::read_from_prefix(rest).ok())
            .map(|(value, _)| value)
    }
}
