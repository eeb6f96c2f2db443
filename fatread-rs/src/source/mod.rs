//! Byte sources: the only way the FAT code ever touches the backing medium.

#[cfg(feature = "std")]
mod file;
mod memory;

#[cfg(feature = "std")]
pub use file::FileSource;
pub use memory::{
    MemSource,
    OutOfRange,
};

/// Random access into a disk image, block device, or memory buffer.
///
/// `fetch` fills all of `buf` with the bytes starting at the absolute `address`.  A short read is
/// an error; the FAT code never retries and never treats a failed fetch as zeroed data.
pub trait ByteSource {
    type Error;

    fn fetch(&mut self, address: u64, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    type Error = S::Error;

    #[inline(always)]
    fn fetch(&mut self, address: u64, buf: &mut [u8]) -> Result<(), S::Error> {
        (**self).fetch(address, buf)
    }
}
