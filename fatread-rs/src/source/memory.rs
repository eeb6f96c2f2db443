use super::ByteSource;
use crate::hexfmt::hexfmt;
use core::{
    convert::TryFrom,
    fmt,
};
use ufmt::{
    uDebug,
    uWrite,
    Formatter,
};

/// A fetch that ran off the end of a [`MemSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    pub address: u64,
    pub len: usize,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch of {} bytes at {:#x} is out of range", self.len, self.address)
    }
}

impl uDebug for OutOfRange {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        out.write_str("OutOfRange: ")?;
        ufmt::uwrite!(out, "{} bytes at ", self.len)?;
        hexfmt(out, self.address, 8)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRange {}

/// An image that is already in memory.
pub struct MemSource<'a> {
    data: &'a [u8],
}

impl<'a> MemSource<'a> {
    pub fn new(data: &'a [u8]) -> MemSource<'a> {
        MemSource { data }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ByteSource for MemSource<'_> {
    type Error = OutOfRange;

    fn fetch(&mut self, address: u64, buf: &mut [u8]) -> Result<(), OutOfRange> {
        let err = OutOfRange { address, len: buf.len() };
        let start = usize::try_from(address).map_err(|_| err)?;
        let end = start.checked_add(buf.len()).ok_or(err)?;
        match self.data.get(start..end) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                Ok(())
            },
            None => Err(err),
        }
    }
}
