use super::ByteSource;
use std::io::{
    self,
    Read,
    Seek,
    SeekFrom,
};

/// Reads from anything seekable, typically a `std::fs::File` holding a disk image.
pub struct FileSource<R> {
    inner: R,
}

impl<R: Read + Seek> FileSource<R> {
    pub fn new(inner: R) -> FileSource<R> {
        FileSource { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for FileSource<R> {
    type Error = io::Error;

    fn fetch(&mut self, address: u64, buf: &mut [u8]) -> Result<(), io::Error> {
        self.inner.seek(SeekFrom::Start(address))?;
        self.inner.read_exact(buf)
    }
}
