pub mod boot;
pub mod constants;
mod debug;
mod dir_entry;
pub mod geometry;
mod lfn;
mod mbr;
mod name;
mod table;
mod volume;

use core::fmt;
pub use boot::{
    BootSector,
    BootTail,
    Fat16Tail,
    Fat32Tail,
};
pub use debug::ptype_write;
pub use dir_entry::{
    DirEntry,
    Slot,
};
pub use geometry::{
    FatType,
    GeometryError,
};
pub use lfn::LfnFragment;
pub use mbr::{
    is_supported_ptype,
    read_partition_table,
    Layout,
    MbrPartition,
    PartitionCursor,
    PartitionInfo,
};
pub use name::{
    format_short_name,
    short_name_matches,
    Name,
};
pub use table::{
    next_cluster_entry,
    ChainLink,
    ClusterChain,
    Extent,
    Extents,
};
pub use volume::{
    next_directory_entry,
    DirCursor,
    DirectoryIterator,
    Volume,
};

/// Everything that can go wrong while reading a FAT volume.  `E` is the byte source's own error.
#[derive(Debug, PartialEq, Eq)]
pub enum FatError<E> {
    BlockDeviceFailed(E),
    InvalidGeometry(GeometryError),
    InvalidCluster(u32),
    CorruptMbr,
    NoPartition,
    NotADirectory,
    FileNotFound,
}

impl<E> From<GeometryError> for FatError<E> {
    fn from(e: GeometryError) -> FatError<E> {
        FatError::InvalidGeometry(e)
    }
}

impl<E: fmt::Display> fmt::Display for FatError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatError::BlockDeviceFailed(e) => write!(f, "block device failed: {}", e),
            FatError::InvalidGeometry(e) => write!(f, "invalid boot sector: {}", e),
            FatError::InvalidCluster(c) => write!(f, "invalid cluster reference {:#x}", c),
            FatError::CorruptMbr => write!(f, "master boot record has no 0x55aa signature"),
            FatError::NoPartition => write!(f, "no supported FAT partition in the partition table"),
            FatError::NotADirectory => write!(f, "not a directory"),
            FatError::FileNotFound => write!(f, "file not found"),
        }
    }
}

#[cfg(feature = "std")]
impl<E> std::error::Error for FatError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FatError::BlockDeviceFailed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GeometryError {}
