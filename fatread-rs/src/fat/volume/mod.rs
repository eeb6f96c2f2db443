mod dir_iter;

pub use dir_iter::{
    next_directory_entry,
    DirCursor,
    DirectoryIterator,
};

use super::{
    boot::BootSector,
    constants::*,
    dir_entry::DirEntry,
    geometry::{
        FatType,
        GeometryError,
    },
    mbr::{
        Layout,
        PartitionCursor,
        PartitionInfo,
    },
    name::{
        short_name_matches,
        Name,
    },
    table::{
        next_cluster_entry,
        ChainLink,
        ClusterChain,
        Extents,
    },
    FatError,
};
use crate::source::ByteSource;
use log::debug;

const DIR_SEPARATOR: char = '/';

/// A FAT volume: a validated boot sector plus the byte offset it was read from.
///
/// The volume holds no reference to its byte source; every operation that reads takes the source as
/// an argument, so one source can serve several volumes (or several enumerations of one volume).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Volume {
    boot: BootSector,
    partition_offset: u64,
    fat_type: FatType,
}

impl Volume {
    /// Directory cluster number that stands for the root directory.
    pub const ROOT: u32 = 0;

    pub fn new(boot: BootSector, partition_offset: u64) -> Result<Volume, GeometryError> {
        boot.validate()?;
        let fat_type = boot.fat_type()?;
        Ok(Volume { boot, partition_offset, fat_type })
    }

    /// Opens the volume at the start of the source, or in the first supported partition.
    pub fn open<S: ByteSource>(source: &mut S, layout: Layout) -> Result<Volume, FatError<S::Error>> {
        let volume = match layout {
            Layout::Raw => {
                let mut raw = [0u8; BOOT_SECTOR_SIZE];
                source.fetch(0, &mut raw).map_err(FatError::BlockDeviceFailed)?;
                Volume::new(BootSector::decode(&raw), 0)?
            },
            Layout::WithPartitionTable => {
                let info = PartitionCursor::new().next_partition(source)?.ok_or(FatError::NoPartition)?;
                Volume::from_partition(&info)?
            },
        };
        debug!(
            "opened {} volume at {:#x}: {} clusters of {} bytes",
            volume.fat_type.name(),
            volume.partition_offset,
            volume.boot.count_of_clusters()?,
            volume.boot.cluster_size(),
        );
        Ok(volume)
    }

    pub fn from_partition(info: &PartitionInfo) -> Result<Volume, GeometryError> {
        Volume::new(info.boot, info.offset)
    }

    #[inline(always)]
    pub fn boot_sector(&self) -> &BootSector {
        &self.boot
    }

    #[inline(always)]
    pub fn partition_offset(&self) -> u64 {
        self.partition_offset
    }

    #[inline(always)]
    pub fn fat_type(&self) -> FatType {
        self.fat_type
    }

    /// Byte address of the first root directory entry.
    pub fn root_dir_address(&self) -> u64 {
        match self.fat_type {
            FatType::Fat32 => self
                .boot
                .cluster_to_address(self.partition_offset, self.boot.root_cluster())
                .unwrap_or_else(|| self.boot.root_dir_address(self.partition_offset)),
            _ => self.boot.root_dir_address(self.partition_offset),
        }
    }

    pub fn next_cluster<S: ByteSource>(&self, source: &mut S, cluster: u32) -> Result<ChainLink, FatError<S::Error>> {
        next_cluster_entry(&self.boot, self.partition_offset, cluster, source)
    }

    pub fn chain<'a, S: ByteSource>(&'a self, source: &'a mut S, start_cluster: u32) -> ClusterChain<'a, S> {
        ClusterChain::new(&self.boot, self.partition_offset, start_cluster, source)
    }

    /// Where the bytes of a file live, cluster by cluster.
    pub fn extents<'a, S: ByteSource>(&'a self, source: &'a mut S, entry: &DirEntry) -> Extents<'a, S> {
        Extents::new(&self.boot, self.partition_offset, entry.first_cluster(), entry.size() as u64, source)
    }

    /// Entries of the directory starting at `dir_cluster` ([`Volume::ROOT`] for the root).
    pub fn dir<'a, S: ByteSource>(&'a self, source: &'a mut S, dir_cluster: u32) -> DirectoryIterator<'a, S> {
        DirectoryIterator::new(&self.boot, self.partition_offset, dir_cluster, source)
    }

    pub fn open_dir<'a, S: ByteSource>(
        &'a self,
        source: &'a mut S,
        entry: &DirEntry,
    ) -> Result<DirectoryIterator<'a, S>, FatError<S::Error>> {
        if !entry.is_directory() {
            return Err(FatError::NotADirectory);
        }
        Ok(self.dir(source, entry.first_cluster()))
    }

    /// Resumable variant of [`Volume::dir`]; see [`next_directory_entry`].
    pub fn next_entry<S: ByteSource>(
        &self,
        source: &mut S,
        dir_cluster: u32,
        cursor: &mut DirCursor,
    ) -> Result<Option<(DirEntry, Name)>, FatError<S::Error>> {
        next_directory_entry(&self.boot, self.partition_offset, dir_cluster, source, cursor)
    }

    /// Looks `name` up in one directory, by long name or 8.3 name, ignoring ASCII case.  Volume
    /// labels never match.
    pub fn find<S: ByteSource>(
        &self,
        source: &mut S,
        dir_cluster: u32,
        name: &str,
    ) -> Result<Option<(DirEntry, Name)>, FatError<S::Error>> {
        let mut cursor = DirCursor::new();
        while let Some((entry, resolved)) = self.next_entry(source, dir_cluster, &mut cursor)? {
            if entry.is_volume_label() {
                continue;
            }
            if resolved.eq_ignore_ascii_case(name) || short_name_matches(name, entry.name(), entry.extension()) {
                debug!("found {} in directory {:#x}", name, dir_cluster);
                return Ok(Some((entry, resolved)));
            }
        }
        Ok(None)
    }

    /// Resolves a `/`-separated path from the root directory.
    pub fn lookup<S: ByteSource>(&self, source: &mut S, path: &str) -> Result<(DirEntry, Name), FatError<S::Error>> {
        let mut dir_cluster = Volume::ROOT;
        let mut found: Option<(DirEntry, Name)> = None;
        for component in path.split(DIR_SEPARATOR).filter(|c| !c.is_empty()) {
            if let Some((entry, _)) = &found {
                if !entry.is_directory() {
                    return Err(FatError::NotADirectory);
                }
                dir_cluster = entry.first_cluster();
            }
            found = Some(self.find(source, dir_cluster, component)?.ok_or(FatError::FileNotFound)?);
        }
        found.ok_or(FatError::FileNotFound)
    }

    /// Walks a directory tree depth first, calling `func` with each entry, its name, and its depth.
    /// `.` and `..` are reported but not descended into.
    pub fn ls<S: ByteSource>(
        &self,
        source: &mut S,
        dir_cluster: u32,
        depth: u16,
        depth_limit: u16,
        func: &mut impl FnMut(&DirEntry, &Name, u16),
    ) -> Result<(), FatError<S::Error>> {
        let mut cursor = DirCursor::new();
        while let Some((entry, name)) = self.next_entry(source, dir_cluster, &mut cursor)? {
            func(&entry, &name, depth);
            if depth_limit > 0 && entry.is_directory() && !entry.is_self_or_parent() {
                self.ls(source, entry.first_cluster(), depth + 1, depth_limit - 1, func)?;
            }
        }
        Ok(())
    }
}
