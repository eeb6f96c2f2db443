use crate::{
    fat::{
        boot::BootSector,
        constants::*,
        dir_entry::{
            DirEntry,
            Slot,
        },
        geometry::FatType,
        lfn::LongName,
        name::{
            format_short_name,
            Name,
        },
        table::next_cluster_entry,
        FatError,
    },
    source::ByteSource,
};
use log::trace;

/// Resumable position inside one directory.
///
/// A cursor belongs to one (partition, start cluster) pair.  Handing it to
/// [`next_directory_entry`] with a different pair starts that directory from the top; handing it
/// back with the same pair picks up where the last call stopped.  Once the end of the directory is
/// reached it stays there until [`DirCursor::reset`].
#[derive(Clone, Copy)]
pub struct DirCursor {
    target: Option<(u64, u32)>,
    index: u32,
    cluster: u32,
    cluster_ordinal: u32,
    fixed_root: bool,
    end_of_chain: bool,
    end_of_table: bool,
    fat_type: FatType,
    lfn_pending: bool,
    lfn: LongName,
}

impl DirCursor {
    pub fn new() -> DirCursor {
        DirCursor {
            target: None,
            index: 0,
            cluster: 0,
            cluster_ordinal: 0,
            fixed_root: false,
            end_of_chain: false,
            end_of_table: false,
            fat_type: FatType::Fat12,
            lfn_pending: false,
            lfn: LongName::new(),
        }
    }

    /// Forget the current directory; the next call starts over from its first entry.
    pub fn reset(&mut self) {
        self.target = None;
    }

    #[inline(always)]
    pub fn start_cluster(&self) -> Option<u32> {
        self.target.map(|(_, cluster)| cluster)
    }

    /// Index of the next slot to read, counted from the start of the directory.
    #[inline(always)]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline(always)]
    pub fn is_finished(&self) -> bool {
        self.end_of_table
    }

    #[inline(always)]
    pub fn end_of_chain(&self) -> bool {
        self.end_of_chain
    }

    /// FAT width of the volume the cursor was last started on.
    #[inline(always)]
    pub fn fat_type(&self) -> Option<FatType> {
        self.target.map(|_| self.fat_type)
    }

    fn restart<E>(
        &mut self,
        boot: &BootSector,
        partition_offset: u64,
        start_cluster: u32,
    ) -> Result<(), FatError<E>> {
        let fat_type = boot.fat_type()?;
        let fixed_root = start_cluster == 0 && fat_type != FatType::Fat32;
        let cluster = if start_cluster == 0 && fat_type == FatType::Fat32 {
            boot.root_cluster()
        } else {
            start_cluster
        };
        if !fixed_root && (cluster < FIRST_DATA_CLUSTER || cluster > boot.max_cluster()?) {
            return Err(FatError::InvalidCluster(cluster));
        }

        *self = DirCursor::new();
        self.target = Some((partition_offset, start_cluster));
        self.cluster = cluster;
        self.fixed_root = fixed_root;
        self.fat_type = fat_type;
        Ok(())
    }

    // Where the slot at `self.index` lives, following the chain into the next cluster if needed.
    // `None` means the chain ran out.
    fn slot_address<S: ByteSource>(
        &mut self,
        boot: &BootSector,
        partition_offset: u64,
        source: &mut S,
    ) -> Result<Option<u64>, FatError<S::Error>> {
        if self.fixed_root {
            if self.index >= boot.root_entry_count as u32 {
                return Ok(None);
            }
            return Ok(Some(boot.root_dir_address(partition_offset) + self.index as u64 * DIR_ENTRY_SIZE as u64));
        }

        let entries_per_cluster = boot.entries_per_cluster();
        if self.index / entries_per_cluster != self.cluster_ordinal {
            if self.end_of_chain {
                return Ok(None);
            }
            let link = next_cluster_entry(boot, partition_offset, self.cluster, source)?;
            if link.end_of_chain {
                self.end_of_chain = true;
                return Ok(None);
            }
            if self.cluster_ordinal >= boot.count_of_clusters()? {
                // More clusters than the volume has: the chain loops
                return Err(FatError::InvalidCluster(link.cluster));
            }
            trace!("directory {:#x}: advancing to cluster {:#x}", self.cluster, link.cluster);
            self.cluster = link.cluster;
            self.cluster_ordinal += 1;
        }

        let base = boot
            .cluster_to_address(partition_offset, self.cluster)
            .ok_or(FatError::InvalidCluster(self.cluster))?;
        let slot = self.index % entries_per_cluster;
        Ok(Some(base + slot as u64 * DIR_ENTRY_SIZE as u64))
    }
}

impl Default for DirCursor {
    fn default() -> DirCursor {
        DirCursor::new()
    }
}

/// Returns the next live entry of the directory at `start_cluster`, with its resolved name.
///
/// `start_cluster` 0 is the root directory: the fixed region on FAT12/16, the boot sector's root
/// cluster on FAT32.  Deleted slots are skipped, long-name fragments are collected and attached to
/// the short entry that follows them, and `Ok(None)` means the directory is exhausted.  A failed
/// fetch leaves the cursor where it was, so the call can simply be repeated.
pub fn next_directory_entry<S: ByteSource>(
    boot: &BootSector,
    partition_offset: u64,
    start_cluster: u32,
    source: &mut S,
    cursor: &mut DirCursor,
) -> Result<Option<(DirEntry, Name)>, FatError<S::Error>> {
    if cursor.target != Some((partition_offset, start_cluster)) {
        cursor.restart::<S::Error>(boot, partition_offset, start_cluster)?;
    }

    loop {
        if cursor.end_of_table {
            return Ok(None);
        }
        let address = match cursor.slot_address(boot, partition_offset, source)? {
            Some(address) => address,
            None => {
                cursor.end_of_table = true;
                return Ok(None);
            },
        };

        let mut raw = [0u8; DIR_ENTRY_SIZE];
        source.fetch(address, &mut raw).map_err(FatError::BlockDeviceFailed)?;
        let slot = Slot::decode(&raw);

        // The slot right after a completed long name should be its short entry
        if cursor.lfn_pending {
            cursor.lfn_pending = false;
            if let Slot::Short(entry) = slot {
                if cursor.lfn.belongs_to(&entry) {
                    let name = cursor.lfn.to_name();
                    cursor.lfn.clear();
                    cursor.index += 1;
                    return Ok(Some((entry, name)));
                }
            }
            cursor.lfn.clear();
        }

        match slot {
            Slot::End => {
                cursor.end_of_table = true;
                return Ok(None);
            },
            Slot::Deleted => {
                cursor.lfn.clear();
                cursor.index += 1;
            },
            Slot::Short(entry) => {
                cursor.lfn.clear();
                cursor.index += 1;
                return Ok(Some((entry, format_short_name(entry.name(), entry.extension()))));
            },
            Slot::Long(fragment) => {
                cursor.index += 1;
                if cursor.lfn.push(&fragment) {
                    cursor.lfn_pending = true;
                }
            },
        }
    }
}

/// [`next_directory_entry`] as an iterator with its own cursor.  Stops after the first error.
pub struct DirectoryIterator<'a, S: ByteSource> {
    boot: &'a BootSector,
    partition_offset: u64,
    start_cluster: u32,
    source: &'a mut S,
    cursor: DirCursor,
    failed: bool,
}

impl<'a, S: ByteSource> DirectoryIterator<'a, S> {
    pub fn new(
        boot: &'a BootSector,
        partition_offset: u64,
        start_cluster: u32,
        source: &'a mut S,
    ) -> DirectoryIterator<'a, S> {
        DirectoryIterator {
            boot,
            partition_offset,
            start_cluster,
            source,
            cursor: DirCursor::new(),
            failed: false,
        }
    }

    #[inline(always)]
    pub fn cursor(&self) -> &DirCursor {
        &self.cursor
    }
}

impl<S: ByteSource> Iterator for DirectoryIterator<'_, S> {
    type Item = Result<(DirEntry, Name), FatError<S::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match next_directory_entry(
            self.boot,
            self.partition_offset,
            self.start_cluster,
            self.source,
            &mut self.cursor,
        ) {
            Ok(entry) => entry.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            },
        }
    }
}
