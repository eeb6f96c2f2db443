use super::{
    boot::BootSector,
    constants::*,
    geometry::FatType,
    FatError,
};
use crate::source::ByteSource;
use byteorder::{
    ByteOrder,
    LittleEndian,
};
use core::cmp::min;
use log::trace;

/// One FAT lookup: the entry stored for a cluster, and whether that entry ends the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainLink {
    pub cluster: u32,
    pub end_of_chain: bool,
}

/// Reads the FAT entry of `cluster`, i.e. the cluster that follows it in its chain.
///
/// Only the first FAT copy is consulted.  `cluster` has to be a data cluster (2 up to the last
/// cluster of the volume); anything else is reported as `InvalidCluster` before the FAT is touched.
///
/// A FAT12 entry can straddle a sector boundary (its first byte is the last byte of one FAT sector).
/// In that case the first byte of the following sector is fetched as well.
pub fn next_cluster_entry<S: ByteSource>(
    boot: &BootSector,
    partition_offset: u64,
    cluster: u32,
    source: &mut S,
) -> Result<ChainLink, FatError<S::Error>> {
    let fat_type = boot.fat_type()?;
    if cluster < FIRST_DATA_CLUSTER || cluster > boot.max_cluster()? {
        return Err(FatError::InvalidCluster(cluster));
    }

    let bytes_per_sector = boot.bytes_per_sector as u32;
    let fat_offset = match fat_type {
        FatType::Fat12 => cluster.checked_add(cluster / 2),
        FatType::Fat16 => cluster.checked_mul(2),
        FatType::Fat32 => cluster.checked_mul(4),
    }
    .ok_or(FatError::InvalidCluster(cluster))?;
    let sector = (boot.reserved_sectors as u32)
        .checked_add(fat_offset / bytes_per_sector)
        .ok_or(FatError::InvalidCluster(cluster))?;
    let pos = (fat_offset % bytes_per_sector) as usize;
    let address = boot.sector_to_address(partition_offset, sector);

    // One spare byte for the straddling FAT12 case
    let mut buf = [0u8; MAX_SECTOR_SIZE as usize + 1];
    let len = bytes_per_sector as usize;
    source.fetch(address, &mut buf[..len]).map_err(FatError::BlockDeviceFailed)?;

    let value = match fat_type {
        FatType::Fat12 => {
            if pos == len - 1 {
                source
                    .fetch(address + len as u64, &mut buf[len..len + 1])
                    .map_err(FatError::BlockDeviceFailed)?;
            }
            let word = LittleEndian::read_u16(&buf[pos..pos + 2]) as u32;
            if cluster & 1 == 1 {
                word >> 4
            } else {
                word & 0x0fff
            }
        },
        FatType::Fat16 => LittleEndian::read_u16(&buf[pos..pos + 2]) as u32,
        // The top four bits are reserved
        FatType::Fat32 => LittleEndian::read_u32(&buf[pos..pos + 4]) & FAT32_ENTRY_MASK,
    };

    let end_of_chain = value >= fat_type.end_of_chain();
    trace!("fat entry {:#x} -> {:#x}{}", cluster, value, if end_of_chain { " (end)" } else { "" });
    Ok(ChainLink { cluster: value, end_of_chain })
}

enum ChainState {
    Start(u32),
    Follow(u32),
    Done,
}

/// Every cluster of a chain, starting with the start cluster itself.
///
/// The iteration stops after the last cluster; [`ClusterChain::terminator`] then holds the
/// end-of-chain value that was found in the FAT.  A lookup error is yielded once and ends the
/// iteration, as does a chain that is longer than the volume has clusters (a loop in the FAT).
pub struct ClusterChain<'a, S: ByteSource> {
    boot: &'a BootSector,
    partition_offset: u64,
    source: &'a mut S,
    state: ChainState,
    steps: u32,
    terminator: Option<u32>,
}

impl<'a, S: ByteSource> ClusterChain<'a, S> {
    pub fn new(
        boot: &'a BootSector,
        partition_offset: u64,
        start_cluster: u32,
        source: &'a mut S,
    ) -> ClusterChain<'a, S> {
        ClusterChain {
            boot,
            partition_offset,
            source,
            state: ChainState::Start(start_cluster),
            steps: 0,
            terminator: None,
        }
    }

    #[inline(always)]
    pub fn terminator(&self) -> Option<u32> {
        self.terminator
    }
}

impl<S: ByteSource> Iterator for ClusterChain<'_, S> {
    type Item = Result<u32, FatError<S::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            ChainState::Done => None,
            ChainState::Start(cluster) => {
                self.state = ChainState::Done;
                match self.boot.max_cluster() {
                    Ok(max) if cluster < FIRST_DATA_CLUSTER || cluster > max => {
                        return Some(Err(FatError::InvalidCluster(cluster)));
                    },
                    Err(e) => return Some(Err(e.into())),
                    _ => (),
                }
                self.state = ChainState::Follow(cluster);
                Some(Ok(cluster))
            },
            ChainState::Follow(cluster) => {
                self.state = ChainState::Done;
                let link = match next_cluster_entry(self.boot, self.partition_offset, cluster, self.source) {
                    Ok(link) => link,
                    Err(e) => return Some(Err(e)),
                };
                if link.end_of_chain {
                    self.terminator = Some(link.cluster);
                    return None;
                }

                self.steps += 1;
                match self.boot.count_of_clusters() {
                    Ok(limit) if self.steps >= limit => return Some(Err(FatError::InvalidCluster(link.cluster))),
                    Err(e) => return Some(Err(e.into())),
                    _ => (),
                }
                self.state = ChainState::Follow(link.cluster);
                Some(Ok(link.cluster))
            },
        }
    }
}

/// A contiguous run of file bytes on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub address: u64,
    pub len: u32,
}

/// The on-disk byte ranges holding the first `len` bytes of the chain at `start_cluster`, one range
/// per cluster.  Ends early if the chain is shorter than `len` claims.
pub struct Extents<'a, S: ByteSource> {
    chain: ClusterChain<'a, S>,
    remaining: u64,
}

impl<'a, S: ByteSource> Extents<'a, S> {
    pub fn new(
        boot: &'a BootSector,
        partition_offset: u64,
        start_cluster: u32,
        len: u64,
        source: &'a mut S,
    ) -> Extents<'a, S> {
        Extents {
            chain: ClusterChain::new(boot, partition_offset, start_cluster, source),
            remaining: len,
        }
    }
}

impl<S: ByteSource> Iterator for Extents<'_, S> {
    type Item = Result<Extent, FatError<S::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let cluster = match self.chain.next()? {
            Ok(cluster) => cluster,
            Err(e) => {
                self.remaining = 0;
                return Some(Err(e));
            },
        };

        let boot = self.chain.boot;
        let address = match boot.cluster_to_address(self.chain.partition_offset, cluster) {
            Some(address) => address,
            None => {
                self.remaining = 0;
                return Some(Err(FatError::InvalidCluster(cluster)));
            },
        };
        let len = min(self.remaining, boot.cluster_size() as u64) as u32;
        self.remaining -= len as u64;
        Some(Ok(Extent { address, len }))
    }
}
