use super::{
    boot::{
        BootSector,
        BootTail,
    },
    constants::*,
};
use core::fmt;

/// FAT entry width, derived from the number of data clusters and nothing else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FatType {
    Fat12,
    Fat16,
    Fat32,
}

impl FatType {
    pub fn from_cluster_count(clusters: u32) -> FatType {
        if clusters < FAT12_MAX_CLUSTERS {
            FatType::Fat12
        } else if clusters < FAT16_MAX_CLUSTERS {
            FatType::Fat16
        } else {
            FatType::Fat32
        }
    }

    /// Smallest FAT entry value that marks the end of a cluster chain.
    #[inline(always)]
    pub fn end_of_chain(self) -> u32 {
        match self {
            FatType::Fat12 => FAT12_EOC,
            FatType::Fat16 => FAT16_EOC,
            FatType::Fat32 => FAT32_EOC,
        }
    }

    #[inline(always)]
    pub fn name(self) -> &'static str {
        match self {
            FatType::Fat12 => "FAT12",
            FatType::Fat16 => "FAT16",
            FatType::Fat32 => "FAT32",
        }
    }

    /// Hex digits needed to print one FAT entry.
    #[inline(always)]
    pub fn entry_digits(self) -> usize {
        match self {
            FatType::Fat12 => 3,
            FatType::Fat16 => 4,
            FatType::Fat32 => 7,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryError {
    BadBytesPerSector(u16),
    BadSectorsPerCluster(u8),
    NoFats,
    NoSectorsPerFat,
    NoTotalSectors,
    ClusterCountUnderflow,
    NoClusters,
    FatTooSmall,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::BadBytesPerSector(n) => write!(f, "unsupported bytes per sector: {}", n),
            GeometryError::BadSectorsPerCluster(n) => write!(f, "unsupported sectors per cluster: {}", n),
            GeometryError::NoFats => write!(f, "boot sector declares no FATs"),
            GeometryError::NoSectorsPerFat => write!(f, "boot sector declares an empty FAT"),
            GeometryError::NoTotalSectors => write!(f, "boot sector declares no sectors"),
            GeometryError::ClusterCountUnderflow => write!(f, "metadata regions are larger than the volume"),
            GeometryError::NoClusters => write!(f, "volume has no data clusters"),
            GeometryError::FatTooSmall => write!(f, "FAT is too small for the cluster count"),
        }
    }
}

impl BootSector {
    #[inline(always)]
    pub fn sectors_per_fat(&self) -> u32 {
        if self.sectors_per_fat_16 != 0 {
            return self.sectors_per_fat_16 as u32;
        }
        match &self.tail {
            BootTail::Fat32(t) => t.sectors_per_fat_32,
            BootTail::Fat16(_) => 0,
        }
    }

    /// Size in bytes of all FAT copies together.
    pub fn total_fat_size(&self) -> u64 {
        self.sectors_per_fat() as u64 * self.fat_count as u64 * self.bytes_per_sector as u64
    }

    /// Sectors taken by the fixed FAT12/16 root directory; zero on FAT32.
    pub fn root_dir_sectors(&self) -> u32 {
        let bps = self.bytes_per_sector as u32;
        if bps == 0 {
            return 0;
        }
        (self.root_entry_count as u32 * DIR_ENTRY_SIZE as u32 + bps - 1) / bps
    }

    /// First sector after the FATs.  On FAT12/16 this is where the root directory region starts; the
    /// root directory sectors are added separately when a data cluster is addressed.
    pub fn first_data_sector(&self) -> u32 {
        (self.fat_count as u32)
            .saturating_mul(self.sectors_per_fat())
            .saturating_add(self.reserved_sectors as u32)
    }

    /// `None` for the reserved clusters 0 and 1.
    pub fn first_sector_of_cluster(&self, cluster: u32) -> Option<u32> {
        if cluster < FIRST_DATA_CLUSTER {
            return None;
        }
        (cluster - FIRST_DATA_CLUSTER)
            .checked_mul(self.sectors_per_cluster as u32)?
            .checked_add(self.first_data_sector())
    }

    #[inline(always)]
    pub fn count_of_sectors(&self) -> u32 {
        if self.total_sectors_16 != 0 {
            self.total_sectors_16 as u32
        } else {
            self.total_sectors_32
        }
    }

    pub fn count_of_clusters(&self) -> Result<u32, GeometryError> {
        self.check_units()?;
        let metadata = self.first_data_sector() as u64 + self.root_dir_sectors() as u64;
        let data_sectors = (self.count_of_sectors() as u64)
            .checked_sub(metadata)
            .ok_or(GeometryError::ClusterCountUnderflow)?;
        Ok((data_sectors / self.sectors_per_cluster as u64) as u32)
    }

    pub fn fat_type(&self) -> Result<FatType, GeometryError> {
        Ok(FatType::from_cluster_count(self.count_of_clusters()?))
    }

    /// Highest cluster number that has an entry in the FAT.
    pub fn max_cluster(&self) -> Result<u32, GeometryError> {
        Ok(self.count_of_clusters()?.saturating_add(1))
    }

    /// Bytes one FAT copy needs to hold an entry for every cluster up to [`BootSector::max_cluster`].
    pub fn fat_bytes_needed(&self) -> Result<u64, GeometryError> {
        let entries = self.max_cluster()? as u64 + 1;
        Ok(match self.fat_type()? {
            FatType::Fat12 => (entries * 3 + 1) / 2,
            FatType::Fat16 => entries * 2,
            FatType::Fat32 => entries * 4,
        })
    }

    #[inline(always)]
    pub fn sector_to_address(&self, partition_offset: u64, sector: u32) -> u64 {
        self.bytes_per_sector as u64 * sector as u64 + partition_offset
    }

    /// Absolute address of a data cluster, skipping the fixed root directory region if there is one.
    pub fn cluster_to_address(&self, partition_offset: u64, cluster: u32) -> Option<u64> {
        let sector = self.first_sector_of_cluster(cluster)?.checked_add(self.root_dir_sectors())?;
        Some(self.sector_to_address(partition_offset, sector))
    }

    /// Where the fixed FAT12/16 root directory starts.  Only meaningful when `root_entry_count` is set.
    #[inline(always)]
    pub fn root_dir_address(&self, partition_offset: u64) -> u64 {
        self.sector_to_address(partition_offset, self.first_data_sector())
    }

    #[inline(always)]
    pub fn cluster_size(&self) -> u32 {
        self.bytes_per_sector as u32 * self.sectors_per_cluster as u32
    }

    #[inline(always)]
    pub fn entries_per_cluster(&self) -> u32 {
        self.cluster_size() / DIR_ENTRY_SIZE as u32
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        self.check_units()?;
        if self.fat_count == 0 {
            return Err(GeometryError::NoFats);
        } else if self.sectors_per_fat() == 0 {
            return Err(GeometryError::NoSectorsPerFat);
        } else if self.count_of_sectors() == 0 {
            return Err(GeometryError::NoTotalSectors);
        } else if self.count_of_clusters()? == 0 {
            return Err(GeometryError::NoClusters);
        }
        let fat_bytes = self.sectors_per_fat() as u64 * self.bytes_per_sector as u64;
        if fat_bytes < self.fat_bytes_needed()? {
            return Err(GeometryError::FatTooSmall);
        }
        Ok(())
    }

    // Everything else divides by these two
    fn check_units(&self) -> Result<(), GeometryError> {
        let bps = self.bytes_per_sector;
        if !bps.is_power_of_two() || bps < MIN_SECTOR_SIZE || bps > MAX_SECTOR_SIZE {
            return Err(GeometryError::BadBytesPerSector(bps));
        } else if !self.sectors_per_cluster.is_power_of_two() {
            return Err(GeometryError::BadSectorsPerCluster(self.sectors_per_cluster));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fat::boot::{
        Fat16Tail,
        Fat32Tail,
    };

    fn boot(spc: u8, root_entries: u16, total: u16, spf: u16) -> BootSector {
        BootSector {
            oem_name: *b"mkfs.fat",
            bytes_per_sector: 512,
            sectors_per_cluster: spc,
            reserved_sectors: 1,
            fat_count: 2,
            root_entry_count: root_entries,
            total_sectors_16: total,
            media: 0xf8,
            sectors_per_fat_16: spf,
            sectors_per_track: 32,
            head_count: 2,
            hidden_sectors: 0,
            total_sectors_32: 0,
            tail: BootTail::Fat16(Fat16Tail::default()),
        }
    }

    #[test]
    fn first_data_cluster_follows_the_fats() {
        let b = boot(4, 512, 60000, 100);
        assert_eq!(b.first_data_sector(), 201);
        assert_eq!(b.first_sector_of_cluster(2), Some(201));
        assert_eq!(b.first_sector_of_cluster(3), Some(205));
        assert_eq!(b.first_sector_of_cluster(1), None);
        assert_eq!(b.first_sector_of_cluster(0), None);
    }

    #[test]
    fn data_clusters_skip_the_root_region() {
        let b = boot(4, 512, 60000, 100);
        assert_eq!(b.root_dir_sectors(), 32);
        assert_eq!(b.root_dir_address(0), 201 * 512);
        assert_eq!(b.cluster_to_address(0, 2), Some(233 * 512));
        assert_eq!(b.cluster_to_address(0x10_0000, 3), Some(237 * 512 + 0x10_0000));
        assert_eq!(b.cluster_to_address(0, 1), None);
    }

    #[test]
    fn derived_sizes() {
        let b = boot(4, 512, 60000, 100);
        assert_eq!(b.sectors_per_fat(), 100);
        assert_eq!(b.total_fat_size(), 100 * 2 * 512);
        assert_eq!(b.count_of_sectors(), 60000);
        assert_eq!(b.count_of_clusters(), Ok((60000 - 201 - 32) / 4));
        assert_eq!(b.cluster_size(), 2048);
        assert_eq!(b.entries_per_cluster(), 64);
        assert_eq!(b.sector_to_address(1024, 3), 3 * 512 + 1024);
    }

    #[test]
    fn root_dir_sectors_round_up() {
        assert_eq!(boot(1, 16, 2880, 9).root_dir_sectors(), 1);
        assert_eq!(boot(1, 17, 2880, 9).root_dir_sectors(), 2);
        assert_eq!(boot(1, 0, 2880, 9).root_dir_sectors(), 0);
    }

    #[test]
    fn type_thresholds_partition_the_cluster_counts() {
        assert_eq!(FatType::from_cluster_count(0), FatType::Fat12);
        assert_eq!(FatType::from_cluster_count(4084), FatType::Fat12);
        assert_eq!(FatType::from_cluster_count(4085), FatType::Fat16);
        assert_eq!(FatType::from_cluster_count(65524), FatType::Fat16);
        assert_eq!(FatType::from_cluster_count(65525), FatType::Fat32);
        assert_eq!(FatType::from_cluster_count(u32::MAX), FatType::Fat32);

        // Monotonic: the type never gets narrower as the count grows
        let mut prev = FatType::Fat12;
        for n in (0..200_000u32).step_by(7) {
            let t = FatType::from_cluster_count(n);
            assert!(t >= prev);
            prev = t;
        }
    }

    #[test]
    fn fat_type_of_a_floppy() {
        // 1.44M floppy: 2847 clusters
        assert_eq!(boot(1, 224, 2880, 9).fat_type(), Ok(FatType::Fat12));
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        assert_eq!(boot(1, 224, 20, 9).count_of_clusters(), Err(GeometryError::ClusterCountUnderflow));
        assert_eq!(boot(0, 224, 2880, 9).fat_type(), Err(GeometryError::BadSectorsPerCluster(0)));
        assert_eq!(boot(3, 224, 2880, 9).validate(), Err(GeometryError::BadSectorsPerCluster(3)));

        let mut b = boot(1, 224, 2880, 9);
        b.bytes_per_sector = 0;
        assert_eq!(b.count_of_clusters(), Err(GeometryError::BadBytesPerSector(0)));
        assert_eq!(b.root_dir_sectors(), 0);

        let mut b = boot(1, 224, 2880, 9);
        b.fat_count = 0;
        assert_eq!(b.validate(), Err(GeometryError::NoFats));

        // Exactly fills the metadata: no room for a single cluster
        assert_eq!(boot(1, 16, 20, 9).validate(), Err(GeometryError::NoClusters));
    }

    #[test]
    fn fat_must_cover_every_cluster() {
        // Floppy: 2849 twelve-bit entries fit in 9 sectors, but not in 8
        let b = boot(1, 224, 2880, 9);
        assert_eq!(b.fat_bytes_needed(), Ok(4274));
        assert_eq!(b.validate(), Ok(()));
        assert_eq!(boot(1, 224, 2880, 8).validate(), Err(GeometryError::FatTooSmall));

        // One FAT32 sector against a total sector count near the top of the range
        let mut b = boot(1, 0, 0, 0);
        b.fat_count = 1;
        b.total_sectors_32 = 0xffff_fff0;
        b.tail = BootTail::Fat32(Fat32Tail {
            sectors_per_fat_32: 1,
            root_cluster: 2,
            ..Fat32Tail::default()
        });
        assert_eq!(b.count_of_clusters(), Ok(0xffff_ffee));
        assert_eq!(b.fat_type(), Ok(FatType::Fat32));
        assert_eq!(b.validate(), Err(GeometryError::FatTooSmall));
    }
}
