use super::{
    constants::*,
    geometry::GeometryError,
};
use byteorder::{
    ByteOrder,
    LittleEndian,
};

/// Extended BPB of a FAT12/FAT16 volume (the boot sector's tail when `sectors_per_fat_16` is set).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fat16Tail {
    pub drive_number: u8,
    pub boot_signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],
}

/// FAT32-only fields that reuse the region after `total_sectors_32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fat32Tail {
    pub sectors_per_fat_32: u32,
    pub flags: u16,
    pub version: u16,
    pub root_cluster: u32,
    pub fs_info_sector: u16,
    pub backup_boot_sector: u16,
    pub drive_number: u8,
    pub boot_signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootTail {
    Fat16(Fat16Tail),
    Fat32(Fat32Tail),
}

/// The BIOS parameter block of a FAT volume, decoded from the first 512 bytes of the partition.
///
/// Nothing here says which FAT width the volume uses; that comes only from the cluster count (see
/// [`BootSector::fat_type`]).  In particular `fs_type` is a label and is never trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootSector {
    pub oem_name: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_entry_count: u16, // Zero on FAT32
    pub total_sectors_16: u16,
    pub media: u8,
    pub sectors_per_fat_16: u16, // Zero on FAT32
    pub sectors_per_track: u16,
    pub head_count: u16,
    pub hidden_sectors: u32,
    pub total_sectors_32: u32,
    pub tail: BootTail,
}

impl BootSector {
    /// Decodes and validates a boot sector.
    pub fn parse(raw: &[u8; BOOT_SECTOR_SIZE]) -> Result<BootSector, GeometryError> {
        let boot = BootSector::decode(raw);
        boot.validate()?;
        Ok(boot)
    }

    /// Decodes the fields without checking that they describe a usable volume.
    pub fn decode(raw: &[u8; BOOT_SECTOR_SIZE]) -> BootSector {
        let mut oem_name = [0; 8];
        oem_name.copy_from_slice(&raw[3..11]);
        let sectors_per_fat_16 = LittleEndian::read_u16(&raw[22..24]);

        // The 16-bit FAT size is only zero on FAT32, so it decides which layout the tail has
        let tail = if sectors_per_fat_16 == 0 {
            let mut tail = Fat32Tail {
                sectors_per_fat_32: LittleEndian::read_u32(&raw[36..40]),
                flags: LittleEndian::read_u16(&raw[40..42]),
                version: LittleEndian::read_u16(&raw[42..44]),
                root_cluster: LittleEndian::read_u32(&raw[44..48]),
                fs_info_sector: LittleEndian::read_u16(&raw[48..50]),
                backup_boot_sector: LittleEndian::read_u16(&raw[50..52]),
                drive_number: raw[64],
                boot_signature: raw[66],
                volume_id: LittleEndian::read_u32(&raw[67..71]),
                ..Default::default()
            };
            tail.volume_label.copy_from_slice(&raw[71..82]);
            tail.fs_type.copy_from_slice(&raw[82..90]);
            BootTail::Fat32(tail)
        } else {
            let mut tail = Fat16Tail {
                drive_number: raw[36],
                boot_signature: raw[38],
                volume_id: LittleEndian::read_u32(&raw[39..43]),
                ..Default::default()
            };
            tail.volume_label.copy_from_slice(&raw[43..54]);
            tail.fs_type.copy_from_slice(&raw[54..62]);
            BootTail::Fat16(tail)
        };

        BootSector {
            oem_name,
            bytes_per_sector: LittleEndian::read_u16(&raw[11..13]),
            sectors_per_cluster: raw[13],
            reserved_sectors: LittleEndian::read_u16(&raw[14..16]),
            fat_count: raw[16],
            root_entry_count: LittleEndian::read_u16(&raw[17..19]),
            total_sectors_16: LittleEndian::read_u16(&raw[19..21]),
            media: raw[21],
            sectors_per_fat_16,
            sectors_per_track: LittleEndian::read_u16(&raw[24..26]),
            head_count: LittleEndian::read_u16(&raw[26..28]),
            hidden_sectors: LittleEndian::read_u32(&raw[28..32]),
            total_sectors_32: LittleEndian::read_u32(&raw[32..36]),
            tail,
        }
    }

    #[inline(always)]
    pub fn volume_label(&self) -> &[u8; 11] {
        match &self.tail {
            BootTail::Fat16(t) => &t.volume_label,
            BootTail::Fat32(t) => &t.volume_label,
        }
    }

    #[inline(always)]
    pub fn fs_type_label(&self) -> &[u8; 8] {
        match &self.tail {
            BootTail::Fat16(t) => &t.fs_type,
            BootTail::Fat32(t) => &t.fs_type,
        }
    }

    /// First cluster of the root directory on FAT32; zero when the root is the fixed FAT12/16 region.
    #[inline(always)]
    pub fn root_cluster(&self) -> u32 {
        match &self.tail {
            BootTail::Fat16(_) => 0,
            BootTail::Fat32(t) => t.root_cluster,
        }
    }
}
