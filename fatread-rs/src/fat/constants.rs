pub(crate) const MBR_PARTITION_TABLE: usize = 0x1be;
pub(crate) const MBR_PARTITION_ENTRY_SIZE: usize = 16;
pub(crate) const MBR_PARTITION_COUNT: u8 = 4;
pub(crate) const BOOT_SIGNATURE_OFFSET: usize = 0x1fe;
pub(crate) const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xaa];

// Partition table entries are always addressed in 512-byte units, whatever the volume's sector size
pub(crate) const MBR_SECTOR_SIZE: u64 = 512;
pub const BOOT_SECTOR_SIZE: usize = 512;
pub const MIN_SECTOR_SIZE: u16 = 512;
pub const MAX_SECTOR_SIZE: u16 = 4096;

pub const PTYPE_EMPTY: u8 = 0x00;
pub const PTYPE_FAT12: u8 = 0x01;
pub const PTYPE_FAT16: u8 = 0x04;
pub const PTYPE_FAT16_EXTENDED: u8 = 0x06;
pub const PTYPE_FAT32_CHS: u8 = 0x0b;
pub const PTYPE_FAT32_LBA: u8 = 0x0c;
pub const PTYPE_FAT16_LBA: u8 = 0x0e;
pub(crate) const SUPPORTED_PTYPES: [u8; 6] = [
    PTYPE_FAT12,
    PTYPE_FAT16,
    PTYPE_FAT16_EXTENDED,
    PTYPE_FAT32_CHS,
    PTYPE_FAT32_LBA,
    PTYPE_FAT16_LBA,
];

pub(crate) const FAT12_MAX_CLUSTERS: u32 = 4085;
pub(crate) const FAT16_MAX_CLUSTERS: u32 = 65525;
pub(crate) const FAT12_EOC: u32 = 0x0ff8;
pub(crate) const FAT16_EOC: u32 = 0xfff8;
pub(crate) const FAT32_EOC: u32 = 0x0fff_fff8;
pub(crate) const FAT32_ENTRY_MASK: u32 = 0x0fff_ffff;
pub(crate) const FIRST_DATA_CLUSTER: u32 = 2;

pub(crate) const DIR_ENTRY_SIZE: usize = 32;
pub(crate) const ENTRY_END: u8 = 0x00;
pub(crate) const ENTRY_DELETED: u8 = 0xe5;
// A leading 0xe5 in a live name is stored as 0x05
pub(crate) const ENTRY_KANJI_E5: u8 = 0x05;

pub const DIRENT_ATTR_RO: u8 = 0x01;
pub const DIRENT_ATTR_HIDDEN: u8 = 0x02;
pub const DIRENT_ATTR_SYSTEM: u8 = 0x04;
pub const DIRENT_ATTR_VOLUME_LABEL: u8 = 0x08;
pub const DIRENT_ATTR_SUBDIR: u8 = 0x10;
pub const DIRENT_ATTR_ARCHIVE: u8 = 0x20;
pub const DIRENT_ATTR_LONG_NAME: u8 =
    DIRENT_ATTR_RO | DIRENT_ATTR_HIDDEN | DIRENT_ATTR_SYSTEM | DIRENT_ATTR_VOLUME_LABEL;

pub(crate) const LFN_LAST_ENTRY: u8 = 0x40;
pub(crate) const LFN_ORDINAL_MASK: u8 = 0x1f;
pub(crate) const LFN_CHARS_PER_ENTRY: usize = 13;
pub(crate) const LFN_MAX_ENTRIES: usize = 20;
pub const MAX_LFN_LEN: usize = 255;

pub(crate) const SPACE: u8 = b' ';
pub(crate) const DOT: u8 = b'.';
