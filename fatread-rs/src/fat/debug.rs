use super::{
    boot::BootSector,
    dir_entry::DirEntry,
    geometry::{
        FatType,
        GeometryError,
    },
    mbr::{
        MbrPartition,
        PartitionInfo,
    },
    name::format_short_name,
    FatError,
};
use crate::hexfmt::{
    hexfmt,
    hexfmt32,
};
use ufmt::{
    uDebug,
    uWrite,
    uwrite,
    Formatter,
};


pub fn ptype_write<W>(out: &mut Formatter<W>, ptype: u8) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    match ptype {
        0x00 => uwrite!(out, "Empty")?,
        0x01 => uwrite!(out, "FAT12")?,
        0x04 => uwrite!(out, "FAT16 (< 32M)")?,
        0x06 => uwrite!(out, "FAT16")?,
        0x07 => uwrite!(out, "NTFS")?,
        0x0b => uwrite!(out, "FAT32 + CHS")?,
        0x0c => uwrite!(out, "FAT32 + LBA")?,
        0x0e => uwrite!(out, "FAT16 + LBA")?,
        0x0f => uwrite!(out, "Extended Partition + LBA")?,
        0x82 => uwrite!(out, "Linux Swap Space")?,
        0x83 => uwrite!(out, "Linux File System")?,
        _ => uwrite!(out, "Unknown ({})", ptype)?,
    };
    Ok(())
}

fn label_write<W>(out: &mut Formatter<W>, label: &[u8]) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    for &c in label {
        out.write_char(if c.is_ascii_graphic() || c == b' ' { c as char } else { '?' })?;
    }
    Ok(())
}

impl uDebug for MbrPartition {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(out, "  is_boot = {}; partition_type = ", self.boot)?;
        ptype_write(out, self.ptype)?;
        uwrite!(
            out,
            "; begin_chs = {}/{}/{}; end_chs = {}/{}/{}; start_sector = ",
            self.begin_chs[0],
            self.begin_chs[1],
            self.begin_chs[2],
            self.end_chs[0],
            self.end_chs[1],
            self.end_chs[2]
        )?;
        hexfmt32(out, self.start_sector)?;
        uwrite!(out, ", length = ")?;
        hexfmt32(out, self.total_sectors)?;
        out.write_char('\n')?;
        Ok(())
    }
}

impl uDebug for PartitionInfo {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(out, "partition {} at ", self.slot)?;
        hexfmt(out, self.offset, 8)?;
        out.write_char('\n')?;
        uDebug::fmt(&self.entry, out)?;
        uDebug::fmt(&self.boot, out)
    }
}

impl uDebug for BootSector {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(out, "  oem name:            ")?;
        label_write(out, &self.oem_name)?;
        out.write_char('\n')?;
        uwrite!(out, "  bytes per sector:    {}\n", self.bytes_per_sector)?;
        uwrite!(out, "  sectors per cluster: {}\n", self.sectors_per_cluster)?;
        uwrite!(out, "  reserved sectors:    {}\n", self.reserved_sectors)?;
        uwrite!(out, "  fat count:           {}\n", self.fat_count)?;
        uwrite!(out, "  root entry count:    {}\n", self.root_entry_count)?;
        uwrite!(out, "  sectors per fat:     ")?;
        hexfmt32(out, self.sectors_per_fat())?;
        out.write_char('\n')?;
        uwrite!(out, "  total sectors:       ")?;
        hexfmt32(out, self.count_of_sectors())?;
        out.write_char('\n')?;
        uwrite!(out, "  first data sector:   ")?;
        hexfmt32(out, self.first_data_sector())?;
        out.write_char('\n')?;
        match self.count_of_clusters() {
            Ok(clusters) => {
                uwrite!(out, "  data cluster count:  ")?;
                hexfmt32(out, clusters)?;
                out.write_char('\n')?;
            },
            Err(e) => uwrite!(out, "  data cluster count:  {:?}\n", e)?,
        }
        if let Ok(fat_type) = self.fat_type() {
            uwrite!(out, "  fat type:            {:?}\n", fat_type)?;
        }
        uwrite!(out, "  root cluster:        ")?;
        hexfmt32(out, self.root_cluster())?;
        out.write_char('\n')?;
        uwrite!(out, "  volume label:        ")?;
        label_write(out, self.volume_label())?;
        out.write_char('\n')?;
        Ok(())
    }
}

impl uDebug for FatType {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        out.write_str(self.name())
    }
}

impl uDebug for GeometryError {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            GeometryError::BadBytesPerSector(n) => uwrite!(out, "BadBytesPerSector({})", *n),
            GeometryError::BadSectorsPerCluster(n) => uwrite!(out, "BadSectorsPerCluster({})", *n),
            GeometryError::NoFats => out.write_str("NoFats"),
            GeometryError::NoSectorsPerFat => out.write_str("NoSectorsPerFat"),
            GeometryError::NoTotalSectors => out.write_str("NoTotalSectors"),
            GeometryError::ClusterCountUnderflow => out.write_str("ClusterCountUnderflow"),
            GeometryError::NoClusters => out.write_str("NoClusters"),
            GeometryError::FatTooSmall => out.write_str("FatTooSmall"),
        }
    }
}

impl uDebug for DirEntry {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        out.write_str(format_short_name(self.name(), self.extension()).as_str())?;
        uwrite!(out, " attr = ")?;
        hexfmt(out, self.attributes() as u64, 2)?;
        uwrite!(out, ", cluster = ")?;
        hexfmt32(out, self.first_cluster())?;
        uwrite!(out, ", size = {}", self.size())
    }
}

impl<E: uDebug> uDebug for FatError<E> {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            FatError::BlockDeviceFailed(e) => uwrite!(out, "BlockDeviceFailed({:?})", e),
            FatError::InvalidGeometry(e) => uwrite!(out, "InvalidGeometry({:?})", e),
            FatError::InvalidCluster(c) => {
                uwrite!(out, "InvalidCluster(")?;
                hexfmt32(out, *c)?;
                out.write_char(')')
            },
            FatError::CorruptMbr => out.write_str("CorruptMbr"),
            FatError::NoPartition => out.write_str("NoPartition"),
            FatError::NotADirectory => out.write_str("NotADirectory"),
            FatError::FileNotFound => out.write_str("FileNotFound"),
        }
    }
}
