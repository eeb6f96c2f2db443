use super::{
    boot::BootSector,
    constants::*,
    FatError,
};
use crate::source::ByteSource;
use byteorder::{
    ByteOrder,
    LittleEndian,
};
use log::debug;

/// Where the boot sector lives.  The caller has to know; a partition offset of zero can't tell the
/// two cases apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Sector 0 is an MBR; use the first supported partition.
    WithPartitionTable,
    /// Sector 0 is the volume's boot sector.
    Raw,
}

/// One of the four 16-byte slots of the MBR partition table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MbrPartition {
    pub boot: u8,
    pub begin_chs: [u8; 3],
    pub ptype: u8,
    pub end_chs: [u8; 3],
    pub start_sector: u32, // In 512-byte units
    pub total_sectors: u32,
}

impl MbrPartition {
    fn decode(raw: &[u8]) -> MbrPartition {
        let mut part = MbrPartition {
            boot: raw[0],
            ptype: raw[4],
            start_sector: LittleEndian::read_u32(&raw[8..12]),
            total_sectors: LittleEndian::read_u32(&raw[12..16]),
            ..Default::default()
        };
        part.begin_chs.copy_from_slice(&raw[1..4]);
        part.end_chs.copy_from_slice(&raw[5..8]);
        part
    }

    /// Absolute byte offset of the partition's boot sector.
    #[inline(always)]
    pub fn offset(&self) -> u64 {
        self.start_sector as u64 * MBR_SECTOR_SIZE
    }
}

/// A supported partition, together with the boot sector found at its start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionInfo {
    pub slot: u8,
    pub entry: MbrPartition,
    pub offset: u64,
    pub boot: BootSector,
}

#[inline(always)]
pub fn is_supported_ptype(ptype: u8) -> bool {
    SUPPORTED_PTYPES.contains(&ptype)
}

pub fn read_partition_table<S: ByteSource>(
    source: &mut S,
) -> Result<[MbrPartition; MBR_PARTITION_COUNT as usize], FatError<S::Error>> {
    let mut raw = [0u8; BOOT_SECTOR_SIZE];
    source.fetch(0, &mut raw).map_err(FatError::BlockDeviceFailed)?;
    if raw[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2] != BOOT_SIGNATURE {
        return Err(FatError::CorruptMbr);
    }

    let mut table = [MbrPartition::default(); MBR_PARTITION_COUNT as usize];
    for (i, part) in table.iter_mut().enumerate() {
        let start = MBR_PARTITION_TABLE + i * MBR_PARTITION_ENTRY_SIZE;
        *part = MbrPartition::decode(&raw[start..start + MBR_PARTITION_ENTRY_SIZE]);
    }
    Ok(table)
}

/// Walks the MBR partition table one supported partition per call.
///
/// Each pass over the table returns every supported partition exactly once, in slot order, and
/// then `None`; the `None` also rewinds the cursor so the next call starts a fresh pass.  Cursors
/// are independent of each other, so interleaved enumerations need one each.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartitionCursor {
    slot: u8,
}

impl PartitionCursor {
    pub fn new() -> PartitionCursor {
        PartitionCursor { slot: 0 }
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        self.slot = 0;
    }

    /// Index of the slot the next call will look at first.
    #[inline(always)]
    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn next_partition<S: ByteSource>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<PartitionInfo>, FatError<S::Error>> {
        let table = read_partition_table(source)?;

        while self.slot < MBR_PARTITION_COUNT {
            let slot = self.slot;
            let entry = table[slot as usize];
            if !is_supported_ptype(entry.ptype) {
                debug!("partition slot {}: type {:#04x} not supported, skipping", slot, entry.ptype);
                self.slot += 1;
                continue;
            }

            let offset = entry.offset();
            let mut raw = [0u8; BOOT_SECTOR_SIZE];
            source.fetch(offset, &mut raw).map_err(FatError::BlockDeviceFailed)?;
            self.slot += 1;
            debug!("partition slot {}: type {:#04x} at offset {:#x}", slot, entry.ptype, offset);
            return Ok(Some(PartitionInfo {
                slot,
                entry,
                offset,
                boot: BootSector::decode(&raw),
            }));
        }

        self.reset();
        Ok(None)
    }
}
