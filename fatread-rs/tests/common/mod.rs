//! Synthetic disk images for the integration tests.
#![allow(dead_code)]

use fatread_rs::{
    fat::BootSector,
    source::{
        ByteSource,
        OutOfRange,
    },
};
use std::collections::BTreeMap;

pub const SECTOR: u64 = 512;

/// A disk image that only stores the sectors that were written; everything else reads as zeros.
pub struct SparseImage {
    sectors: BTreeMap<u64, [u8; SECTOR as usize]>,
    size: u64,
    pub fetches: usize,
    pub failing: bool,
}

impl SparseImage {
    pub fn new(size: u64) -> SparseImage {
        SparseImage { sectors: BTreeMap::new(), size, fetches: 0, failing: false }
    }

    pub fn write(&mut self, address: u64, data: &[u8]) {
        for (i, &b) in data.iter().enumerate() {
            let at = address + i as u64;
            let sector = self.sectors.entry(at / SECTOR).or_insert([0; SECTOR as usize]);
            sector[(at % SECTOR) as usize] = b;
        }
    }

    pub fn read_byte(&self, address: u64) -> u8 {
        self.sectors.get(&(address / SECTOR)).map_or(0, |s| s[(address % SECTOR) as usize])
    }
}

impl ByteSource for SparseImage {
    type Error = OutOfRange;

    fn fetch(&mut self, address: u64, buf: &mut [u8]) -> Result<(), OutOfRange> {
        self.fetches += 1;
        if self.failing || address + buf.len() as u64 > self.size {
            return Err(OutOfRange { address, len: buf.len() });
        }
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read_byte(address + i as u64);
        }
        Ok(())
    }
}

/// The handful of BPB fields the tests care about.
#[derive(Clone, Copy, Debug)]
pub struct Geometry {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_entry_count: u16,
    pub total_sectors: u32,
    pub sectors_per_fat: u32,
    pub fat32: bool,
    pub root_cluster: u32,
}

impl Geometry {
    /// 1.44M floppy: 2847 clusters, FAT12.
    pub fn fat12() -> Geometry {
        Geometry {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            fat_count: 2,
            root_entry_count: 224,
            total_sectors: 2880,
            sectors_per_fat: 9,
            fat32: false,
            root_cluster: 0,
        }
    }

    /// 9971 clusters of 2K, FAT16.
    pub fn fat16() -> Geometry {
        Geometry {
            bytes_per_sector: 512,
            sectors_per_cluster: 4,
            reserved_sectors: 4,
            fat_count: 2,
            root_entry_count: 512,
            total_sectors: 40000,
            sectors_per_fat: 40,
            fat32: false,
            root_cluster: 0,
        }
    }

    /// 68768 clusters of 512 bytes, FAT32, root directory in cluster 2.
    pub fn fat32() -> Geometry {
        Geometry {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 32,
            fat_count: 2,
            root_entry_count: 0,
            total_sectors: 70000,
            sectors_per_fat: 600,
            fat32: true,
            root_cluster: 2,
        }
    }

    pub fn boot_sector(&self) -> [u8; 512] {
        let mut raw = [0u8; 512];
        raw[0..3].copy_from_slice(&[0xeb, 0x3c, 0x90]);
        raw[3..11].copy_from_slice(b"MSWIN4.1");
        raw[11..13].copy_from_slice(&self.bytes_per_sector.to_le_bytes());
        raw[13] = self.sectors_per_cluster;
        raw[14..16].copy_from_slice(&self.reserved_sectors.to_le_bytes());
        raw[16] = self.fat_count;
        raw[17..19].copy_from_slice(&self.root_entry_count.to_le_bytes());
        if !self.fat32 && self.total_sectors < 0x10000 {
            raw[19..21].copy_from_slice(&(self.total_sectors as u16).to_le_bytes());
        } else {
            raw[32..36].copy_from_slice(&self.total_sectors.to_le_bytes());
        }
        raw[21] = 0xf8;
        if self.fat32 {
            raw[36..40].copy_from_slice(&self.sectors_per_fat.to_le_bytes());
            raw[44..48].copy_from_slice(&self.root_cluster.to_le_bytes());
            raw[48..50].copy_from_slice(&1u16.to_le_bytes());
            raw[50..52].copy_from_slice(&6u16.to_le_bytes());
            raw[66] = 0x29;
            raw[71..82].copy_from_slice(b"TESTVOL    ");
            raw[82..90].copy_from_slice(b"FAT32   ");
        } else {
            raw[22..24].copy_from_slice(&(self.sectors_per_fat as u16).to_le_bytes());
            raw[38] = 0x29;
            raw[43..54].copy_from_slice(b"TESTVOL    ");
            raw[54..62].copy_from_slice(b"FAT     ");
        }
        raw[510] = 0x55;
        raw[511] = 0xaa;
        raw
    }

    pub fn decode(&self) -> BootSector {
        BootSector::decode(&self.boot_sector())
    }

    fn root_dir_sectors(&self) -> u64 {
        (self.root_entry_count as u64 * 32 + self.bytes_per_sector as u64 - 1) / self.bytes_per_sector as u64
    }

    fn fat_start(&self) -> u64 {
        self.reserved_sectors as u64 * self.bytes_per_sector as u64
    }

    /// Start of the fixed root region (FAT12/16).
    pub fn root_offset(&self) -> u64 {
        (self.reserved_sectors as u64 + self.fat_count as u64 * self.sectors_per_fat as u64)
            * self.bytes_per_sector as u64
    }

    pub fn cluster_offset(&self, cluster: u32) -> u64 {
        self.root_offset()
            + (self.root_dir_sectors() + (cluster as u64 - 2) * self.sectors_per_cluster as u64)
                * self.bytes_per_sector as u64
    }

    pub fn cluster_size(&self) -> u64 {
        self.bytes_per_sector as u64 * self.sectors_per_cluster as u64
    }

    pub fn image_size(&self) -> u64 {
        self.total_sectors as u64 * self.bytes_per_sector as u64
    }
}

/// A volume laid out inside a [`SparseImage`] at `offset`.
pub struct Fixture {
    pub geometry: Geometry,
    pub offset: u64,
    pub image: SparseImage,
}

impl Fixture {
    /// A bare volume starting at address 0.
    pub fn raw(geometry: Geometry) -> Fixture {
        Fixture::at(geometry, 0, geometry.image_size())
    }

    /// A volume inside partition slot 0 of an MBR, starting at `start_sector`.
    pub fn partitioned(geometry: Geometry, ptype: u8, start_sector: u32) -> Fixture {
        let offset = start_sector as u64 * SECTOR;
        let mut fixture = Fixture::at(geometry, offset, offset + geometry.image_size());
        let mut mbr = Mbr::new();
        mbr.set(0, ptype, start_sector, geometry.total_sectors);
        fixture.image.write(0, &mbr.0);
        fixture
    }

    fn at(geometry: Geometry, offset: u64, size: u64) -> Fixture {
        let mut image = SparseImage::new(size);
        image.write(offset, &geometry.boot_sector());
        let mut fixture = Fixture { geometry, offset, image };
        // Media descriptor and end-of-chain in the two reserved entries
        let (media, eoc) = match fixture.width() {
            12 => (0xff8, 0xfff),
            16 => (0xfff8, 0xffff),
            _ => (0x0fff_fff8, 0x0fff_ffff),
        };
        fixture.set_fat(0, media);
        fixture.set_fat(1, eoc);
        if geometry.fat32 {
            fixture.set_fat(geometry.root_cluster, 0x0fff_ffff);
        }
        fixture
    }

    pub fn width(&self) -> u32 {
        if self.geometry.fat32 {
            32
        } else {
            let g = &self.geometry;
            let data = g.total_sectors as u64 - g.root_offset() / g.bytes_per_sector as u64 - g.root_dir_sectors();
            if data / (g.sectors_per_cluster as u64) < 4085 {
                12
            } else {
                16
            }
        }
    }

    pub fn end_of_chain(&self) -> u32 {
        match self.width() {
            12 => 0xfff,
            16 => 0xffff,
            _ => 0x0fff_ffff,
        }
    }

    /// Writes one FAT entry into every FAT copy.
    pub fn set_fat(&mut self, cluster: u32, value: u32) {
        let g = self.geometry;
        for copy in 0..g.fat_count as u64 {
            let fat = self.offset + g.fat_start() + copy * g.sectors_per_fat as u64 * g.bytes_per_sector as u64;
            match self.width() {
                12 => {
                    let at = fat + (cluster + cluster / 2) as u64;
                    let lo = self.image.read_byte(at);
                    let hi = self.image.read_byte(at + 1);
                    let (lo, hi) = if cluster & 1 == 1 {
                        ((lo & 0x0f) | ((value << 4) as u8), (value >> 4) as u8)
                    } else {
                        (value as u8, (hi & 0xf0) | ((value >> 8) as u8 & 0x0f))
                    };
                    self.image.write(at, &[lo, hi]);
                },
                16 => self.image.write(fat + cluster as u64 * 2, &(value as u16).to_le_bytes()),
                _ => self.image.write(fat + cluster as u64 * 4, &value.to_le_bytes()),
            }
        }
    }

    /// Links `clusters` into one chain ending in end-of-chain.
    pub fn chain(&mut self, clusters: &[u32]) {
        for pair in clusters.windows(2) {
            self.set_fat(pair[0], pair[1]);
        }
        if let Some(&last) = clusters.last() {
            let eoc = self.end_of_chain();
            self.set_fat(last, eoc);
        }
    }

    pub fn cluster_address(&self, cluster: u32) -> u64 {
        self.offset + self.geometry.cluster_offset(cluster)
    }

    /// Address of slot `index` of a directory.  `dir_cluster` 0 is the fixed root region, any other
    /// value is a single directory cluster.
    pub fn slot_address(&self, dir_cluster: u32, index: u64) -> u64 {
        let base = if dir_cluster == 0 {
            self.offset + self.geometry.root_offset()
        } else {
            self.cluster_address(dir_cluster)
        };
        base + index * 32
    }

    /// Writes directory slots starting at slot `first` of the directory.
    pub fn write_slots(&mut self, dir_cluster: u32, first: u64, slots: &[[u8; 32]]) {
        for (i, slot) in slots.iter().enumerate() {
            let at = self.slot_address(dir_cluster, first + i as u64);
            self.image.write(at, slot);
        }
    }

    pub fn boot(&self) -> BootSector {
        self.geometry.decode()
    }
}

/// A 512-byte MBR with a valid signature and four empty slots.
pub struct Mbr(pub [u8; 512]);

impl Mbr {
    pub fn new() -> Mbr {
        let mut raw = [0u8; 512];
        raw[510] = 0x55;
        raw[511] = 0xaa;
        Mbr(raw)
    }

    pub fn set(&mut self, slot: usize, ptype: u8, start_sector: u32, total_sectors: u32) {
        let at = 0x1be + slot * 16;
        self.0[at + 4] = ptype;
        self.0[at + 8..at + 12].copy_from_slice(&start_sector.to_le_bytes());
        self.0[at + 12..at + 16].copy_from_slice(&total_sectors.to_le_bytes());
    }
}

pub const ATTR_DIR: u8 = 0x10;
pub const ATTR_ARCHIVE: u8 = 0x20;
pub const ATTR_VOLUME: u8 = 0x08;

/// An 8.3 entry; `short` is the packed, space-padded 11-byte name.
pub fn short_entry(short: &[u8; 11], attributes: u8, cluster: u32, size: u32) -> [u8; 32] {
    let mut raw = [0u8; 32];
    raw[0..11].copy_from_slice(short);
    raw[11] = attributes;
    raw[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
    raw[26..28].copy_from_slice(&(cluster as u16).to_le_bytes());
    raw[28..32].copy_from_slice(&size.to_le_bytes());
    raw
}

pub fn deleted(mut raw: [u8; 32]) -> [u8; 32] {
    raw[0] = 0xe5;
    raw
}

pub fn lfn_checksum(short: &[u8; 11]) -> u8 {
    short.iter().fold(0u8, |sum, &c| sum.rotate_right(1).wrapping_add(c))
}

/// The LFN fragments for `long`, in on-disk order (highest ordinal first), checksummed against
/// `short`.
pub fn lfn_entries(long: &str, short: &[u8; 11]) -> Vec<[u8; 32]> {
    let units: Vec<u16> = long.encode_utf16().collect();
    let count = (units.len() + 12) / 13;
    let checksum = lfn_checksum(short);
    let mut out = Vec::new();
    for ordinal in (1..=count).rev() {
        let mut chars = [0xffffu16; 13];
        let start = (ordinal - 1) * 13;
        for (i, c) in chars.iter_mut().enumerate() {
            if start + i < units.len() {
                *c = units[start + i];
            } else if start + i == units.len() {
                *c = 0;
            }
        }
        let mut raw = [0u8; 32];
        raw[0] = ordinal as u8 | if ordinal == count { 0x40 } else { 0 };
        raw[11] = 0x0f;
        raw[13] = checksum;
        let offsets = (0..5).map(|i| 1 + 2 * i).chain((0..6).map(|i| 14 + 2 * i)).chain((0..2).map(|i| 28 + 2 * i));
        for (c, at) in chars.iter().zip(offsets) {
            raw[at..at + 2].copy_from_slice(&c.to_le_bytes());
        }
        out.push(raw);
    }
    out
}
