use super::{
    constants::*,
    lfn::LfnFragment,
};
use byteorder::{
    ByteOrder,
    LittleEndian,
};

/// A short (8.3) directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirEntry {
    name: [u8; 8],
    extension: [u8; 3],
    attributes: u8,
    case_flags: u8,
    creation_time_ms: u8,
    creation_time: u16,
    creation_date: u16,
    access_date: u16,
    first_cluster_high: u16,
    modify_time: u16,
    modify_date: u16,
    first_cluster_low: u16,
    size: u32,
}

const SELF_DIR: [u8; 8] = [DOT, SPACE, SPACE, SPACE, SPACE, SPACE, SPACE, SPACE];
const PARENT_DIR: [u8; 8] = [DOT, DOT, SPACE, SPACE, SPACE, SPACE, SPACE, SPACE];

impl DirEntry {
    pub(crate) fn decode(raw: &[u8; DIR_ENTRY_SIZE]) -> DirEntry {
        let mut name = [0; 8];
        let mut extension = [0; 3];
        name.copy_from_slice(&raw[0..8]);
        extension.copy_from_slice(&raw[8..11]);
        DirEntry {
            name,
            extension,
            attributes: raw[11],
            case_flags: raw[12],
            creation_time_ms: raw[13],
            creation_time: LittleEndian::read_u16(&raw[14..16]),
            creation_date: LittleEndian::read_u16(&raw[16..18]),
            access_date: LittleEndian::read_u16(&raw[18..20]),
            first_cluster_high: LittleEndian::read_u16(&raw[20..22]),
            modify_time: LittleEndian::read_u16(&raw[22..24]),
            modify_date: LittleEndian::read_u16(&raw[24..26]),
            first_cluster_low: LittleEndian::read_u16(&raw[26..28]),
            size: LittleEndian::read_u32(&raw[28..32]),
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &[u8; 8] {
        &self.name
    }

    #[inline(always)]
    pub fn extension(&self) -> &[u8; 3] {
        &self.extension
    }

    #[inline(always)]
    pub fn attributes(&self) -> u8 {
        self.attributes
    }

    #[inline(always)]
    pub fn is_directory(&self) -> bool {
        self.attributes & DIRENT_ATTR_SUBDIR > 0
    }

    #[inline(always)]
    pub fn is_volume_label(&self) -> bool {
        self.attributes & DIRENT_ATTR_VOLUME_LABEL > 0
    }

    #[inline(always)]
    pub fn is_file_or_subdir(&self) -> bool {
        self.attributes & DIRENT_ATTR_VOLUME_LABEL == 0
    }

    #[inline(always)]
    pub fn is_self_or_parent(&self) -> bool {
        self.extension == [SPACE; 3] && (self.name == SELF_DIR || self.name == PARENT_DIR)
    }

    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Start of the entry's cluster chain.  Zero for empty files, and for `..` entries pointing at
    /// the root directory.
    #[inline(always)]
    pub fn first_cluster(&self) -> u32 {
        ((self.first_cluster_high as u32) << 16) | (self.first_cluster_low as u32)
    }

    /// Raw FAT (time, date) of the last modification.
    #[inline(always)]
    pub fn modified(&self) -> (u16, u16) {
        (self.modify_time, self.modify_date)
    }

    /// Raw FAT (time, date) of creation.
    #[inline(always)]
    pub fn created(&self) -> (u16, u16) {
        (self.creation_time, self.creation_date)
    }

    #[inline(always)]
    pub fn accessed(&self) -> u16 {
        self.access_date
    }

    /// The checksum every LFN fragment of this entry carries.
    pub fn checksum(&self) -> u8 {
        let mut sum: u8 = 0;
        for c in self.name.iter().chain(self.extension.iter()) {
            sum = (((sum & 1) << 7) | (sum >> 1)).wrapping_add(*c);
        }
        sum
    }
}

/// One 32-byte directory slot, told apart by its first byte and attribute byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// First byte 0x00: nothing follows in this directory.
    End,
    /// First byte 0xe5.
    Deleted,
    Short(DirEntry),
    Long(LfnFragment),
}

impl Slot {
    pub fn decode(raw: &[u8; DIR_ENTRY_SIZE]) -> Slot {
        match raw[0] {
            ENTRY_END => Slot::End,
            ENTRY_DELETED => Slot::Deleted,
            _ if raw[11] == DIRENT_ATTR_LONG_NAME => Slot::Long(LfnFragment::decode(raw)),
            _ => Slot::Short(DirEntry::decode(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short(name: &[u8; 11], attributes: u8, cluster: u32, size: u32) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw[0..11].copy_from_slice(name);
        raw[11] = attributes;
        raw[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
        raw[26..28].copy_from_slice(&(cluster as u16).to_le_bytes());
        raw[28..32].copy_from_slice(&size.to_le_bytes());
        raw
    }

    #[test]
    fn decodes_short_entry() {
        let raw = short(b"README  TXT", DIRENT_ATTR_ARCHIVE, 0x0001_0005, 1234);
        match Slot::decode(&raw) {
            Slot::Short(e) => {
                assert_eq!(e.name(), b"README  ");
                assert_eq!(e.extension(), b"TXT");
                assert_eq!(e.first_cluster(), 0x0001_0005);
                assert_eq!(e.size(), 1234);
                assert!(!e.is_directory());
                assert!(e.is_file_or_subdir());
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn classifies_slots() {
        assert_eq!(Slot::decode(&[0u8; DIR_ENTRY_SIZE]), Slot::End);

        let mut raw = short(b"GONE    TXT", 0, 3, 0);
        raw[0] = ENTRY_DELETED;
        assert_eq!(Slot::decode(&raw), Slot::Deleted);

        let raw = short(b"Ab\0c\0d\0e\0f\0", DIRENT_ATTR_LONG_NAME, 0, 0);
        assert!(matches!(Slot::decode(&raw), Slot::Long(_)));

        // Any other attribute combination is a short entry, volume labels included
        let raw = short(b"MYDISK     ", DIRENT_ATTR_VOLUME_LABEL, 0, 0);
        match Slot::decode(&raw) {
            Slot::Short(e) => assert!(e.is_volume_label()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn dot_entries() {
        let dot = DirEntry::decode(&short(b".          ", DIRENT_ATTR_SUBDIR, 5, 0));
        let dotdot = DirEntry::decode(&short(b"..         ", DIRENT_ATTR_SUBDIR, 0, 0));
        let file = DirEntry::decode(&short(b"..X        ", 0, 0, 0));
        assert!(dot.is_self_or_parent());
        assert!(dotdot.is_self_or_parent());
        assert!(!file.is_self_or_parent());
    }

    #[test]
    fn checksum_rotates_and_adds() {
        let e = DirEntry::decode(&short(b"FOO     BAR", 0, 0, 0));
        let mut sum: u8 = 0;
        for c in b"FOO     BAR" {
            sum = ((sum.rotate_right(1) as u32 + *c as u32) & 0xff) as u8;
        }
        assert_eq!(e.checksum(), sum);
    }
}
