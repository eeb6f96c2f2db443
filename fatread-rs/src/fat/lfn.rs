use super::{
    constants::*,
    dir_entry::DirEntry,
    name::Name,
};
use byteorder::{
    ByteOrder,
    LittleEndian,
};

/// One long-file-name slot: 13 UCS-2 code units of the name plus bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LfnFragment {
    ordinal: u8,
    chars: [u16; LFN_CHARS_PER_ENTRY],
    checksum: u8,
}

// Byte offsets of the three runs of code units (5 + 6 + 2)
const LFN_RUNS: [(usize, usize); 3] = [(1, 5), (14, 6), (28, 2)];

impl LfnFragment {
    pub(crate) fn decode(raw: &[u8; DIR_ENTRY_SIZE]) -> LfnFragment {
        let mut chars = [0u16; LFN_CHARS_PER_ENTRY];
        let mut i = 0;
        for &(start, count) in LFN_RUNS.iter() {
            for j in 0..count {
                chars[i] = LittleEndian::read_u16(&raw[start + j * 2..start + j * 2 + 2]);
                i += 1;
            }
        }
        LfnFragment { ordinal: raw[0], chars, checksum: raw[13] }
    }

    #[inline(always)]
    pub fn ordinal(&self) -> u8 {
        self.ordinal
    }

    /// 1-based position of this fragment in the name; fragment 1 holds the first 13 characters.
    #[inline(always)]
    pub fn sequence_num(&self) -> u8 {
        self.ordinal & LFN_ORDINAL_MASK
    }

    /// The physically first fragment of a run carries the flag, and the highest sequence number.
    #[inline(always)]
    pub fn is_last_in_sequence(&self) -> bool {
        self.ordinal & LFN_LAST_ENTRY > 0
    }

    #[inline(always)]
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    #[inline(always)]
    pub fn chars(&self) -> &[u16; LFN_CHARS_PER_ENTRY] {
        &self.chars
    }
}

/// Reassembles a long name from its fragments, which appear on disk in reverse order.
#[derive(Clone, Copy)]
pub(crate) struct LongName {
    units: [u16; LFN_MAX_ENTRIES * LFN_CHARS_PER_ENTRY],
    len: usize,
    checksum: u8,
    next: u8, // Sequence number expected next; zero when no run is in progress
}

impl LongName {
    pub(crate) fn new() -> LongName {
        LongName {
            units: [0; LFN_MAX_ENTRIES * LFN_CHARS_PER_ENTRY],
            len: 0,
            checksum: 0,
            next: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.checksum = 0;
        self.next = 0;
    }

    /// Stores one fragment.  Returns true once fragment 1 is in, i.e. the name is complete and the
    /// next slot should be its short entry.
    ///
    /// A run that doesn't count down one by one under a single checksum is dropped; the short entry
    /// it belonged to then shows up under its 8.3 name.
    pub(crate) fn push(&mut self, frag: &LfnFragment) -> bool {
        let seq = frag.sequence_num();
        if seq == 0 || seq as usize > LFN_MAX_ENTRIES {
            self.clear();
            return false;
        }

        if frag.is_last_in_sequence() {
            // The name ends in this fragment, so it bounds the whole thing
            self.len = seq as usize * LFN_CHARS_PER_ENTRY;
            self.checksum = frag.checksum();
        } else if self.next != seq || self.checksum != frag.checksum() {
            self.clear();
            return false;
        }

        let start = (seq as usize - 1) * LFN_CHARS_PER_ENTRY;
        self.units[start..start + LFN_CHARS_PER_ENTRY].copy_from_slice(frag.chars());
        self.next = seq - 1;
        seq == 1
    }

    #[inline(always)]
    pub(crate) fn belongs_to(&self, entry: &DirEntry) -> bool {
        self.len > 0 && self.next == 0 && self.checksum == entry.checksum()
    }

    /// The name up to its NUL terminator (absent when the name fills its last fragment exactly).
    pub(crate) fn to_name(&self) -> Name {
        let units = &self.units[..self.len];
        let end = units.iter().position(|&c| c == 0).unwrap_or(units.len());
        Name::from_ucs2(&units[..end])
    }
}
