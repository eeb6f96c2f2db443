use super::constants::*;
use core::{
    fmt,
    ops::Deref,
};
use ufmt::{
    uDebug,
    uDisplay,
    uWrite,
    Formatter,
};

// Every code unit a full run of long-name fragments can carry, at three bytes of UTF-8 each
const NAME_CAPACITY: usize = LFN_MAX_ENTRIES * LFN_CHARS_PER_ENTRY * 3;

/// A resolved file name: the long name if the entry has one, the formatted 8.3 name otherwise.
///
/// Lives on the stack; no allocator needed.
#[derive(Clone, Copy)]
pub struct Name {
    buf: [u8; NAME_CAPACITY],
    len: usize,
}

impl Name {
    pub fn new() -> Name {
        Name { buf: [0; NAME_CAPACITY], len: 0 }
    }

    /// Decodes UCS-2 (UTF-16) code units; unpaired surrogates become U+FFFD.
    pub fn from_ucs2(units: &[u16]) -> Name {
        let mut name = Name::new();
        for c in core::char::decode_utf16(units.iter().copied()) {
            if !name.push(c.unwrap_or(core::char::REPLACEMENT_CHARACTER)) {
                break;
            }
        }
        name
    }

    pub(crate) fn push(&mut self, c: char) -> bool {
        let mut tmp = [0u8; 4];
        let encoded = c.encode_utf8(&mut tmp);
        if self.len + encoded.len() > NAME_CAPACITY {
            return false;
        }
        self.buf[self.len..self.len + encoded.len()].copy_from_slice(encoded.as_bytes());
        self.len += encoded.len();
        true
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        // Only ever filled through `push`, so this is always valid UTF-8
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl Default for Name {
    fn default() -> Name {
        Name::new()
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Name) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Name {}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl uDisplay for Name {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        out.write_str(self.as_str())
    }
}

impl uDebug for Name {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        out.write_char('"')?;
        out.write_str(self.as_str())?;
        out.write_char('"')
    }
}

fn trim_padding(field: &[u8]) -> &[u8] {
    let end = field.iter().rposition(|&c| c != SPACE).map_or(0, |i| i + 1);
    &field[..end]
}

fn short_char(c: u8) -> char {
    if c.is_ascii() {
        (c as char).to_ascii_lowercase()
    } else {
        char::from(c)
    }
}

/// `"README  "`, `"TXT"` becomes `readme.txt`; an empty extension drops the dot.
pub fn format_short_name(name: &[u8; 8], extension: &[u8; 3]) -> Name {
    let mut out = Name::new();
    for (i, &c) in trim_padding(name).iter().enumerate() {
        let c = if i == 0 && c == ENTRY_KANJI_E5 { ENTRY_DELETED } else { c };
        out.push(short_char(c));
    }

    let extension = trim_padding(extension);
    if !extension.is_empty() {
        out.push(DOT as char);
        for &c in extension {
            out.push(short_char(c));
        }
    }
    out
}

fn field_matches(input: &[u8], field: &[u8]) -> bool {
    input.len() <= field.len()
        && input.eq_ignore_ascii_case(&field[..input.len()])
        && field[input.len()..].iter().all(|&c| c == SPACE)
}

/// Case-insensitive comparison of a user-supplied name with the packed 8.3 fields of an entry.
pub fn short_name_matches(input: &str, name: &[u8; 8], extension: &[u8; 3]) -> bool {
    let (base, ext) = match input {
        "." | ".." => (input, ""),
        _ => match input.rfind('.') {
            Some(i) => (&input[..i], &input[i + 1..]),
            None => (input, ""),
        },
    };
    !base.is_empty() && field_matches(base.as_bytes(), name) && field_matches(ext.as_bytes(), extension)
}
