use ufmt::{
    uWrite,
    Formatter,
};

fn hexfmt_u8(n: u8) -> u8 {
    match n & 0xf {
        v if v <= 9 => v + 48,
        v => v + 87,
    }
}

/// Writes `n` as `0x`-prefixed lowercase hex, zero-padded to at least `digits` digits.
pub fn hexfmt<W>(out: &mut Formatter<W>, mut n: u64, digits: usize) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    out.write_str("0x")?;
    let mut chars = [b'0'; 16];
    let mut used = 0;
    while n > 0 {
        chars[15 - used] = hexfmt_u8((n & 0x0f) as u8);
        n >>= 4;
        used += 1;
    }
    let width = if used > digits { used } else { digits.min(16) };
    for c in chars[16 - width..].iter() {
        out.write_char(*c as char)?;
    }
    Ok(())
}

pub fn hexfmt32<W>(out: &mut Formatter<W>, n: u32) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    hexfmt(out, n as u64, 8)
}
